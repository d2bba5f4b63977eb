//! In-memory collaborator implementations backing the integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use profilepage::error::EngineError;
use profilepage::filters::{Compare, FilterExpr};
use profilepage::request::QueryParams;
use profilepage::services::{
    Action, FormPaintJob, FragmentPainter, GridQuery, ListPaintJob, PermissionGate, QueryPage,
    QueryRequest, ResourceQuery, TablePaintJob, UrlBuilder, UrlSpec,
};
use profilepage::{Engine, EngineSettings};
use serde_json::Value;

/// Record store over JSON rows, one table per resource type.
#[derive(Clone, Default)]
pub struct MemoryResource {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    /// Field the fake grid client searches on via `sSearch`.
    search_field: Option<String>,
}

impl MemoryResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_field(mut self, field: &str) -> Self {
        self.search_field = Some(field.to_string());
        self
    }

    pub fn seed(&self, resource: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .insert(resource.to_string(), rows);
    }

    pub fn rows(&self, resource: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    fn matching(&self, resource: &str, filter: Option<&FilterExpr>) -> Vec<Value> {
        self.rows(resource)
            .into_iter()
            .filter(|row| filter.map_or(true, |filter| matches(filter, row)))
            .collect()
    }
}

impl ResourceQuery for MemoryResource {
    fn query(&self, request: &QueryRequest<'_>) -> Result<QueryPage, EngineError> {
        let mut rows = self.matching(request.resource, request.filter);
        if let Some(order_by) = request.order_by {
            rows.sort_by_key(|row| cell_text(row, order_by));
        }
        let total = rows.len() as u64;
        let start = request.start.unwrap_or(0) as usize;
        let rows: Vec<Value> = match request.limit {
            Some(limit) => rows.into_iter().skip(start).take(limit as usize).collect(),
            None => rows.into_iter().skip(start).collect(),
        };
        let ids = rows.iter().map(|row| cell_text(row, "id")).collect();
        Ok(QueryPage { rows, total, ids })
    }

    fn count(&self, resource: &str, filter: Option<&FilterExpr>) -> Result<u64, EngineError> {
        Ok(self.matching(resource, filter).len() as u64)
    }

    fn delete_where(&self, resource: &str, filter: &FilterExpr) -> Result<u64, EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(resource.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| !matches(filter, row));
        Ok((before - rows.len()) as u64)
    }

    fn parse_grid_query(
        &self,
        _resource: &str,
        _fields: &[String],
        params: &QueryParams,
    ) -> Result<GridQuery, EngineError> {
        let mut query = GridQuery::default();
        if let (Some(field), Some(term)) = (&self.search_field, params.get("sSearch")) {
            if !term.is_empty() {
                query.search = Some(FilterExpr::like(field.clone(), format!("*{term}*")));
            }
        }
        Ok(query)
    }
}

/// Evaluates a filter expression against one JSON row.
pub fn matches(expr: &FilterExpr, row: &Value) -> bool {
    match expr {
        FilterExpr::Cmp { field, op, value } => {
            let cell = cell_text(row, field);
            match op {
                Compare::Eq => cell == *value,
                Compare::Like => wildcard_match(value, &cell),
            }
        }
        FilterExpr::AllOf(branches) => branches.iter().all(|branch| matches(branch, row)),
        FilterExpr::AnyOf(branches) => branches.iter().any(|branch| matches(branch, row)),
    }
}

fn cell_text(row: &Value, field: &str) -> String {
    match row.get(field) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// `*`-wildcard matcher: anchored at both ends, segments in order.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == text;
    }
    let mut rest = text;
    for (position, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if position == 0 {
            match rest.strip_prefix(segment) {
                Some(after) => rest = after,
                None => return false,
            }
        } else if position == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(found) => rest = &rest[found + segment.len()..],
                None => return false,
            }
        }
    }
    true
}

/// Permission gate with a deny-list of `(action, resource)` pairs.
#[derive(Clone, Default)]
pub struct TestPermissions {
    denied: Vec<(&'static str, String)>,
}

impl TestPermissions {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn deny(mut self, action: Action, resource: &str) -> Self {
        self.denied.push((action.as_str(), resource.to_string()));
        self
    }
}

impl PermissionGate for TestPermissions {
    fn can(&self, action: Action, resource: &str, _record_id: Option<&str>) -> bool {
        !self
            .denied
            .iter()
            .any(|(denied_action, denied_resource)| {
                *denied_action == action.as_str() && denied_resource == resource
            })
    }
}

/// Painter producing small deterministic markers instead of real markup.
pub struct PlainPainter;

impl FragmentPainter for PlainPainter {
    fn paint_list(&self, job: &ListPaintJob<'_>) -> String {
        format!(
            "<ul data-listing=\"{}\" data-rows=\"{}\"></ul>",
            job.listing_id,
            job.rows.len()
        )
    }

    fn paint_table(&self, job: &TablePaintJob<'_>) -> String {
        format!(
            "<table data-listing=\"{}\" data-rows=\"{}\"></table>",
            job.listing_id,
            job.rows.len()
        )
    }

    fn paint_form(&self, job: &FormPaintJob<'_>) -> String {
        format!(
            "<form data-resource=\"{}\" data-record=\"{}\" data-readonly=\"{}\"></form>",
            job.resource,
            job.record_id.unwrap_or(""),
            job.readonly
        )
    }
}

/// Path-style URL builder: `/{resource}/{args}.{representation}?{params}`.
pub struct PathUrls;

impl UrlBuilder for PathUrls {
    fn build(&self, url: &UrlSpec) -> String {
        let mut path = format!("/{}", url.resource);
        for arg in &url.args {
            path.push('/');
            path.push_str(arg);
        }
        if let Some(representation) = &url.representation {
            path.push('.');
            path.push_str(representation);
        }
        if !url.params.is_empty() {
            let query: Vec<String> = url
                .params
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }
}

/// Engine wired to the in-memory collaborators.
pub fn engine(resources: MemoryResource, settings: EngineSettings) -> Engine {
    engine_with_permissions(resources, TestPermissions::allow_all(), settings)
}

pub fn engine_with_permissions(
    resources: MemoryResource,
    permissions: TestPermissions,
    settings: EngineSettings,
) -> Engine {
    Engine::new(
        Box::new(resources),
        Box::new(permissions),
        Box::new(PlainPainter),
        Box::new(PathUrls),
        settings,
    )
}
