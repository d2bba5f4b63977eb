//! Collaborator interfaces consumed by the composition engine.
//!
//! The engine shapes requests to — and responses from — an external record
//! store, permission checker, fragment painter, and URL builder. It never
//! implements any of them; everything behind these traits is a black box that
//! may block on I/O and whose failures are propagated untouched.

use serde_json::Value;

use crate::error::EngineError;
use crate::filters::FilterExpr;
use crate::request::QueryParams;

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    /// Selected rows, one JSON object per record.
    pub rows: Vec<Value>,
    /// Total matching rows before the window was applied.
    pub total: u64,
    /// Ids of the returned rows, in row order.
    pub ids: Vec<String>,
}

/// A scoped, windowed query against one resource type.
#[derive(Debug, Clone)]
pub struct QueryRequest<'a> {
    pub resource: &'a str,
    pub filter: Option<&'a FilterExpr>,
    pub fields: &'a [String],
    pub order_by: Option<&'a str>,
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

/// Sort/search state parsed from grid client parameters by the resource
/// collaborator (the engine only negotiates the row window).
#[derive(Debug, Clone, Default)]
pub struct GridQuery {
    /// Search filter to apply on top of the structural filter, if any.
    pub search: Option<FilterExpr>,
    /// Client-requested ordering, if any.
    pub order_by: Option<String>,
}

/// The filterable, orderable, paginatable record store.
pub trait ResourceQuery {
    /// Runs a windowed query, returning rows plus the pre-window total.
    fn query(&self, request: &QueryRequest<'_>) -> Result<QueryPage, EngineError>;

    /// Counts rows matching a filter.
    fn count(&self, resource: &str, filter: Option<&FilterExpr>) -> Result<u64, EngineError>;

    /// Deletes all rows matching a filter, returning the count removed.
    fn delete_where(&self, resource: &str, filter: &FilterExpr) -> Result<u64, EngineError>;

    /// Parses grid-client sort/search parameters into a query adjustment.
    /// The default reads nothing, leaving widget-configured ordering intact.
    fn parse_grid_query(
        &self,
        _resource: &str,
        _fields: &[String],
        _params: &QueryParams,
    ) -> Result<GridQuery, EngineError> {
        Ok(GridQuery::default())
    }
}

/// Actions checked against the permission collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Authorization oracle; `false` suppresses the corresponding affordance.
pub trait PermissionGate {
    fn can(&self, action: Action, resource: &str, record_id: Option<&str>) -> bool;
}

/// Input for painting a list widget's rows.
#[derive(Debug, Clone)]
pub struct ListPaintJob<'a> {
    pub listing_id: &'a str,
    pub rows: &'a [Value],
    pub fields: &'a [String],
    pub layout: Option<&'a str>,
}

/// Input for painting a grid widget's table body.
#[derive(Debug, Clone)]
pub struct TablePaintJob<'a> {
    pub listing_id: &'a str,
    pub rows: &'a [Value],
    pub fields: &'a [String],
}

/// Input for painting an embedded sub-form.
#[derive(Debug, Clone)]
pub struct FormPaintJob<'a> {
    pub resource: &'a str,
    pub record_id: Option<&'a str>,
    pub fields: &'a [String],
    pub readonly: bool,
}

/// Turns rows/fields/layout into displayable markup. The engine wraps the
/// result in card chrome but never inspects it.
pub trait FragmentPainter {
    fn paint_list(&self, job: &ListPaintJob<'_>) -> String;
    fn paint_table(&self, job: &TablePaintJob<'_>) -> String;
    fn paint_form(&self, job: &FormPaintJob<'_>) -> String;
}

/// A URL to be constructed by the calling web layer.
#[derive(Debug, Clone, Default)]
pub struct UrlSpec {
    /// Resource type whose controller handles the URL.
    pub resource: String,
    /// Path arguments after the controller/function prefix.
    pub args: Vec<String>,
    /// Representation tag appended to the final path segment, if any.
    pub representation: Option<String>,
    /// Query parameters in emission order.
    pub params: Vec<(String, String)>,
}

impl UrlSpec {
    pub fn for_resource(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Self::default()
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_representation(mut self, representation: impl Into<String>) -> Self {
        self.representation = Some(representation.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

/// Builds concrete URLs for ajax endpoints and create-popup links.
pub trait UrlBuilder {
    fn build(&self, url: &UrlSpec) -> String;
}
