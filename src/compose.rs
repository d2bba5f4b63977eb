//! Page composition and request dispatch.
//!
//! The engine is the explicit context object threaded through every call: it
//! owns the collaborator handles, the settings, and the renderer registry.
//! Requests are handled independently and statelessly; nothing here is
//! shared mutable state across requests.

use std::mem;

use tracing::{debug, warn};

use crate::config::{EngineSettings, PageConfig, WidgetSpec};
use crate::error::EngineError;
use crate::request::{HttpMethod, PageRequest, Representation};
use crate::services::{FragmentPainter, PermissionGate, ResourceQuery, UrlBuilder};
use crate::widgets::grid::{self, GridPayload};
use crate::widgets::{html_escape, RenderContext, RenderedWidget, RendererRegistry};

/// Query parameter addressing a widget on the partial-update protocols.
const UPDATE_PARAM: &str = "update";

/// Title used when neither the configuration nor the record provides one.
const FALLBACK_TITLE: &str = "Profile Page";

/// A packed layout row: one or two widgets, combined span at most two.
#[derive(Debug, Clone)]
pub struct Row {
    pub widgets: Vec<RenderedWidget>,
}

impl Row {
    /// Combined layout units occupied by the row's widgets.
    pub fn total_span(&self) -> u8 {
        self.widgets.iter().map(|widget| widget.col_span).sum()
    }
}

/// A fully composed profile page.
#[derive(Debug, Clone)]
pub struct PageOutput {
    pub title: String,
    pub header: String,
    pub rows: Vec<Row>,
}

/// A partial render of a single widget, without page chrome.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub body: String,
}

/// Outcome of dispatching one request.
#[derive(Debug)]
pub enum PageResponse {
    Page(PageOutput),
    Fragment(Fragment),
    GridData(GridPayload),
    /// No target record: the caller should redirect to the collection view.
    CollectionRedirect,
}

/// The widget composition engine.
pub struct Engine {
    resources: Box<dyn ResourceQuery>,
    permissions: Box<dyn PermissionGate>,
    painter: Box<dyn FragmentPainter>,
    urls: Box<dyn UrlBuilder>,
    settings: EngineSettings,
    registry: RendererRegistry,
}

impl Engine {
    pub fn new(
        resources: Box<dyn ResourceQuery>,
        permissions: Box<dyn PermissionGate>,
        painter: Box<dyn FragmentPainter>,
        urls: Box<dyn UrlBuilder>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            resources,
            permissions,
            painter,
            urls,
            settings,
            registry: RendererRegistry::standard(),
        }
    }

    /// Replaces the renderer registry (custom or additional widget kinds).
    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn resources(&self) -> &dyn ResourceQuery {
        self.resources.as_ref()
    }

    pub fn permissions(&self) -> &dyn PermissionGate {
        self.permissions.as_ref()
    }

    pub fn painter(&self) -> &dyn FragmentPainter {
        self.painter.as_ref()
    }

    pub fn urls(&self) -> &dyn UrlBuilder {
        self.urls.as_ref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Dispatches a request to full-page composition or one of the two
    /// partial-update protocols, based on representation and method.
    pub fn respond(
        &self,
        config: &PageConfig,
        request: &PageRequest,
    ) -> Result<PageResponse, EngineError> {
        if !request.method.allowed_on_profile() {
            return Err(EngineError::BadRequest(format!(
                "method {:?} not allowed on a profile page",
                request.method
            )));
        }
        if request.parent_id.is_none() {
            debug!(resource = %config.resource, "no target record, deferring to collection view");
            return Ok(PageResponse::CollectionRedirect);
        }
        match request.representation {
            Representation::Html => self.compose_page(config, request).map(PageResponse::Page),
            Representation::ListFragment => self
                .compose_fragment(config, request)
                .map(PageResponse::Fragment),
            Representation::GridFragment if request.method == HttpMethod::Get => self
                .compose_fragment(config, request)
                .map(PageResponse::Fragment),
            Representation::GridFragment => self
                .compose_grid_data(config, request)
                .map(PageResponse::GridData),
        }
    }

    /// Renders the full page: title, header, and all widgets packed into
    /// rows. Unknown widget kinds fail in strict mode and are skipped
    /// otherwise, so a partially-misconfigured page still renders.
    pub fn compose_page(
        &self,
        config: &PageConfig,
        request: &PageRequest,
    ) -> Result<PageOutput, EngineError> {
        let cx = self.render_context(config, request)?;

        let title = match &config.title {
            Some(title) => title.resolve(request),
            None => request
                .record_label
                .clone()
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        };
        let header = match &config.header {
            Some(header) => header.resolve(request),
            None => format!("<h2 class=\"profile-header\">{}</h2>", html_escape(&title)),
        };

        let mut rendered = Vec::new();
        for spec in config.widgets() {
            match self.registry.get(&spec.kind) {
                Some(renderer) => rendered.push(renderer.render(&cx, spec)?),
                None if self.settings.strict => {
                    return Err(EngineError::Configuration(format!(
                        "unsupported widget kind '{}' at index {}",
                        spec.kind, spec.index
                    )));
                }
                None => {
                    warn!(kind = %spec.kind, index = spec.index, "skipping unknown widget kind");
                }
            }
        }

        Ok(PageOutput {
            title,
            header,
            rows: pack_rows(rendered),
        })
    }

    /// Renders only the addressed widget for an ajax refresh. A missing,
    /// non-numeric, or out-of-range widget address yields an empty fragment
    /// rather than an error.
    pub fn compose_fragment(
        &self,
        config: &PageConfig,
        request: &PageRequest,
    ) -> Result<Fragment, EngineError> {
        let cx = self.render_context(config, request)?;

        let Some(spec) = self.addressed_widget(config, request) else {
            return Ok(Fragment::default());
        };
        match self.registry.get(&spec.kind) {
            Some(renderer) => {
                let rendered = renderer.render(&cx, spec)?;
                Ok(Fragment {
                    body: rendered.body,
                })
            }
            None if self.settings.strict => Err(EngineError::Configuration(format!(
                "unsupported widget kind '{}' at index {}",
                spec.kind, spec.index
            ))),
            None => {
                warn!(kind = %spec.kind, index = spec.index, "skipping unknown widget kind");
                Ok(Fragment::default())
            }
        }
    }

    /// Builds the structured grid payload for a pure ajax data pull. Unlike
    /// the fragment path, the widget address is structural here: it must be
    /// present, numeric, and name a grid widget.
    pub fn compose_grid_data(
        &self,
        config: &PageConfig,
        request: &PageRequest,
    ) -> Result<GridPayload, EngineError> {
        let cx = self.render_context(config, request)?;

        let index = request
            .param(UPDATE_PARAM)
            .and_then(|index| index.parse::<usize>().ok())
            .ok_or_else(|| {
                EngineError::BadRequest("grid data pull requires a widget address".to_string())
            })?;
        let spec = config.widget(index).ok_or_else(|| {
            EngineError::BadRequest(format!("no widget at index {index}"))
        })?;
        if spec.kind != crate::config::WidgetKind::Grid {
            return Err(EngineError::BadRequest(format!(
                "widget {index} is not a grid widget"
            )));
        }
        grid::grid_data(&cx, spec)
    }

    fn render_context<'a>(
        &'a self,
        config: &'a PageConfig,
        request: &'a PageRequest,
    ) -> Result<RenderContext<'a>, EngineError> {
        let parent_id = request.parent_id.as_deref().ok_or_else(|| {
            EngineError::BadRequest("profile composition requires a target record".to_string())
        })?;
        Ok(RenderContext {
            engine: self,
            request,
            page: config,
            parent_id,
        })
    }

    fn addressed_widget<'a>(
        &self,
        config: &'a PageConfig,
        request: &PageRequest,
    ) -> Option<&'a WidgetSpec> {
        let index = request.param(UPDATE_PARAM)?.parse::<usize>().ok()?;
        config.widget(index)
    }
}

/// Packs rendered widgets into layout rows: greedy left-to-right with bin
/// capacity two, order preserved. A full-width widget closes any open row
/// and occupies its own.
pub fn pack_rows(widgets: Vec<RenderedWidget>) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut open: Vec<RenderedWidget> = Vec::new();
    for widget in widgets {
        let full_width = widget.col_span >= 2;
        if full_width && !open.is_empty() {
            rows.push(Row {
                widgets: mem::take(&mut open),
            });
        }
        open.push(widget);
        if full_width || open.len() == 2 {
            rows.push(Row {
                widgets: mem::take(&mut open),
            });
        }
    }
    if !open.is_empty() {
        rows.push(Row { widgets: open });
    }
    rows
}
