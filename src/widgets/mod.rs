//! Widget renderers: one per widget kind, behind a single render contract.
//!
//! Renderers consume a widget spec plus the request context and produce a
//! renderable fragment with row-count metadata. The kind-to-renderer mapping
//! is a registry built at startup, not a per-call string branch.

pub mod form;
pub mod grid;
pub mod list;
pub mod map;
pub mod popup;
pub mod text;

use crate::compose::Engine;
use crate::config::{PageConfig, WidgetKind, WidgetSpec};
use crate::error::EngineError;
use crate::filters::{merge_filters, resolve_context, FilterExpr};
use crate::request::{PageRequest, Representation};
use crate::services::UrlSpec;

/// Everything a renderer needs for one request: the engine's collaborators
/// and settings, the incoming request, the parent record id, and the page
/// configuration (map widgets read sibling specs from it).
pub struct RenderContext<'a> {
    pub engine: &'a Engine,
    pub request: &'a PageRequest,
    pub page: &'a PageConfig,
    pub parent_id: &'a str,
}

/// One rendered widget, ready for row packing or fragment return.
#[derive(Debug, Clone)]
pub struct RenderedWidget {
    /// Widget index, for ajax URL construction.
    pub index: usize,
    /// DOM-addressable listing id (list and grid widgets).
    pub listing_id: Option<String>,
    /// Fragment markup.
    pub body: String,
    /// Layout units occupied.
    pub col_span: u8,
    /// Total matching rows, where the widget queried any.
    pub total_rows: Option<u64>,
}

/// Common render contract over the closed set of widget kinds.
pub trait WidgetRenderer: Send + Sync {
    fn kind(&self) -> WidgetKind;

    fn render(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
    ) -> Result<RenderedWidget, EngineError>;
}

/// Kind-keyed renderer lookup, registered once at engine construction.
pub struct RendererRegistry {
    renderers: Vec<Box<dyn WidgetRenderer>>,
}

impl RendererRegistry {
    /// Empty registry, for callers composing their own widget set.
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Registry with the five standard renderers.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(list::ListRenderer));
        registry.register(Box::new(grid::GridRenderer));
        registry.register(Box::new(form::FormRenderer));
        registry.register(Box::new(map::MapRenderer));
        registry.register(Box::new(text::TextPanelRenderer));
        registry
    }

    /// Registers a renderer; a later registration for the same kind wins.
    pub fn register(&mut self, renderer: Box<dyn WidgetRenderer>) {
        self.renderers.push(renderer);
    }

    pub fn get(&self, kind: &WidgetKind) -> Option<&dyn WidgetRenderer> {
        self.renderers
            .iter()
            .rev()
            .find(|renderer| renderer.kind() == *kind)
            .map(|renderer| &**renderer)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identifier for one widget instance, derived from its target
/// resource and page position; doubles as the DOM id the client uses to
/// address ajax refreshes.
pub fn listing_id(resource: &str, index: usize) -> String {
    format!("profile-list-{resource}-{index}")
}

/// Context filter (if a context is declared) ANDed with the static filter.
pub fn scope_filter(spec: &WidgetSpec, parent_id: &str) -> Option<FilterExpr> {
    let context = spec
        .context
        .as_deref()
        .map(|context| resolve_context(context, parent_id));
    merge_filters(context, spec.filter.clone())
}

/// Context filter alone, without the widget's static filter.
pub fn context_filter(spec: &WidgetSpec, parent_id: &str) -> Option<FilterExpr> {
    spec.context
        .as_deref()
        .map(|context| resolve_context(context, parent_id))
}

/// URL re-addressing this widget through a partial-update protocol.
pub fn widget_ajax_url(cx: &RenderContext<'_>, index: usize, representation: Representation) -> String {
    let url = UrlSpec::for_resource(&cx.page.resource)
        .with_arg(cx.parent_id)
        .with_representation(representation.as_str())
        .with_param("update", index.to_string());
    cx.engine.urls().build(&url)
}

/// Minimal HTML escaping for text interpolated into card chrome.
pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Card sub-header with optional icon.
pub fn sub_header(icon: Option<&str>, label: &str) -> String {
    let icon = icon
        .map(|class| format!("<i class=\"{}\"></i> ", html_escape(class)))
        .unwrap_or_default();
    format!(
        "<h4 class=\"profile-sub-header\">{icon}{}</h4>",
        html_escape(label)
    )
}
