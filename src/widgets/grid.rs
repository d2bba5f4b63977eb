//! Grid-of-related-records widget (sortable, paginated table).
//!
//! Two faces: interactive markup with ajax wiring for page loads and the
//! grid-fragment GET path, and a structured data payload for the pure ajax
//! pull. The payload is the one bit-exact wire contract in the engine; its
//! field names follow the legacy grid client convention.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{WidgetKind, WidgetSpec};
use crate::error::EngineError;
use crate::filters::merge_filters;
use crate::pagination::grid_window;
use crate::request::Representation;
use crate::services::{QueryRequest, TablePaintJob};
use crate::widgets::{
    context_filter, html_escape, listing_id, popup, scope_filter, sub_header, RenderContext,
    RenderedWidget, WidgetRenderer,
};

/// Structured payload for the grid ajax data pull. Field names and the echo
/// round-trip match the grid client's wire contract exactly.
#[derive(Debug, Clone, Serialize)]
pub struct GridPayload {
    /// Total records matching the structural filter, before any search.
    #[serde(rename = "iTotalRecords")]
    pub total_records: u64,
    /// Records remaining after the search filter.
    #[serde(rename = "iTotalDisplayRecords")]
    pub display_records: u64,
    /// Listing id of the addressed widget.
    #[serde(rename = "dataTable_id")]
    pub listing_id: String,
    /// Request-correlation token echoed back so the client can discard
    /// stale in-flight responses. Coerced to an integer on the way through;
    /// a missing or non-numeric token echoes as 0.
    #[serde(rename = "sEcho")]
    pub echo: u64,
    /// Row data for the negotiated window.
    #[serde(rename = "aaData")]
    pub rows: Vec<Value>,
}

pub struct GridRenderer;

impl WidgetRenderer for GridRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Grid
    }

    fn render(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
    ) -> Result<RenderedWidget, EngineError> {
        let scope = scope_filter(spec, cx.parent_id);
        let listing = listing_id(&spec.resource, spec.index);
        let display_length = display_length(cx, spec);
        let server_side = cx.engine.settings().server_side_pagination;
        let window = grid_window(&cx.request.params, false, display_length, server_side);

        let order_by = spec
            .order_by
            .clone()
            .or_else(|| default_order_by(&spec.fields));

        let page = cx.engine.resources().query(&QueryRequest {
            resource: &spec.resource,
            filter: scope.as_ref(),
            fields: &spec.fields,
            order_by: order_by.as_deref(),
            start: window.start,
            limit: window.limit,
        })?;
        debug!(
            widget = spec.index,
            resource = %spec.resource,
            rows = page.rows.len(),
            total = page.total,
            "rendered grid widget"
        );

        let table = cx.engine.painter().paint_table(&TablePaintJob {
            listing_id: &listing,
            rows: &page.rows,
            fields: &spec.fields,
        });

        let ajax_url =
            crate::widgets::widget_ajax_url(cx, spec.index, Representation::GridFragment);
        let context = context_filter(spec, cx.parent_id);
        let create = popup::build_create_popup(cx, spec, &listing, context.as_ref(), page.total);
        let create = popup::create_popup_html(cx, spec, create.as_ref());

        // Table and empty-message blocks are both emitted; whichever has no
        // content starts hidden and the client toggles them on updates.
        let (table_style, empty_style) = if page.rows.is_empty() {
            (" style=\"display:none\"", "")
        } else {
            ("", " style=\"display:none\"")
        };
        let body = format!(
            "<div class=\"profile-widget profile-grid\">{create}{header}\
             <div class=\"card-holder\"><div class=\"dt-contents\" \
             data-ajax-url=\"{ajax_url}\" data-display-length=\"{display_length}\" \
             data-pagination=\"{pagination}\">\
             <div id=\"{listing}\"{table_style}>{table}</div>\
             <div class=\"empty\"{empty_style}>No records found</div>\
             </div></div></div>",
            header = sub_header(spec.icon.as_deref(), &spec.label),
            ajax_url = html_escape(&ajax_url),
            pagination = window.server_side,
        );

        Ok(RenderedWidget {
            index: spec.index,
            listing_id: Some(listing),
            body,
            col_span: spec.col_span(),
            total_rows: Some(page.total),
        })
    }
}

/// Builds the structured payload for a grid ajax data pull.
///
/// When the client sent a search, the total is counted against the
/// structural filter before the search is applied, so a search matching
/// nothing still reports the unfiltered total.
pub fn grid_data(cx: &RenderContext<'_>, spec: &WidgetSpec) -> Result<GridPayload, EngineError> {
    let scope = scope_filter(spec, cx.parent_id);
    let listing = listing_id(&spec.resource, spec.index);
    let display_length = display_length(cx, spec);
    let server_side = cx.engine.settings().server_side_pagination;
    let window = grid_window(&cx.request.params, true, display_length, server_side);

    let grid_query = cx.engine.resources().parse_grid_query(
        &spec.resource,
        &spec.fields,
        &cx.request.params,
    )?;

    let mut total = None;
    let mut filter = scope;
    if let Some(search) = grid_query.search {
        total = Some(cx.engine.resources().count(&spec.resource, filter.as_ref())?);
        filter = merge_filters(filter, Some(search));
    }

    let order_by = grid_query
        .order_by
        .or_else(|| spec.order_by.clone())
        .or_else(|| default_order_by(&spec.fields));

    let (rows, display_records) = if total == Some(0) {
        (Vec::new(), 0)
    } else {
        let page = cx.engine.resources().query(&QueryRequest {
            resource: &spec.resource,
            filter: filter.as_ref(),
            fields: &spec.fields,
            order_by: order_by.as_deref(),
            start: window.start,
            limit: window.limit,
        })?;
        (page.rows, page.total)
    };
    let total_records = total.unwrap_or(display_records);

    let echo = cx
        .request
        .param("sEcho")
        .and_then(|echo| echo.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(GridPayload {
        total_records,
        display_records,
        listing_id: listing,
        echo,
        rows,
    })
}

/// Display length: settings override, then widget page size (default 10).
fn display_length(cx: &RenderContext<'_>, spec: &WidgetSpec) -> u64 {
    cx.engine
        .settings()
        .grid_page_size
        .unwrap_or_else(|| spec.page_size())
}

/// Default ordering: the first listed field that is not the id.
fn default_order_by(fields: &[String]) -> Option<String> {
    fields.iter().find(|field| field.as_str() != "id").cloned()
}
