//! Map widget: overlays sibling list widgets as feature layers.
//!
//! The layer list is derived from sibling *specifications*, never from their
//! rendered output, so the map does not depend on render order. Actual map
//! drawing, markers, and named-layer lookups belong to the external
//! geospatial subsystem; this widget only emits the layer list as data.

use serde::Serialize;

use crate::config::{WidgetKind, WidgetSpec};
use crate::error::EngineError;
use crate::filters::{merge_query_params, to_query_params};
use crate::services::UrlSpec;
use crate::widgets::{
    context_filter, html_escape, listing_id, sub_header, RenderContext, RenderedWidget,
    WidgetRenderer,
};

const DEFAULT_HEIGHT: u32 = 383;
const DEFAULT_WIDTH: u32 = 568;

/// One overlay layer sourced from a sibling list widget.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureLayer {
    pub name: String,
    /// Listing id of the sibling widget, so map and list stay addressable
    /// as one pair.
    pub id: String,
    pub active: bool,
    /// Feed URL carrying the serialized context and static filters.
    pub url: String,
}

pub struct MapRenderer;

impl WidgetRenderer for MapRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Map
    }

    fn render(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
    ) -> Result<RenderedWidget, EngineError> {
        let context = context_filter(spec, cx.parent_id);

        let mut layers = Vec::new();
        for sibling in cx.page.widgets() {
            if sibling.kind != WidgetKind::List || !sibling.show_on_map {
                continue;
            }
            let mut sets = Vec::new();
            if let Some(context) = &context {
                sets.push(to_query_params(context));
            }
            if let Some(filter) = &sibling.filter {
                sets.push(to_query_params(filter));
            }
            let mut url = UrlSpec::for_resource(&sibling.resource).with_representation("geojson");
            url.params = merge_query_params(&sets).into_iter().collect();
            layers.push(FeatureLayer {
                name: sibling.label.clone(),
                id: listing_id(&sibling.resource, sibling.index),
                active: true,
                url: cx.engine.urls().build(&url),
            });
        }

        let layer_data = serde_json::to_string(&layers)
            .map_err(|err| EngineError::Configuration(format!("layer serialization: {err}")))?;
        let fullscreen_url = cx
            .engine
            .urls()
            .build(&UrlSpec::for_resource("map").with_arg("viewer"));

        let body = format!(
            "<div class=\"profile-widget profile-map\">\
             <a class=\"gis-fullscreen-map-btn\" href=\"{fullscreen}\" \
             title=\"View full screen\"></a>{header}\
             <div class=\"card-holder\"><div class=\"map-container\" \
             data-height=\"{height}\" data-width=\"{width}\">\
             <script type=\"application/json\" class=\"map-layers\">{layer_data}</script>\
             </div></div></div>",
            fullscreen = html_escape(&fullscreen_url),
            header = sub_header(spec.icon.as_deref(), &spec.label),
            height = spec.height.unwrap_or(DEFAULT_HEIGHT),
            width = spec.width.unwrap_or(DEFAULT_WIDTH),
        );

        Ok(RenderedWidget {
            index: spec.index,
            listing_id: None,
            body,
            col_span: spec.col_span(),
            total_rows: None,
        })
    }
}
