//! Free-text panel widget: a headed card whose content the client fills in
//! (comment threads, notes, embeds).

use crate::config::{WidgetKind, WidgetSpec};
use crate::error::EngineError;
use crate::widgets::{sub_header, RenderContext, RenderedWidget, WidgetRenderer};

pub struct TextPanelRenderer;

impl WidgetRenderer for TextPanelRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::TextPanel
    }

    fn render(
        &self,
        _cx: &RenderContext<'_>,
        spec: &WidgetSpec,
    ) -> Result<RenderedWidget, EngineError> {
        let body = format!(
            "<div class=\"profile-widget profile-text\">{header}\
             <div class=\"thumbnail\"></div></div>",
            header = sub_header(spec.icon.as_deref(), &spec.label),
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
