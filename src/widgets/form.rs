//! Embedded sub-form widget.

use crate::config::{WidgetKind, WidgetSpec};
use crate::error::EngineError;
use crate::services::{Action, FormPaintJob, QueryRequest};
use crate::widgets::{
    scope_filter, sub_header, RenderContext, RenderedWidget, WidgetRenderer,
};

pub struct FormRenderer;

impl WidgetRenderer for FormRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Form
    }

    fn render(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
    ) -> Result<RenderedWidget, EngineError> {
        let scope = scope_filter(spec, cx.parent_id);

        // The form edits the first related record, or creates one when none
        // exists yet.
        let id_field = vec!["id".to_string()];
        let page = cx.engine.resources().query(&QueryRequest {
            resource: &spec.resource,
            filter: scope.as_ref(),
            fields: &id_field,
            order_by: None,
            start: Some(0),
            limit: Some(1),
        })?;
        let record_id = page.ids.first().cloned();

        let permissions = cx.engine.permissions();
        let readonly = match &record_id {
            Some(id) => !permissions.can(Action::Update, &spec.resource, Some(id)),
            None => !permissions.can(Action::Create, &spec.resource, None),
        };

        let form = cx.engine.painter().paint_form(&FormPaintJob {
            resource: &spec.resource,
            record_id: record_id.as_deref(),
            fields: &spec.fields,
            readonly,
        });

        let body = format!(
            "<div class=\"profile-widget profile-form\">{header}\
             <div class=\"form-container thumbnail\">{form}</div></div>",
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
