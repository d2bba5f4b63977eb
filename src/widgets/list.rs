//! List-of-related-records widget.

use tracing::debug;

use crate::config::{WidgetKind, WidgetSpec};
use crate::error::EngineError;
use crate::filters::{merge_query_params, to_query_params, FilterExpr};
use crate::pagination::list_window;
use crate::request::{HttpMethod, Representation};
use crate::services::{Action, ListPaintJob, QueryRequest, UrlSpec};
use crate::widgets::{
    context_filter, html_escape, listing_id, popup, sub_header, RenderContext, RenderedWidget,
    WidgetRenderer,
};

pub struct ListRenderer;

impl WidgetRenderer for ListRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::List
    }

    fn render(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
    ) -> Result<RenderedWidget, EngineError> {
        let ajax = cx.request.representation == Representation::ListFragment;
        let context = context_filter(spec, cx.parent_id);
        let scope = crate::filters::merge_filters(context.clone(), spec.filter.clone());
        let listing = listing_id(&spec.resource, spec.index);
        let page_size = spec.page_size();

        // Ajax deletion short-circuits before any rendering; only GET may
        // fall through to a fragment refresh on this representation.
        if ajax && cx.request.method != HttpMethod::Get {
            return self.ajax_delete(cx, spec, scope.clone());
        }

        let window = list_window(&cx.request.params, page_size, ajax);
        let mut filter = scope;
        if let Some(record_id) = &window.single_record {
            filter = crate::filters::merge_filters(
                filter,
                Some(FilterExpr::eq("id", record_id.clone())),
            );
        }

        let page = cx.engine.resources().query(&QueryRequest {
            resource: &spec.resource,
            filter: filter.as_ref(),
            fields: &spec.fields,
            order_by: spec.order_by.as_deref(),
            start: window.start,
            limit: window.limit,
        })?;
        debug!(
            widget = spec.index,
            resource = %spec.resource,
            rows = page.rows.len(),
            total = page.total,
            "rendered list widget"
        );

        let data = cx.engine.painter().paint_list(&ListPaintJob {
            listing_id: &listing,
            rows: &page.rows,
            fields: &spec.fields,
            layout: spec.layout.as_deref(),
        });

        if ajax {
            // Fragment refresh: the painted rows only, no card chrome.
            return Ok(RenderedWidget {
                index: spec.index,
                listing_id: Some(listing),
                body: data,
                col_span: spec.col_span(),
                total_rows: Some(page.total),
            });
        }

        let ajax_url =
            crate::widgets::widget_ajax_url(cx, spec.index, Representation::ListFragment);
        let more = self.more_link(cx, spec, context.as_ref(), page.total, page_size);
        let create =
            popup::build_create_popup(cx, spec, &listing, context.as_ref(), page.total);
        let create = popup::create_popup_html(cx, spec, create.as_ref());

        let body = format!(
            "<div class=\"profile-widget profile-list\">{create}{header}\
             <div id=\"{listing}\" class=\"card-holder\" data-ajax-url=\"{ajax_url}\" \
             data-page-size=\"{page_size}\">{data}{more}</div></div>",
            header = sub_header(spec.icon.as_deref(), &spec.label),
            ajax_url = html_escape(&ajax_url),
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

impl ListRenderer {
    /// Handles DELETE (or POST carrying a `delete` parameter) on the
    /// list-fragment protocol: removes the addressed row within the widget's
    /// scope. Any other non-GET request on this representation is rejected.
    fn ajax_delete(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
        scope: Option<FilterExpr>,
    ) -> Result<RenderedWidget, EngineError> {
        let Some(record_id) = cx.request.param("delete") else {
            return Err(EngineError::BadRequest(format!(
                "method {:?} not allowed on list fragment without a delete target",
                cx.request.method
            )));
        };
        if !cx
            .engine
            .permissions()
            .can(Action::Delete, &spec.resource, Some(record_id))
        {
            return Err(EngineError::denied(
                Action::Delete.as_str(),
                spec.resource.clone(),
            ));
        }
        let filter = crate::filters::merge_filters(
            scope,
            Some(FilterExpr::eq("id", record_id.to_string())),
        )
        .unwrap_or_else(|| FilterExpr::eq("id", record_id.to_string()));
        let removed = cx.engine.resources().delete_where(&spec.resource, &filter)?;
        debug!(
            widget = spec.index,
            resource = %spec.resource,
            record = record_id,
            removed,
            "ajax delete on list widget"
        );
        Ok(RenderedWidget {
            index: spec.index,
            listing_id: Some(listing_id(&spec.resource, spec.index)),
            body: String::new(),
            col_span: spec.col_span(),
            total_rows: None,
        })
    }

    /// "See more" modal link when the total exceeds one page.
    fn more_link(
        &self,
        cx: &RenderContext<'_>,
        spec: &WidgetSpec,
        context: Option<&FilterExpr>,
        total: u64,
        page_size: u64,
    ) -> String {
        if page_size == 0 || total <= page_size {
            return String::new();
        }
        let mut sets = Vec::new();
        if let Some(context) = context {
            sets.push(to_query_params(context));
        }
        if let Some(filter) = &spec.filter {
            sets.push(to_query_params(filter));
        }
        let mut url = UrlSpec::for_resource(&spec.resource)
            .with_arg("datalist")
            .with_representation("popup");
        url.params = merge_query_params(&sets).into_iter().collect();
        let url = cx.engine.urls().build(&url);
        format!(
            "<div class=\"more_profile\"><a class=\"s3_modal\" href=\"{}\" title=\"{}\">\
             see more ({})</a></div>",
            html_escape(&url),
            html_escape(&spec.label),
            total - page_size
        )
    }
}
