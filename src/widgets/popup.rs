//! Create-popup affordances for list and grid widgets.
//!
//! The affordance is a modal link to the target resource's create form,
//! carrying the widget's filters as query parameters so the new record lands
//! inside the widget's scope, plus a `refresh` parameter naming the listing
//! the popup should reload on success.

use serde::Serialize;

use crate::config::{WidgetKind, WidgetSpec};
use crate::filters::{merge_query_params, to_query_params, FilterExpr};
use crate::services::{Action, UrlSpec};
use crate::widgets::{html_escape, RenderContext};

/// Declarative show/hide binding: re-show the create link whenever the named
/// listing reports zero rows after an ajax update. Rendered as data
/// attributes for the client to wire up, never as inline script.
#[derive(Debug, Clone, Serialize)]
pub struct ShowWhenEmpty {
    pub listing_id: String,
}

/// A "create related record" affordance.
#[derive(Debug, Clone)]
pub struct CreateAffordance {
    pub url: String,
    pub label: String,
    /// Hidden by default (single-valued relation that already has a record).
    pub hidden: bool,
    /// Client-side visibility rule, present on single-valued list widgets.
    pub show_when_empty: Option<ShowWhenEmpty>,
}

impl CreateAffordance {
    /// Standard modal-link markup for the affordance.
    pub fn html(&self) -> String {
        let style = if self.hidden {
            " style=\"display:none\""
        } else {
            ""
        };
        let binding = self
            .show_when_empty
            .as_ref()
            .map(|rule| format!(" data-show-when-empty=\"{}\"", html_escape(&rule.listing_id)))
            .unwrap_or_default();
        format!(
            "<a href=\"{}\" class=\"action-btn profile-add-btn s3_modal\"{style}{binding}>{}</a>",
            html_escape(&self.url),
            html_escape(&self.label)
        )
    }
}

/// Builds the create affordance for a widget, or `None` when insertion is
/// disabled or not permitted.
pub fn build_create_popup(
    cx: &RenderContext<'_>,
    spec: &WidgetSpec,
    listing_id: &str,
    context: Option<&FilterExpr>,
    total_rows: u64,
) -> Option<CreateAffordance> {
    if !spec.insert {
        return None;
    }
    if !cx
        .engine
        .permissions()
        .can(Action::Create, &spec.resource, None)
    {
        return None;
    }

    // Context filter first, then the static filter; later keys win.
    let mut sets = Vec::new();
    if let Some(context) = context {
        sets.push(to_query_params(context));
    }
    if let Some(filter) = &spec.filter {
        sets.push(to_query_params(filter));
    }
    let mut params: Vec<(String, String)> = merge_query_params(&sets).into_iter().collect();

    if let Some(default) = &spec.default_field {
        if let Some((field, value)) = default.split_once('=') {
            params.push((field.to_string(), value.to_string()));
        }
    }
    params.push(("refresh".to_string(), listing_id.to_string()));

    let mut url = UrlSpec::for_resource(&spec.resource);
    if let Some(component) = &spec.create_component {
        url = url.with_arg(cx.parent_id).with_arg(component);
    }
    url = url.with_arg("create").with_representation("popup");
    url.params = params;

    let label = spec
        .create_label
        .clone()
        .unwrap_or_else(|| format!("Create {}", spec.resource));

    let mut affordance = CreateAffordance {
        url: cx.engine.urls().build(&url),
        label,
        hidden: false,
        show_when_empty: None,
    };

    // Single-valued relation on a list widget: affordance exists but is
    // hidden while a record does, with a declarative re-show rule.
    if spec.kind == WidgetKind::List && !spec.multiple {
        affordance.hidden = total_rows > 0;
        affordance.show_when_empty = Some(ShowWhenEmpty {
            listing_id: listing_id.to_string(),
        });
    }

    Some(affordance)
}

/// Renders an affordance to markup, honoring a spec's custom builder.
pub fn create_popup_html(
    cx: &RenderContext<'_>,
    spec: &WidgetSpec,
    affordance: Option<&CreateAffordance>,
) -> String {
    match affordance {
        Some(affordance) => match &spec.create_builder {
            Some(builder) => (builder.0)(cx.request, affordance),
            None => affordance.html(),
        },
        None => String::new(),
    }
}
