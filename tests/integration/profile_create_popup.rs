use anyhow::Result;
use profilepage::services::Action;
use profilepage::{
    EngineSettings, FilterExpr, HttpMethod, PageConfig, PageRequest, Representation, WidgetKind,
    WidgetSpec,
};
use serde_json::json;

use super::support::{engine, engine_with_permissions, MemoryResource, TestPermissions};

fn contact_widget() -> WidgetSpec {
    let mut contacts = WidgetSpec::new(WidgetKind::List, "contact");
    contacts.context = Some("person_id".to_string());
    contacts.label = "Contacts".to_string();
    contacts
}

fn page_with(widget: WidgetSpec) -> PageConfig {
    PageConfig::new("person").with_widget(widget)
}

fn seeded(count: usize) -> MemoryResource {
    let resources = MemoryResource::new();
    let rows = (0..count)
        .map(|n| json!({"id": n.to_string(), "person_id": "6"}))
        .collect();
    resources.seed("contact", rows);
    resources
}

fn page_request() -> PageRequest {
    PageRequest::new(HttpMethod::Get, Representation::Html).with_parent("6")
}

fn widget_body(engine: &profilepage::Engine, config: &PageConfig) -> String {
    let page = engine
        .compose_page(config, &page_request())
        .expect("page should compose");
    page.rows[0].widgets[0].body.clone()
}

#[test]
fn create_link_propagates_filters_and_refresh_target() -> Result<()> {
    let mut widget = contact_widget();
    widget.filter = Some(FilterExpr::eq("kind", "email"));
    widget.default_field = Some("priority=1".to_string());
    let engine = engine(seeded(1), EngineSettings::default());
    let body = widget_body(&engine, &page_with(widget));

    assert!(body.contains("/contact/create.popup?"));
    assert!(body.contains("person_id=6"), "context filter missing: {body}");
    assert!(body.contains("kind=email"), "static filter missing: {body}");
    assert!(body.contains("priority=1"), "default field missing: {body}");
    assert!(body.contains("refresh=profile-list-contact-0"));
    Ok(())
}

#[test]
fn static_filter_wins_a_parameter_collision() -> Result<()> {
    let mut widget = contact_widget();
    // Both the context and the static filter serialize to person_id.
    widget.filter = Some(FilterExpr::eq("person_id", "override"));
    let engine = engine(seeded(0), EngineSettings::default());
    let body = widget_body(&engine, &page_with(widget));

    assert!(body.contains("person_id=override"));
    assert!(!body.contains("person_id=6"));
    Ok(())
}

#[test]
fn single_valued_widget_hides_the_link_while_a_record_exists() -> Result<()> {
    let mut widget = contact_widget();
    widget.multiple = false;
    let engine = engine(seeded(1), EngineSettings::default());
    let body = widget_body(&engine, &page_with(widget));

    assert!(body.contains("display:none"), "affordance must start hidden");
    assert!(body.contains("data-show-when-empty=\"profile-list-contact-0\""));
    Ok(())
}

#[test]
fn single_valued_widget_shows_the_link_when_empty() -> Result<()> {
    let mut widget = contact_widget();
    widget.multiple = false;
    let engine = engine(seeded(0), EngineSettings::default());
    let body = widget_body(&engine, &page_with(widget));

    assert!(body.contains("profile-add-btn"));
    assert!(!body.contains("display:none"));
    Ok(())
}

#[test]
fn denied_create_suppresses_the_affordance_but_renders_the_widget() -> Result<()> {
    let permissions = TestPermissions::allow_all().deny(Action::Create, "contact");
    let engine = engine_with_permissions(seeded(1), permissions, EngineSettings::default());
    let body = widget_body(&engine, &page_with(contact_widget()));

    assert!(!body.contains("profile-add-btn"));
    assert!(body.contains("card-holder"), "widget itself must render");
    Ok(())
}

#[test]
fn insert_false_disables_the_affordance() -> Result<()> {
    let mut widget = contact_widget();
    widget.insert = false;
    let engine = engine(seeded(1), EngineSettings::default());
    let body = widget_body(&engine, &page_with(widget));
    assert!(!body.contains("profile-add-btn"));
    Ok(())
}

#[test]
fn create_component_routes_through_the_parent_record() -> Result<()> {
    let mut widget = contact_widget();
    widget.create_component = Some("contact".to_string());
    let engine = engine(seeded(1), EngineSettings::default());
    let body = widget_body(&engine, &page_with(widget));
    assert!(body.contains("/contact/6/contact/create.popup"));
    Ok(())
}
