use anyhow::Result;
use profilepage::{EngineSettings, PageConfig, WidgetKind};
use std::fs;
use tempfile::TempDir;

#[test]
fn page_config_loads_from_a_json_file() -> Result<()> {
    let workspace = TempDir::new()?;
    let path = workspace.path().join("office_profile.json");
    fs::write(
        &path,
        r#"{
            "resource": "office",
            "title": "Office Profile",
            "widgets": [
                {"kind": "list", "resource": "staff", "context": "office_id",
                 "label": "Staff", "page_size": 6},
                {"kind": "form", "resource": "office_details",
                 "context": "office_id", "label": "Details"}
            ]
        }"#,
    )?;

    let config = PageConfig::from_json_file(&path)?;
    assert_eq!(config.resource, "office");
    let widgets = config.widgets();
    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[0].kind, WidgetKind::List);
    assert_eq!(widgets[0].page_size(), 6);
    assert_eq!(widgets[1].index, 1);
    assert_eq!(widgets[1].col_span(), 2);
    Ok(())
}

#[test]
fn unreadable_page_config_is_a_configuration_error() {
    let err = PageConfig::from_json_file("/nonexistent/page.json")
        .expect_err("missing file must fail");
    assert!(matches!(err, profilepage::EngineError::Configuration(_)));
}

#[test]
fn settings_load_from_a_toml_file() -> Result<()> {
    let workspace = TempDir::new()?;
    let path = workspace.path().join("engine.toml");
    fs::write(&path, "strict = true\ngrid_page_size = 25\n")?;

    let settings = EngineSettings::from_toml_file(&path)?;
    assert!(settings.strict);
    assert!(settings.server_side_pagination, "default must survive partial files");
    assert_eq!(settings.grid_page_size, Some(25));
    Ok(())
}

#[test]
fn malformed_settings_are_a_configuration_error() {
    let err = EngineSettings::from_toml_str("strict = \"maybe\"")
        .expect_err("bad settings must fail");
    assert!(matches!(err, profilepage::EngineError::Configuration(_)));
}
