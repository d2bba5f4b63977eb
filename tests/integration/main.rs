mod profile_config_files;
mod profile_create_popup;
pub mod support;
