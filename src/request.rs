//! Request envelope handed to the composition engine by the web layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw query parameters. A `BTreeMap` keeps iteration deterministic, which in
/// turn keeps composed output stable across identical requests.
pub type QueryParams = BTreeMap<String, String>;

/// HTTP methods the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Methods a profile page accepts at all; anything else is rejected
    /// before dispatch.
    pub fn allowed_on_profile(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Post | HttpMethod::Delete)
    }
}

/// Representation tag selecting full-page vs. partial-update rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Representation {
    /// Full page load.
    Html,
    /// Ajax refresh of a single list widget.
    ListFragment,
    /// Grid widget: interactive markup on GET, structured data pull otherwise.
    GridFragment,
}

impl Representation {
    pub fn as_str(self) -> &'static str {
        match self {
            Representation::Html => "html",
            Representation::ListFragment => "list-fragment",
            Representation::GridFragment => "grid-fragment",
        }
    }
}

/// One incoming request against a profile page.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Id of the parent record whose profile is shown. `None` means the
    /// caller should redirect to the collection view instead.
    pub parent_id: Option<String>,
    /// Display label of the parent record, used as the title fallback.
    pub record_label: Option<String>,
    pub method: HttpMethod,
    pub representation: Representation,
    pub params: QueryParams,
}

impl PageRequest {
    pub fn new(method: HttpMethod, representation: Representation) -> Self {
        Self {
            parent_id: None,
            record_label: None,
            method,
            representation,
            params: QueryParams::new(),
        }
    }

    pub fn with_parent(mut self, id: impl Into<String>) -> Self {
        self.parent_id = Some(id.into());
        self
    }

    pub fn with_record_label(mut self, label: impl Into<String>) -> Self {
        self.record_label = Some(label.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Looks up a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}
