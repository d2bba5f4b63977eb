//! Page configuration: widget specifications, titles, and engine settings.
//!
//! A profile page is declared once per parent resource type as an ordered
//! list of widget specifications. Specs are loaded fresh per request (callers
//! may cache); widget indexes are assigned at load time from list position
//! and are the only handle ajax requests use to re-address a widget, so the
//! list must not be reordered while client state is in flight.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::filters::FilterExpr;
use crate::request::PageRequest;

/// The closed set of widget kinds, plus a carrier for unrecognized kinds
/// read from configuration (those are skipped or rejected at dispatch,
/// depending on strict mode).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    List,
    Grid,
    Form,
    Map,
    TextPanel,
    Other(String),
}

impl From<String> for WidgetKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "list" => WidgetKind::List,
            "grid" => WidgetKind::Grid,
            "form" => WidgetKind::Form,
            "map" => WidgetKind::Map,
            "text-panel" => WidgetKind::TextPanel,
            _ => WidgetKind::Other(value),
        }
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetKind::List => "list",
            WidgetKind::Grid => "grid",
            WidgetKind::Form => "form",
            WidgetKind::Map => "map",
            WidgetKind::TextPanel => "text-panel",
            WidgetKind::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// A page-level string that is either a literal or computed per request.
#[derive(Clone)]
pub enum PageText {
    Literal(String),
    Derived(Arc<dyn Fn(&PageRequest) -> String + Send + Sync>),
}

impl PageText {
    pub fn resolve(&self, request: &PageRequest) -> String {
        match self {
            PageText::Literal(text) => text.clone(),
            PageText::Derived(derive) => derive(request),
        }
    }
}

impl fmt::Debug for PageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageText::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            PageText::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for PageText {
    fn from(value: &str) -> Self {
        PageText::Literal(value.to_string())
    }
}

impl From<String> for PageText {
    fn from(value: String) -> Self {
        PageText::Literal(value)
    }
}

/// Declarative specification of one widget on a profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetSpec {
    /// Position on the page, assigned at load time. Stable for the lifetime
    /// of the page configuration.
    #[serde(skip)]
    pub index: usize,
    pub kind: WidgetKind,
    /// Target resource type the widget lists or edits.
    pub resource: String,
    /// Optional relationship name scoping the target to the parent record.
    #[serde(default)]
    pub context: Option<String>,
    /// Optional static filter ANDed with the context filter.
    #[serde(default)]
    pub filter: Option<FilterExpr>,
    /// Fields to select and display.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Layout units occupied (1 or 2); defaulted by kind when absent.
    #[serde(default)]
    pub col_span: Option<u8>,
    /// Rows per page; defaulted by kind when absent.
    #[serde(default)]
    pub page_size: Option<u64>,
    /// Whether a create-popup affordance may be offered.
    #[serde(default = "default_true")]
    pub insert: bool,
    /// Label for the create-popup link; defaults to "Create {resource}".
    #[serde(default)]
    pub create_label: Option<String>,
    /// Component path segment for the create URL, when the new record is
    /// created through the parent record's component endpoint.
    #[serde(default)]
    pub create_component: Option<String>,
    /// Single fixed `field=value` pair propagated to the create form.
    #[serde(default)]
    pub default_field: Option<String>,
    /// Whether more than one related record is expected. `false` hides the
    /// create affordance while a record exists.
    #[serde(default = "default_true")]
    pub multiple: bool,
    /// Whether a list widget contributes a feature layer to map widgets.
    #[serde(default = "default_true")]
    pub show_on_map: bool,
    /// Row layout hint passed through to the fragment painter.
    #[serde(default)]
    pub layout: Option<String>,
    /// Map height in pixels (map widgets only).
    #[serde(default)]
    pub height: Option<u32>,
    /// Map width in pixels (map widgets only).
    #[serde(default)]
    pub width: Option<u32>,
    /// Custom create-affordance markup builder, replacing the standard link.
    #[serde(skip)]
    pub create_builder: Option<CreateBuilder>,
}

const fn default_true() -> bool {
    true
}

/// Hook producing custom create-affordance markup.
#[derive(Clone)]
pub struct CreateBuilder(
    pub Arc<dyn Fn(&PageRequest, &crate::widgets::popup::CreateAffordance) -> String + Send + Sync>,
);

impl fmt::Debug for CreateBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CreateBuilder(..)")
    }
}

impl WidgetSpec {
    pub fn new(kind: WidgetKind, resource: impl Into<String>) -> Self {
        Self {
            index: 0,
            kind,
            resource: resource.into(),
            context: None,
            filter: None,
            fields: Vec::new(),
            order_by: None,
            label: String::new(),
            icon: None,
            col_span: None,
            page_size: None,
            insert: true,
            create_label: None,
            create_component: None,
            default_field: None,
            multiple: true,
            show_on_map: true,
            layout: None,
            height: None,
            width: None,
            create_builder: None,
        }
    }

    /// Layout units occupied: forms and text panels span the full row.
    pub fn col_span(&self) -> u8 {
        self.col_span.unwrap_or(match self.kind {
            WidgetKind::Form | WidgetKind::TextPanel => 2,
            _ => 1,
        })
    }

    /// Page size with the kind-specific default (4 for lists, 10 for grids).
    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(match self.kind {
            WidgetKind::Grid => crate::pagination::DEFAULT_GRID_PAGE_SIZE,
            _ => 4,
        })
    }
}

/// Full configuration of one profile page type.
#[derive(Debug, Clone, Default)]
pub struct PageConfig {
    /// Parent resource type the page profiles.
    pub resource: String,
    pub title: Option<PageText>,
    pub header: Option<PageText>,
    widgets: Vec<WidgetSpec>,
}

impl PageConfig {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            title: None,
            header: None,
            widgets: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<PageText>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_header(mut self, header: impl Into<PageText>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Appends a widget, assigning its index from its position.
    pub fn push_widget(&mut self, mut spec: WidgetSpec) {
        spec.index = self.widgets.len();
        self.widgets.push(spec);
    }

    pub fn with_widget(mut self, spec: WidgetSpec) -> Self {
        self.push_widget(spec);
        self
    }

    /// The page's widgets in declaration order, indexes assigned.
    pub fn widgets(&self) -> &[WidgetSpec] {
        &self.widgets
    }

    pub fn widget(&self, index: usize) -> Option<&WidgetSpec> {
        self.widgets.get(index)
    }

    /// Loads a page configuration from its JSON declaration.
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        let file: PageConfigFile = serde_json::from_str(data)?;
        let mut config = PageConfig::new(file.resource);
        config.title = file.title.map(PageText::Literal);
        config.header = file.header.map(PageText::Literal);
        for spec in file.widgets {
            config.push_widget(spec);
        }
        Ok(config)
    }

    /// Loads a page configuration from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, crate::error::EngineError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|err| {
            crate::error::EngineError::Configuration(format!(
                "failed reading page config {path:?}: {err}"
            ))
        })?;
        Self::from_json_str(&data).map_err(|err| {
            crate::error::EngineError::Configuration(format!(
                "failed parsing page config {path:?}: {err}"
            ))
        })
    }
}

/// On-disk JSON shape of a page configuration.
#[derive(Debug, Deserialize)]
struct PageConfigFile {
    resource: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    header: Option<String>,
    #[serde(default)]
    widgets: Vec<WidgetSpec>,
}

/// Engine-wide settings, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Fail on unknown widget kinds instead of skipping them.
    #[serde(default)]
    pub strict: bool,
    /// Whether grid widgets page server-side.
    #[serde(default = "default_server_side_pagination")]
    pub server_side_pagination: bool,
    /// Override for the grid display length, taking precedence over the
    /// widget's page size.
    #[serde(default)]
    pub grid_page_size: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strict: false,
            server_side_pagination: default_server_side_pagination(),
            grid_page_size: None,
        }
    }
}

const fn default_server_side_pagination() -> bool {
    true
}

impl EngineSettings {
    pub fn from_toml_str(data: &str) -> Result<Self, crate::error::EngineError> {
        toml::from_str(data).map_err(|err| {
            crate::error::EngineError::Configuration(format!("failed parsing settings: {err}"))
        })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, crate::error::EngineError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|err| {
            crate::error::EngineError::Configuration(format!(
                "failed reading settings {path:?}: {err}"
            ))
        })?;
        Self::from_toml_str(&data)
    }
}
