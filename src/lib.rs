//! profilepage: a widget composition and dispatch engine for record profile
//! pages.
//!
//! A profile page is a single record's detail view assembled from a
//! configurable list of independent widgets (lists, grids, embedded forms,
//! maps, text panels). Each widget is independently re-fetchable through two
//! partial-update protocols, so internal pagination, sort, or filter changes
//! never force a full page reload. The engine resolves declarative widget
//! specifications into scoped queries, dispatches requests to full-page or
//! partial rendering, packs widgets into a responsive row layout, and derives
//! create-record affordances with propagated filters. Storage, permissions,
//! row painting, and URL construction stay behind the collaborator traits in
//! [`services`].

pub mod compose;
pub mod config;
pub mod error;
pub mod filters;
pub mod pagination;
pub mod request;
pub mod services;
pub mod widgets;

// Re-export commonly used types for convenience.
pub use compose::{Engine, Fragment, PageOutput, PageResponse, Row};
pub use config::{EngineSettings, PageConfig, PageText, WidgetKind, WidgetSpec};
pub use error::EngineError;
pub use filters::FilterExpr;
pub use request::{HttpMethod, PageRequest, Representation};
pub use widgets::grid::GridPayload;
pub use widgets::popup::CreateAffordance;
