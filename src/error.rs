//! Error taxonomy for the widget composition engine.
//!
//! The split matters to callers: `Configuration` is fatal and operator-facing,
//! `BadRequest` maps to a client error, `PermissionDenied` suppresses the
//! affected affordance without aborting page composition, and `Resource`
//! wraps whatever a collaborator raised. Malformed pagination parameters are
//! never errors; they fall back to defaults inside the negotiators.

use thiserror::Error;

/// Errors surfaced by page composition and widget rendering.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Broken page configuration (unknown widget kind in strict mode,
    /// context naming a field the target resource does not have).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Structurally invalid request (unsupported method for the addressed
    /// representation, malformed widget address on the grid data path).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The permission collaborator refused the action.
    #[error("permission denied: cannot {action} {resource}")]
    PermissionDenied { action: String, resource: String },

    /// Failure raised by the resource/query collaborator, propagated as-is.
    #[error("resource error: {0}")]
    Resource(String),
}

impl EngineError {
    /// Shorthand for a permission failure on a resource type.
    pub fn denied(action: impl Into<String>, resource: impl Into<String>) -> Self {
        EngineError::PermissionDenied {
            action: action.into(),
            resource: resource.into(),
        }
    }
}
