//! Row-window negotiation for the two partial-update protocols.
//!
//! Pagination parameters are advisory: anything malformed falls back to a
//! default instead of failing the request. Sort and search parameters are the
//! resource collaborator's business, not negotiated here.

use crate::request::QueryParams;

/// Grid protocol parameter carrying the first row to display.
const GRID_START_PARAM: &str = "iDisplayStart";

/// Grid protocol parameter carrying the page length.
const GRID_LENGTH_PARAM: &str = "iDisplayLength";

/// Fallback page length for grid widgets without a configured size.
pub const DEFAULT_GRID_PAGE_SIZE: u64 = 10;

/// Negotiated window for a list-kind widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWindow {
    /// First row to return; `None` means "no override, widget decides".
    pub start: Option<u64>,
    /// Row count; `None` means "no override, widget decides".
    pub limit: Option<u64>,
    /// Set when the request addresses exactly one record (`record=<id>`);
    /// the caller must add the id filter, the window is already `(0, 1)`.
    pub single_record: Option<String>,
}

/// Negotiated window for a grid-kind widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWindow {
    pub start: Option<u64>,
    /// `None` means unbounded.
    pub limit: Option<u64>,
    /// Whether the grid pages server-side (client wiring needs to know).
    pub server_side: bool,
}

/// Derives the row window for a list widget.
///
/// Full page loads always get `(0, page_size)`. Ajax refreshes honor
/// `start`/`limit` when both parse, fall back to `(0, page_size)` when either
/// is malformed, and — when `limit` is absent — return no override at all
/// rather than the page default. A `record` parameter short-circuits to a
/// single-row window.
pub fn list_window(params: &QueryParams, page_size: u64, ajax: bool) -> ListWindow {
    if !ajax {
        return ListWindow {
            start: Some(0),
            limit: Some(page_size),
            single_record: None,
        };
    }

    if let Some(record_id) = params.get("record") {
        return ListWindow {
            start: Some(0),
            limit: Some(1),
            single_record: Some(record_id.clone()),
        };
    }

    match params.get("limit") {
        Some(limit) => {
            let parsed = params
                .get("start")
                .and_then(|start| start.parse::<u64>().ok())
                .zip(limit.parse::<u64>().ok());
            match parsed {
                Some((start, limit)) => ListWindow {
                    start: Some(start),
                    limit: Some(limit),
                    single_record: None,
                },
                None => ListWindow {
                    start: Some(0),
                    limit: Some(page_size),
                    single_record: None,
                },
            }
        }
        None => ListWindow {
            start: None,
            limit: None,
            single_record: None,
        },
    }
}

/// Derives the row window for a grid widget.
///
/// Ajax data pulls use the grid client's display-start/display-length
/// parameter names, initial loads use `start`/`limit`. A literal
/// `limit=none` means unbounded; an absent or zero limit means the server
/// default, doubled as a look-ahead buffer when server-side paging is on and
/// unbounded when it is off.
pub fn grid_window(
    params: &QueryParams,
    ajax: bool,
    display_length: u64,
    server_side: bool,
) -> GridWindow {
    let (start_key, limit_key) = if ajax {
        (GRID_START_PARAM, GRID_LENGTH_PARAM)
    } else {
        ("start", "limit")
    };

    let raw_start = params.get(start_key).map(String::as_str);
    let raw_limit = params.get(limit_key).map(String::as_str);

    let default_limit = if server_side {
        Some(2 * display_length)
    } else {
        None
    };

    let (start, limit) = match raw_limit {
        Some(raw) if !raw.is_empty() && raw != "0" => {
            if raw.eq_ignore_ascii_case("none") {
                (raw_start.and_then(|s| s.parse::<u64>().ok()), None)
            } else {
                match raw_start.and_then(|s| s.parse::<u64>().ok()).zip(raw.parse::<u64>().ok()) {
                    Some((start, limit)) => (Some(start), Some(limit)),
                    None => (None, default_limit),
                }
            }
        }
        _ => (None, default_limit),
    };

    GridWindow {
        start,
        limit,
        server_side,
    }
}
