//! Filter expressions and their URL-parameter form.
//!
//! Widgets scope their target resource with an explicit expression tree
//! (comparison / AND / OR nodes) that is independent of any query engine's
//! native representation. The tree composes a context filter (relationship to
//! the parent record), the widget's static filter, and ad-hoc record scoping
//! for single-record refreshes. Structural filters are always rebuilt
//! server-side from the widget specification; client parameters never
//! reconstruct them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved context kind for the hierarchical location relationship.
pub const LOCATION_CONTEXT: &str = "location";

/// Path field matched by the hierarchical location filter.
pub const LOCATION_PATH_FIELD: &str = "location.path";

/// Suffix appended to a field name when serializing a LIKE comparison.
const LIKE_SUFFIX: &str = "__like";

/// Comparison operators supported by filter nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compare {
    /// Exact equality.
    Eq,
    /// Pattern match, `*` is the wildcard.
    Like,
}

/// A composable filter expression over a target resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterExpr {
    /// Single field comparison.
    Cmp {
        field: String,
        op: Compare,
        value: String,
    },
    /// Logical AND of all branches.
    AllOf(Vec<FilterExpr>),
    /// Logical OR of any branch.
    AnyOf(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Equality comparison node.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        FilterExpr::Cmp {
            field: field.into(),
            op: Compare::Eq,
            value: value.into(),
        }
    }

    /// LIKE comparison node (`*` wildcard).
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterExpr::Cmp {
            field: field.into(),
            op: Compare::Like,
            value: pattern.into(),
        }
    }

    /// Conjunction, flattening nested ANDs.
    pub fn and(self, other: FilterExpr) -> Self {
        match (self, other) {
            (FilterExpr::AllOf(mut a), FilterExpr::AllOf(b)) => {
                a.extend(b);
                FilterExpr::AllOf(a)
            }
            (FilterExpr::AllOf(mut a), b) => {
                a.push(b);
                FilterExpr::AllOf(a)
            }
            (a, FilterExpr::AllOf(mut b)) => {
                b.insert(0, a);
                FilterExpr::AllOf(b)
            }
            (a, b) => FilterExpr::AllOf(vec![a, b]),
        }
    }

    /// Disjunction, flattening nested ORs.
    pub fn or(self, other: FilterExpr) -> Self {
        match (self, other) {
            (FilterExpr::AnyOf(mut a), FilterExpr::AnyOf(b)) => {
                a.extend(b);
                FilterExpr::AnyOf(a)
            }
            (FilterExpr::AnyOf(mut a), b) => {
                a.push(b);
                FilterExpr::AnyOf(a)
            }
            (a, FilterExpr::AnyOf(mut b)) => {
                b.insert(0, a);
                FilterExpr::AnyOf(b)
            }
            (a, b) => FilterExpr::AnyOf(vec![a, b]),
        }
    }
}

/// ANDs two optional filters together.
pub fn merge_filters(base: Option<FilterExpr>, extra: Option<FilterExpr>) -> Option<FilterExpr> {
    match (base, extra) {
        (Some(a), Some(b)) => Some(a.and(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Resolves a declared context kind into a filter scoping the target
/// resource to the parent record.
///
/// The generic case is a direct equality on the reference field named by the
/// context. The reserved `location` kind matches the parent record itself,
/// its descendants, and records whose ancestor path passes through it; path
/// fields store delimited ancestor chains, so the parent can appear at the
/// start, middle, or end and all four patterns must be checked. A context
/// naming a field the target resource does not have surfaces as a
/// configuration error when the filter is applied, not here.
pub fn resolve_context(context: &str, parent_id: &str) -> FilterExpr {
    if context == LOCATION_CONTEXT {
        FilterExpr::AnyOf(vec![
            FilterExpr::like(LOCATION_PATH_FIELD, parent_id),
            FilterExpr::like(LOCATION_PATH_FIELD, format!("{parent_id}/*")),
            FilterExpr::like(LOCATION_PATH_FIELD, format!("*/{parent_id}/*")),
            FilterExpr::like(LOCATION_PATH_FIELD, format!("*/{parent_id}")),
        ])
    } else {
        FilterExpr::eq(context, parent_id)
    }
}

/// Serializes a filter expression into flat URL query parameters.
///
/// Equality nodes map to `field=value`, LIKE nodes to `field__like=pattern`,
/// and OR branches sharing a key are comma-joined into one parameter. When
/// distinct filters serialize to the same key, the later one overwrites the
/// earlier one; observed behavior, kept as-is.
pub fn to_query_params(expr: &FilterExpr) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    collect_params(expr, &mut params);
    params
}

fn collect_params(expr: &FilterExpr, params: &mut BTreeMap<String, String>) {
    match expr {
        FilterExpr::Cmp { field, op, value } => {
            let key = match op {
                Compare::Eq => field.clone(),
                Compare::Like => format!("{field}{LIKE_SUFFIX}"),
            };
            params.insert(key, value.clone());
        }
        FilterExpr::AllOf(branches) => {
            for branch in branches {
                collect_params(branch, params);
            }
        }
        FilterExpr::AnyOf(branches) => {
            let mut merged: BTreeMap<String, String> = BTreeMap::new();
            for branch in branches {
                let mut branch_params = BTreeMap::new();
                collect_params(branch, &mut branch_params);
                for (key, value) in branch_params {
                    merged
                        .entry(key)
                        .and_modify(|existing| {
                            existing.push(',');
                            existing.push_str(&value);
                        })
                        .or_insert(value);
                }
            }
            params.extend(merged);
        }
    }
}

/// Merges serialized filter parameter sets, later sets winning on collision.
pub fn merge_query_params(sets: &[BTreeMap<String, String>]) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for set in sets {
        for (key, value) in set {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
