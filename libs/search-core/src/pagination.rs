//! Pagination request normalization.
//!
//! Turns a generic pagination request (offset-style or cursor-style, forward
//! or backward) plus an existing filter and order specification into a
//! [`ScanPlan`] ready to hand to a backend compiler.

use serde::Deserialize;

use crate::ast::SearchExpression;
use crate::boundary::{build_boundary, Boundary};
use crate::cursor::decode_cursor;
use crate::order::{OrderBy, SortDir};
use crate::Error;

/// Generic pagination argument, as it arrives from the GraphQL layer.
///
/// Offset-style requests set `limit`/`offset`; cursor-style requests set
/// `first` (+ optional `after`) or `last` (+ optional `before`).
/// `include_cursor` keeps the boundary record itself in the page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationRequest {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub include_cursor: bool,
}

/// Page-size policy. Deserializable so deployments can override it from
/// server configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 1000,
        }
    }
}

/// Normalized scan parameters for one query execution.
///
/// `order` is the effective order (tiebreaker appended, reversed for
/// backward scans); `reversed` tells the caller to flip the fetched page
/// back into request order.
#[derive(Clone, Debug)]
pub struct ScanPlan {
    pub limit: u64,
    pub offset: u64,
    pub filter: Option<SearchExpression>,
    pub order: OrderBy,
    pub reversed: bool,
}

/// Normalize a pagination request against an existing filter and order.
///
/// The default order is the identifying attribute ascending; a caller-given
/// order always gets the identifying attribute appended as tiebreaker.
pub fn normalize(
    request: &PaginationRequest,
    id_attribute: &str,
    filter: Option<SearchExpression>,
    order: Option<OrderBy>,
    limits: &PaginationLimits,
) -> Result<ScanPlan, Error> {
    let offset_style = request.limit.is_some() || request.offset.is_some();
    let cursor_style = request.first.is_some()
        || request.last.is_some()
        || request.after.is_some()
        || request.before.is_some();
    if offset_style && cursor_style {
        return Err(Error::MixedPaginationStyles);
    }

    let effective = order
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| OrderBy::single(id_attribute, SortDir::Asc))
        .ensure_tiebreaker(id_attribute, SortDir::Asc);

    if offset_style {
        return Ok(ScanPlan {
            limit: clamp(request.limit.unwrap_or(limits.default_limit), limits),
            offset: request.offset.unwrap_or(0),
            filter,
            order: effective,
            reversed: false,
        });
    }

    match (request.first, request.last) {
        (Some(_), Some(_)) => Err(Error::ForwardBackwardConflict),
        (None, None) => Err(Error::PaginationUnspecified),

        (Some(first), None) => {
            if request.before.is_some() {
                return Err(Error::ForwardBackwardConflict);
            }
            let mut filter = filter;
            if let Some(after) = request.after.as_deref() {
                let projection = decode_cursor(after)?;
                let bound = build_boundary(
                    &effective,
                    &projection,
                    id_attribute,
                    request.include_cursor,
                    Boundary::After,
                );
                if let Some(expr) = bound.into_filter() {
                    filter = Some(SearchExpression::and_merge(filter, expr));
                }
            }
            Ok(ScanPlan {
                limit: clamp(first, limits),
                offset: 0,
                filter,
                order: effective,
                reversed: false,
            })
        }

        (None, Some(last)) => {
            if request.after.is_some() {
                return Err(Error::ForwardBackwardConflict);
            }
            let mut filter = filter;
            if let Some(before) = request.before.as_deref() {
                let projection = decode_cursor(before)?;
                let bound = build_boundary(
                    &effective,
                    &projection,
                    id_attribute,
                    request.include_cursor,
                    Boundary::Before,
                );
                if let Some(expr) = bound.into_filter() {
                    filter = Some(SearchExpression::and_merge(filter, expr));
                }
            }
            // The boundary is built against the requested order; the scan
            // itself runs reversed and the caller restores page order.
            Ok(ScanPlan {
                limit: clamp(last, limits),
                offset: 0,
                filter,
                order: effective.reversed(),
                reversed: true,
            })
        }
    }
}

fn clamp(requested: u64, limits: &PaginationLimits) -> u64 {
    if requested > limits.max_limit {
        tracing::debug!(
            requested,
            max = limits.max_limit,
            "requested page size clamped"
        );
        return limits.max_limit;
    }
    requested.max(1)
}

/// Post-processing forward slice for record sets already in scan order.
pub fn page_forward<T>(records: Vec<T>, first: u64) -> Vec<T> {
    records.into_iter().take(first as usize).collect()
}

/// Post-processing backward slice: the last `last` records, in order.
pub fn page_backward<T>(records: Vec<T>, last: u64) -> Vec<T> {
    let skip = records.len().saturating_sub(last as usize);
    records.into_iter().skip(skip).collect()
}
