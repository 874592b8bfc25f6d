//! Keyset boundary predicate construction.
//!
//! Given an order specification and a decoded cursor projection, build the
//! filter expression that selects exactly the records beyond (or before) the
//! cursor position under that ordering.
//!
//! The tree is built right-to-left over the order entries. The rightmost
//! entry forms the base condition; every entry to its left wraps the
//! accumulated expression as
//!
//! ```text
//! AND( field <relaxed> cursor_value,
//!      OR( field <strict> cursor_value, <previous expression> ) )
//! ```
//!
//! which is exact lexicographic tuple comparison: a strictly-beyond earlier
//! field qualifies a record on its own, while equality defers to the
//! remaining entries. The identifying attribute uses the strict comparison
//! (unless the boundary record itself is to be included) so that the total
//! order never re-selects the cursor record.

use std::fmt;

use crate::ast::{Operator, SearchExpression, ValueType};
use crate::cursor::{raw_value, Projection};
use crate::order::{OrderBy, SortDir};

/// Direction of the boundary relative to the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Records beyond the cursor in scan order (forward pagination).
    After,
    /// Records before the cursor in scan order (backward pagination).
    Before,
}

/// Why a boundary could not be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegradedReason {
    /// No identifying attribute was supplied.
    MissingIdAttribute,
    /// The order specification does not contain the identifying attribute,
    /// so tuple ordering is not total.
    OrderWithoutIdAttribute,
    /// The cursor projection lacks a value for at least one order field.
    IncompleteCursor,
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DegradedReason::MissingIdAttribute => "missing identifying attribute",
            DegradedReason::OrderWithoutIdAttribute => {
                "order specification lacks the identifying attribute"
            }
            DegradedReason::IncompleteCursor => "cursor lacks a value for an order field",
        })
    }
}

/// Outcome of boundary construction.
///
/// `Unbounded` preserves the historical permissive behavior (a no-op filter)
/// while staying distinguishable from a real predicate, so callers can refuse
/// an unbounded scan instead of silently serving unfiltered data.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundaryPredicate {
    Bounded(SearchExpression),
    Unbounded(DegradedReason),
}

impl BoundaryPredicate {
    pub fn is_bounded(&self) -> bool {
        matches!(self, BoundaryPredicate::Bounded(_))
    }

    /// The historical no-op behavior: degraded inputs yield no filter at all.
    pub fn into_filter(self) -> Option<SearchExpression> {
        match self {
            BoundaryPredicate::Bounded(expr) => Some(expr),
            BoundaryPredicate::Unbounded(_) => None,
        }
    }
}

/// Build the boundary predicate for `cursor` under `order`.
///
/// `include_boundary` keeps the cursor record itself in the selected set
/// (relaxed comparison on the identifying attribute).
pub fn build_boundary(
    order: &OrderBy,
    cursor: &Projection,
    id_attribute: &str,
    include_boundary: bool,
    direction: Boundary,
) -> BoundaryPredicate {
    if id_attribute.is_empty() {
        return degraded(DegradedReason::MissingIdAttribute);
    }
    if order.is_empty() || !order.contains_field(id_attribute) {
        return degraded(DegradedReason::OrderWithoutIdAttribute);
    }
    if order.0.iter().any(|key| !cursor.contains_key(&key.field)) {
        return degraded(DegradedReason::IncompleteCursor);
    }

    let relaxed = |dir: SortDir| match (direction, dir) {
        (Boundary::After, SortDir::Asc) | (Boundary::Before, SortDir::Desc) => Operator::Gte,
        (Boundary::After, SortDir::Desc) | (Boundary::Before, SortDir::Asc) => Operator::Lte,
    };
    let strict = |dir: SortDir| match (direction, dir) {
        (Boundary::After, SortDir::Asc) | (Boundary::Before, SortDir::Desc) => Operator::Gt,
        (Boundary::After, SortDir::Desc) | (Boundary::Before, SortDir::Asc) => Operator::Lt,
    };
    let leaf = |field: &str, op: Operator| {
        let value = raw_value(cursor.get(field).unwrap_or(&serde_json::Value::Null));
        SearchExpression::leaf(field, op, &value, ValueType::Scalar)
    };

    // Base step: rightmost order entry. Strict only for the identifying
    // attribute when the boundary record is excluded.
    let last = &order.0[order.0.len() - 1];
    let mut base_op = relaxed(last.dir);
    if !include_boundary && last.field == id_attribute {
        base_op = strict(last.dir);
    }
    let mut expr = leaf(&last.field, base_op);

    // Recursive steps, right to left over the remaining entries.
    for key in order.0.iter().rev().skip(1) {
        let mut relaxed_op = relaxed(key.dir);
        let strict_op = strict(key.dir);
        if !include_boundary && key.field == id_attribute {
            relaxed_op = strict_op;
        }
        expr = SearchExpression::all_of(vec![
            leaf(&key.field, relaxed_op),
            SearchExpression::any_of(vec![leaf(&key.field, strict_op), expr]),
        ]);
    }

    BoundaryPredicate::Bounded(expr)
}

fn degraded(reason: DegradedReason) -> BoundaryPredicate {
    tracing::warn!(reason = %reason, "cursor boundary degraded to an unbounded scan");
    BoundaryPredicate::Unbounded(reason)
}
