//! Shared node classification for the five compilers.
//!
//! Every compiler walks the same shapes: an empty node compiles to the
//! backend's "always true", a leaf to one comparison, a combinator to a
//! native join. A node carrying both a field and children scopes its
//! children to that field: they inherit it as their implicit field and are
//! joined with the node's combinator (used by recursive cursor composition).

use search_core::{Operator, SearchExpression, SearchValue};

use crate::error::{Backend, CompileError};

pub(crate) enum Shape<'a> {
    Empty,
    Leaf {
        field: &'a str,
        op: Operator,
        value: &'a SearchValue,
    },
    Combinator {
        op: Operator,
        children: &'a [SearchExpression],
    },
    Scoped {
        field: &'a str,
        op: Operator,
        children: &'a [SearchExpression],
    },
}

pub(crate) fn classify<'a>(
    expr: &'a SearchExpression,
    scope: Option<&'a str>,
) -> Result<Shape<'a>, CompileError> {
    // A node without an operator, or with neither value nor children, is the
    // permissive empty predicate.
    let Some(op) = expr.operator else {
        return Ok(Shape::Empty);
    };
    if expr.value.is_none() && expr.children.is_none() {
        return Ok(Shape::Empty);
    }

    match &expr.children {
        Some(children) => match expr.field.as_deref().or(scope) {
            Some(field) => Ok(Shape::Scoped {
                field,
                op,
                children,
            }),
            None => Ok(Shape::Combinator { op, children }),
        },
        None => {
            let Some(value) = expr.value.as_ref() else {
                return Ok(Shape::Empty);
            };
            match expr.field.as_deref().or(scope) {
                Some(field) => Ok(Shape::Leaf { field, op, value }),
                None => Err(CompileError::MissingField { operator: op }),
            }
        }
    }
}

/// A single raw operand, for scalar comparisons.
pub(crate) fn expect_one<'a>(
    field: &str,
    op: Operator,
    value: &'a SearchValue,
) -> Result<&'a str, CompileError> {
    match value {
        SearchValue::One(s) => Ok(s),
        SearchValue::Many(items) if items.len() == 1 => Ok(&items[0]),
        SearchValue::Many(_) => Err(CompileError::SingleValue {
            field: field.to_string(),
            operator: op,
        }),
    }
}

/// The two bounds of a `between`/`notBetween` range.
pub(crate) fn expect_range<'a>(
    field: &str,
    op: Operator,
    value: &'a SearchValue,
    backend: Backend,
) -> Result<(&'a str, &'a str), CompileError> {
    let items = value.items();
    if items.len() != 2 {
        return Err(CompileError::RangeArity {
            field: field.to_string(),
            operator: op,
            backend,
        });
    }
    Ok((items[0], items[1]))
}
