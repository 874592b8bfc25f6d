//! Filter AST → CQL `WHERE` fragment compiler for the wide-column backend.
//!
//! The backend supports only a minimal operator subset, and `and` only as a
//! flat conjunction: CQL has no `OR`, no `NOT` and no grouping. The
//! `tgt`/`tget` pseudo-operators compare partition tokens — the table is
//! ordered by the token of the partition key, so cursor pagination cuts away
//! rows at or below the cursor's token.

use search_core::{
    decode_cursor, raw_value, Error, Operator, SearchExpression, SearchValue, ValueType,
};

use crate::attrs::AttributeMap;
use crate::error::{Backend, CompileError};
use crate::render;
use crate::shape::{classify, expect_one, Shape};

const BACKEND: Backend = Backend::WideColumn;

/// Compile a filter into a CQL fragment. Empty or malformed nodes compile to
/// an empty string (no restriction).
pub fn compile(expr: &SearchExpression, attrs: &AttributeMap) -> Result<String, CompileError> {
    compile_scoped(expr, attrs, None)
}

fn compile_scoped(
    expr: &SearchExpression,
    attrs: &AttributeMap,
    scope: Option<&str>,
) -> Result<String, CompileError> {
    match classify(expr, scope)? {
        Shape::Empty => Ok(String::new()),
        Shape::Leaf { field, op, value } => leaf(field, op, value, attrs),
        Shape::Combinator { op, children } => join(op, children, attrs, scope),
        Shape::Scoped {
            field,
            op,
            children,
        } => join(op, children, attrs, Some(field)),
    }
}

fn join(
    op: Operator,
    children: &[SearchExpression],
    attrs: &AttributeMap,
    scope: Option<&str>,
) -> Result<String, CompileError> {
    if op != Operator::And {
        return Err(CompileError::UnsupportedOperator {
            operator: op,
            backend: BACKEND,
        });
    }
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        let fragment = compile_scoped(child, attrs, scope)?;
        if !fragment.is_empty() {
            parts.push(fragment);
        }
    }
    Ok(parts.join(" AND "))
}

fn leaf(
    field: &str,
    op: Operator,
    value: &SearchValue,
    attrs: &AttributeMap,
) -> Result<String, CompileError> {
    let kind = attrs.require(field)?;
    Ok(match op {
        Operator::Eq | Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            let raw = expect_one(field, op, value)?;
            let lit = render::scalar_literal(kind, field, raw)?;
            let native = match op {
                Operator::Eq => "=",
                Operator::Gt => ">",
                Operator::Gte => ">=",
                Operator::Lt => "<",
                _ => "<=",
            };
            format!("{field} {native} {lit}")
        }

        Operator::In => {
            let literals = value
                .items()
                .into_iter()
                .map(|raw| render::scalar_literal(kind, field, raw))
                .collect::<Result<Vec<_>, _>>()?;
            format!("{field} IN ({})", literals.join(", "))
        }

        Operator::Contains => {
            let raw = expect_one(field, op, value)?;
            let lit = render::scalar_literal(kind.element(), field, raw)?;
            format!("{field} CONTAINS {lit}")
        }

        Operator::Ctk => {
            let raw = expect_one(field, op, value)?;
            let lit = render::scalar_literal(kind.element(), field, raw)?;
            format!("{field} CONTAINS KEY {lit}")
        }

        Operator::Tgt | Operator::Tget => {
            let raw = expect_one(field, op, value)?;
            let lit = render::scalar_literal(kind, field, raw)?;
            let native = if op == Operator::Tgt { ">" } else { ">=" };
            format!("TOKEN({field}) {native} TOKEN({lit})")
        }

        _ => {
            return Err(CompileError::UnsupportedOperator {
                operator: op,
                backend: BACKEND,
            })
        }
    })
}

/// Wrap a compiled fragment into a full `WHERE` clause; empty searches yield
/// an empty string.
pub fn where_clause(
    search: Option<&SearchExpression>,
    attrs: &AttributeMap,
    allow_filtering: bool,
) -> Result<String, CompileError> {
    let fragment = match search {
        Some(expr) => compile(expr, attrs)?,
        None => String::new(),
    };
    if fragment.is_empty() {
        return Ok(String::new());
    }
    let suffix = if allow_filtering {
        " ALLOW FILTERING"
    } else {
        ""
    };
    Ok(format!("WHERE {fragment}{suffix}"))
}

/// Graft a token-comparison cursor condition onto an existing search.
///
/// The table is ordered by partition token, so resuming a scan means
/// `TOKEN(id) > TOKEN(cursor_id)` — or `>=` when the boundary record itself
/// is included. A cursor without the identifying attribute degrades to the
/// unmodified search.
pub fn token_cursor_search(
    search: Option<&SearchExpression>,
    cursor: Option<&str>,
    id_attribute: &str,
    include_cursor: bool,
) -> Result<Option<SearchExpression>, Error> {
    let Some(raw) = cursor else {
        return Ok(search.cloned());
    };
    let projection = decode_cursor(raw)?;
    let Some(id_value) = projection.get(id_attribute) else {
        tracing::warn!(
            id_attribute,
            "cursor lacks the identifying attribute; token condition skipped"
        );
        return Ok(search.cloned());
    };
    let op = if include_cursor {
        Operator::Tget
    } else {
        Operator::Tgt
    };
    let condition =
        SearchExpression::leaf(id_attribute, op, &raw_value(id_value), ValueType::Scalar);
    Ok(Some(match search {
        Some(existing) => SearchExpression::all_of(vec![existing.clone(), condition]),
        None => condition,
    }))
}
