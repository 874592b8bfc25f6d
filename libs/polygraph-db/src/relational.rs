//! Filter AST → `sea_orm::Condition` compiler for the relational backend.

use sea_orm::sea_query::{Alias, Condition, Expr, Func, SimpleExpr};
use search_core::{Operator, SearchExpression, SearchValue};

use crate::attrs::{AttributeKind, AttributeMap};
use crate::error::{Backend, CompileError};
use crate::render;
use crate::shape::{classify, expect_one, expect_range, Shape};

const BACKEND: Backend = Backend::Relational;

/// Compile a filter into a condition tree ready for a `SELECT … WHERE`.
/// An empty or malformed node compiles to the empty (always-true) condition.
pub fn compile(
    expr: &SearchExpression,
    attrs: &AttributeMap,
) -> Result<Condition, CompileError> {
    compile_scoped(expr, attrs, None)
}

fn compile_scoped(
    expr: &SearchExpression,
    attrs: &AttributeMap,
    scope: Option<&str>,
) -> Result<Condition, CompileError> {
    match classify(expr, scope)? {
        Shape::Empty => Ok(Condition::all()),
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
) -> Result<Condition, CompileError> {
    match op {
        Operator::And | Operator::Or => {
            if children.is_empty() {
                return Ok(Condition::all());
            }
            let mut cond = if op == Operator::And {
                Condition::all()
            } else {
                Condition::any()
            };
            for child in children {
                cond = cond.add(compile_scoped(child, attrs, scope)?);
            }
            Ok(cond)
        }
        Operator::Not => {
            if children.len() != 1 {
                return Err(CompileError::NotArity);
            }
            Ok(Condition::all()
                .not()
                .add(compile_scoped(&children[0], attrs, scope)?))
        }
        other => Err(CompileError::UnsupportedOperator {
            operator: other,
            backend: BACKEND,
        }),
    }
}

fn col(field: &str) -> Expr {
    Expr::col(Alias::new(field))
}

fn one_condition(expr: SimpleExpr) -> Condition {
    Condition::all().add(expr)
}

fn negated(expr: SimpleExpr) -> Condition {
    Condition::all().not().add(expr)
}

fn lower_like(field: &str, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(col(field))).like(pattern.to_lowercase())
}

fn regex_match(field: &str, pattern: &str, case_insensitive: bool) -> SimpleExpr {
    let op = if case_insensitive { "~*" } else { "~" };
    Expr::cust_with_values(
        format!("\"{field}\" {op} ?"),
        [sea_orm::Value::String(Some(Box::new(pattern.to_string())))],
    )
}

fn array_contains(
    field: &str,
    kind: &AttributeKind,
    raw: &str,
) -> Result<SimpleExpr, CompileError> {
    let value = render::scalar_sea(kind.element(), field, raw)?;
    Ok(Expr::cust_with_values(
        format!("\"{field}\" @> ARRAY[?]"),
        [value],
    ))
}

fn leaf(
    field: &str,
    op: Operator,
    value: &SearchValue,
    attrs: &AttributeMap,
) -> Result<Condition, CompileError> {
    let kind = attrs.require(field)?;
    match op {
        Operator::Eq | Operator::Ne | Operator::Gt | Operator::Gte | Operator::Lt
        | Operator::Lte => {
            let raw = expect_one(field, op, value)?;
            let v = render::scalar_sea(kind, field, raw)?;
            let expr = match op {
                Operator::Eq => col(field).eq(v),
                Operator::Ne => col(field).ne(v),
                Operator::Gt => col(field).gt(v),
                Operator::Gte => col(field).gte(v),
                Operator::Lt => col(field).lt(v),
                _ => col(field).lte(v),
            };
            Ok(one_condition(expr))
        }

        Operator::In | Operator::NotIn => {
            let values = value
                .items()
                .into_iter()
                .map(|raw| render::scalar_sea(kind, field, raw))
                .collect::<Result<Vec<_>, _>>()?;
            if values.is_empty() {
                // IN () is not valid SQL
                let guard = if op == Operator::In { "1=0" } else { "1=1" };
                return Ok(one_condition(Expr::cust(guard)));
            }
            let expr = if op == Operator::In {
                col(field).is_in(values)
            } else {
                col(field).is_not_in(values)
            };
            Ok(one_condition(expr))
        }

        Operator::Like => {
            let raw = expect_one(field, op, value)?;
            Ok(one_condition(col(field).like(raw)))
        }
        Operator::NotLike => {
            let raw = expect_one(field, op, value)?;
            Ok(negated(col(field).like(raw)))
        }
        Operator::ILike => {
            let raw = expect_one(field, op, value)?;
            Ok(one_condition(lower_like(field, raw)))
        }
        Operator::NotILike => {
            let raw = expect_one(field, op, value)?;
            Ok(negated(lower_like(field, raw)))
        }

        Operator::Regexp => {
            let raw = expect_one(field, op, value)?;
            Ok(one_condition(regex_match(field, raw, false)))
        }
        Operator::NotRegexp => {
            let raw = expect_one(field, op, value)?;
            Ok(negated(regex_match(field, raw, false)))
        }
        Operator::IRegexp => {
            let raw = expect_one(field, op, value)?;
            Ok(one_condition(regex_match(field, raw, true)))
        }
        Operator::NotIRegexp => {
            let raw = expect_one(field, op, value)?;
            Ok(negated(regex_match(field, raw, true)))
        }

        Operator::Between | Operator::NotBetween => {
            if kind.is_array() {
                return Err(CompileError::RangeOnArray {
                    field: field.to_string(),
                    operator: op,
                    backend: BACKEND,
                });
            }
            let (lo, hi) = expect_range(field, op, value, BACKEND)?;
            let lo = render::scalar_sea(kind, field, lo)?;
            let hi = render::scalar_sea(kind, field, hi)?;
            let expr = if op == Operator::Between {
                col(field).between(lo, hi)
            } else {
                col(field).not_between(lo, hi)
            };
            Ok(one_condition(expr))
        }

        Operator::Contains | Operator::NotContains => {
            let raw = expect_one(field, op, value)?;
            if kind.is_array() {
                let expr = array_contains(field, kind, raw)?;
                if op == Operator::Contains {
                    Ok(one_condition(expr))
                } else {
                    Ok(negated(expr))
                }
            } else {
                let expr = col(field).like(render::like_contains(raw));
                if op == Operator::Contains {
                    Ok(one_condition(expr))
                } else {
                    Ok(negated(expr))
                }
            }
        }

        Operator::And
        | Operator::Or
        | Operator::Not
        | Operator::Tgt
        | Operator::Tget
        | Operator::Ctk => Err(CompileError::UnsupportedOperator {
            operator: op,
            backend: BACKEND,
        }),
    }
}
