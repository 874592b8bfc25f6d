//! Filter AST → Cypher `WHERE` fragment compiler for the graph backend.
//!
//! Identifiers render as `n.field` against the matched node. Cypher has no
//! `LIKE`, so the like family converts its wildcards to an anchored regex
//! under the native `=~` operator, with the `(?i)` prefix carrying
//! case-insensitivity. Array attributes are stored serialized; containment
//! is the same three-pattern test as the object store, expressed with the
//! native `STARTS WITH` / `CONTAINS` / `ENDS WITH` string predicates.

use search_core::{Operator, SearchExpression, SearchValue};

use crate::attrs::AttributeMap;
use crate::error::{Backend, CompileError};
use crate::render;
use crate::shape::{classify, expect_one, expect_range, Shape};

const BACKEND: Backend = Backend::Graph;

/// Compile a filter into a Cypher fragment. Empty or malformed nodes compile
/// to an empty string (no restriction).
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
    match op {
        Operator::And | Operator::Or => {
            let mut parts = Vec::with_capacity(children.len());
            for child in children {
                let fragment = compile_scoped(child, attrs, scope)?;
                if !fragment.is_empty() {
                    parts.push(fragment);
                }
            }
            Ok(match parts.len() {
                0 => String::new(),
                1 => parts.pop().unwrap_or_default(),
                _ => {
                    let native = if op == Operator::And { " AND " } else { " OR " };
                    format!("({})", parts.join(native))
                }
            })
        }
        Operator::Not => {
            if children.len() != 1 {
                return Err(CompileError::NotArity);
            }
            let inner = compile_scoped(&children[0], attrs, scope)?;
            if inner.is_empty() {
                return Ok(String::new());
            }
            Ok(format!("NOT ({inner})"))
        }
        other => Err(CompileError::UnsupportedOperator {
            operator: other,
            backend: BACKEND,
        }),
    }
}

fn ident(field: &str) -> String {
    format!("n.{field}")
}

fn regex_test(field: &str, pattern: &str, case_insensitive: bool) -> String {
    let pattern = if case_insensitive {
        format!("(?i){pattern}")
    } else {
        pattern.to_string()
    };
    format!("{} =~ {}", ident(field), render::quote(&pattern))
}

fn array_containment(field: &str, element: &str) -> String {
    let id = ident(field);
    format!(
        "({id} STARTS WITH {} OR {id} CONTAINS {} OR {id} ENDS WITH {})",
        render::quote(&format!("[{element},")),
        render::quote(&format!(",{element},")),
        render::quote(&format!(",{element}]")),
    )
}

fn leaf(
    field: &str,
    op: Operator,
    value: &SearchValue,
    attrs: &AttributeMap,
) -> Result<String, CompileError> {
    let kind = attrs.require(field)?;
    let id = ident(field);
    Ok(match op {
        Operator::Eq | Operator::Ne | Operator::Gt | Operator::Gte | Operator::Lt
        | Operator::Lte => {
            let raw = expect_one(field, op, value)?;
            let lit = render::scalar_literal(kind, field, raw)?;
            let native = match op {
                Operator::Eq => "=",
                Operator::Ne => "<>",
                Operator::Gt => ">",
                Operator::Gte => ">=",
                Operator::Lt => "<",
                _ => "<=",
            };
            format!("{id} {native} {lit}")
        }

        Operator::In | Operator::NotIn => {
            let literals = value
                .items()
                .into_iter()
                .map(|raw| render::scalar_literal(kind, field, raw))
                .collect::<Result<Vec<_>, _>>()?;
            let test = format!("{id} IN [{}]", literals.join(", "));
            if op == Operator::In {
                test
            } else {
                format!("NOT ({test})")
            }
        }

        Operator::Like => regex_test(field, &render::like_to_regex(expect_one(field, op, value)?), false),
        Operator::ILike => regex_test(field, &render::like_to_regex(expect_one(field, op, value)?), true),
        Operator::NotLike => format!(
            "NOT ({})",
            regex_test(field, &render::like_to_regex(expect_one(field, op, value)?), false)
        ),
        Operator::NotILike => format!(
            "NOT ({})",
            regex_test(field, &render::like_to_regex(expect_one(field, op, value)?), true)
        ),

        Operator::Regexp => regex_test(field, expect_one(field, op, value)?, false),
        Operator::IRegexp => regex_test(field, expect_one(field, op, value)?, true),
        Operator::NotRegexp => {
            format!("NOT ({})", regex_test(field, expect_one(field, op, value)?, false))
        }
        Operator::NotIRegexp => {
            format!("NOT ({})", regex_test(field, expect_one(field, op, value)?, true))
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
            let lo = render::scalar_literal(kind, field, lo)?;
            let hi = render::scalar_literal(kind, field, hi)?;
            let test = format!("({id} >= {lo} AND {id} <= {hi})");
            if op == Operator::Between {
                test
            } else {
                format!("NOT {test}")
            }
        }

        Operator::Contains | Operator::NotContains => {
            let raw = expect_one(field, op, value)?;
            let test = if kind.is_array() {
                let element = render::element_literal(kind, field, raw)?;
                array_containment(field, &element)
            } else {
                let lit = render::scalar_literal(kind, field, raw)?;
                format!("({id} CONTAINS {lit})")
            };
            if op == Operator::Contains {
                test
            } else {
                format!("NOT {test}")
            }
        }

        Operator::And
        | Operator::Or
        | Operator::Not
        | Operator::Tgt
        | Operator::Tget
        | Operator::Ctk => {
            return Err(CompileError::UnsupportedOperator {
                operator: op,
                backend: BACKEND,
            })
        }
    })
}
