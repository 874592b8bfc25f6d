//! Filter AST → S3-Select `WHERE` fragment compiler for the object-store
//! backend.
//!
//! Objects are scanned with S3 Select, so identifiers render as `s."field"`.
//! Array attributes are stored as their JSON serialization; containment is
//! synthesized as a disjunction of three `LIKE` patterns testing the value
//! as first, middle or last element. The heuristic is approximate (values
//! containing the delimiter can false-positive, one-element arrays are
//! missed) and is preserved as-is for query compatibility.

use search_core::{Operator, SearchExpression, SearchValue};

use crate::attrs::AttributeMap;
use crate::error::{Backend, CompileError};
use crate::render;
use crate::shape::{classify, expect_one, expect_range, Shape};

const BACKEND: Backend = Backend::ObjectStore;

/// Compile a filter into an S3-Select fragment. Empty or malformed nodes
/// compile to an empty string (no restriction).
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
    format!("s.\"{field}\"")
}

/// The three containment patterns over a JSON-serialized array: value as
/// first, middle or last element.
fn containment_patterns(element: &str) -> [String; 3] {
    [
        format!("[{element},%"),
        format!("%,{element},%"),
        format!("%,{element}]"),
    ]
}

fn array_containment(field: &str, element: &str) -> String {
    let id = ident(field);
    let tests: Vec<String> = containment_patterns(element)
        .into_iter()
        .map(|p| format!("{id} LIKE {}", render::quote(&p)))
        .collect();
    format!("({})", tests.join(" OR "))
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
                Operator::Ne => "!=",
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
            if literals.is_empty() {
                // IN () is not valid; keep the truth value explicit
                let guard = if op == Operator::In { "1 = 0" } else { "1 = 1" };
                guard.to_string()
            } else {
                let native = if op == Operator::In {
                    "IN"
                } else {
                    "NOT IN"
                };
                format!("{id} {native} ({})", literals.join(", "))
            }
        }

        Operator::Like => {
            let raw = expect_one(field, op, value)?;
            format!("{id} LIKE {}", render::quote(raw))
        }
        Operator::NotLike => {
            let raw = expect_one(field, op, value)?;
            format!("{id} NOT LIKE {}", render::quote(raw))
        }
        Operator::ILike => {
            let raw = expect_one(field, op, value)?;
            format!("LOWER({id}) LIKE LOWER({})", render::quote(raw))
        }
        Operator::NotILike => {
            let raw = expect_one(field, op, value)?;
            format!("LOWER({id}) NOT LIKE LOWER({})", render::quote(raw))
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
            let native = if op == Operator::Between {
                "BETWEEN"
            } else {
                "NOT BETWEEN"
            };
            format!("{id} {native} {lo} AND {hi}")
        }

        Operator::Contains | Operator::NotContains => {
            let raw = expect_one(field, op, value)?;
            if kind.is_array() {
                let element = render::element_literal(kind, field, raw)?;
                let test = array_containment(field, &element);
                if op == Operator::Contains {
                    test
                } else {
                    format!("NOT {test}")
                }
            } else {
                let pattern = render::like_contains(raw);
                let native = if op == Operator::Contains {
                    "LIKE"
                } else {
                    "NOT LIKE"
                };
                format!("{id} {native} {}", render::quote(&pattern))
            }
        }

        // S3 Select has no regex primitive.
        Operator::Regexp
        | Operator::NotRegexp
        | Operator::IRegexp
        | Operator::NotIRegexp
        | Operator::And
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
