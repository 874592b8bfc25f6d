//! Filter AST → document-store (`$`-operator) predicate compiler.
//!
//! Output is the operator object the document driver consumes. Every
//! like/regex variant lowers to the single `$regex` primitive with
//! case-insensitivity carried in the `$options` side channel; negated
//! variants wrap the base operator in `$not`. Array membership on this
//! backend is tested by exact scalar match against one element, so
//! `contains` maps to `$eq` and `notContains` to `$ne`.

use serde_json::{json, Map, Value};
use search_core::{Operator, OrderBy, SearchExpression, SearchValue, SortDir};

use crate::attrs::AttributeMap;
use crate::error::{Backend, CompileError};
use crate::render;
use crate::shape::{classify, expect_one, expect_range, Shape};

const BACKEND: Backend = Backend::Document;

/// Compile a filter into the document predicate object. Empty or malformed
/// nodes compile to `{}` (match everything).
pub fn compile(expr: &SearchExpression, attrs: &AttributeMap) -> Result<Value, CompileError> {
    compile_scoped(expr, attrs, None)
}

fn compile_scoped(
    expr: &SearchExpression,
    attrs: &AttributeMap,
    scope: Option<&str>,
) -> Result<Value, CompileError> {
    match classify(expr, scope)? {
        Shape::Empty => Ok(json!({})),
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
) -> Result<Value, CompileError> {
    match op {
        Operator::And | Operator::Or => {
            if children.is_empty() {
                return Ok(json!({}));
            }
            let compiled = children
                .iter()
                .map(|c| compile_scoped(c, attrs, scope))
                .collect::<Result<Vec<_>, _>>()?;
            let key = if op == Operator::And { "$and" } else { "$or" };
            Ok(json!({ key: compiled }))
        }
        Operator::Not => {
            if children.len() != 1 {
                return Err(CompileError::NotArity);
            }
            // $not is only valid per-operator; top-level negation is $nor.
            Ok(json!({ "$nor": [compile_scoped(&children[0], attrs, scope)?] }))
        }
        other => Err(CompileError::UnsupportedOperator {
            operator: other,
            backend: BACKEND,
        }),
    }
}

fn regex_body(pattern: String, case_insensitive: bool) -> Value {
    if case_insensitive {
        json!({ "$regex": pattern, "$options": "i" })
    } else {
        json!({ "$regex": pattern })
    }
}

fn leaf(
    field: &str,
    op: Operator,
    value: &SearchValue,
    attrs: &AttributeMap,
) -> Result<Value, CompileError> {
    let kind = attrs.require(field)?;
    let body = match op {
        Operator::Eq | Operator::Ne | Operator::Gt | Operator::Gte | Operator::Lt
        | Operator::Lte => {
            let raw = expect_one(field, op, value)?;
            let v = render::scalar_json(kind, field, raw)?;
            let key = match op {
                Operator::Eq => "$eq",
                Operator::Ne => "$ne",
                Operator::Gt => "$gt",
                Operator::Gte => "$gte",
                Operator::Lt => "$lt",
                _ => "$lte",
            };
            json!({ key: v })
        }

        Operator::In | Operator::NotIn => {
            let values = value
                .items()
                .into_iter()
                .map(|raw| render::scalar_json(kind, field, raw))
                .collect::<Result<Vec<_>, _>>()?;
            let key = if op == Operator::In { "$in" } else { "$nin" };
            json!({ key: values })
        }

        Operator::Like => regex_body(render::like_to_regex(expect_one(field, op, value)?), false),
        Operator::ILike => regex_body(render::like_to_regex(expect_one(field, op, value)?), true),
        Operator::NotLike => json!({
            "$not": regex_body(render::like_to_regex(expect_one(field, op, value)?), false)
        }),
        Operator::NotILike => json!({
            "$not": regex_body(render::like_to_regex(expect_one(field, op, value)?), true)
        }),

        Operator::Regexp => regex_body(expect_one(field, op, value)?.to_string(), false),
        Operator::IRegexp => regex_body(expect_one(field, op, value)?.to_string(), true),
        Operator::NotRegexp => json!({
            "$not": regex_body(expect_one(field, op, value)?.to_string(), false)
        }),
        Operator::NotIRegexp => json!({
            "$not": regex_body(expect_one(field, op, value)?.to_string(), true)
        }),

        Operator::Between | Operator::NotBetween => {
            if kind.is_array() {
                return Err(CompileError::RangeOnArray {
                    field: field.to_string(),
                    operator: op,
                    backend: BACKEND,
                });
            }
            let (lo, hi) = expect_range(field, op, value, BACKEND)?;
            let range = json!({
                "$gte": render::scalar_json(kind, field, lo)?,
                "$lte": render::scalar_json(kind, field, hi)?,
            });
            if op == Operator::Between {
                range
            } else {
                json!({ "$not": range })
            }
        }

        // Array membership is exact scalar match against one element.
        Operator::Contains => {
            let raw = expect_one(field, op, value)?;
            json!({ "$eq": render::scalar_json(kind.element(), field, raw)? })
        }
        Operator::NotContains => {
            let raw = expect_one(field, op, value)?;
            json!({ "$ne": render::scalar_json(kind.element(), field, raw)? })
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
    };
    Ok(json!({ field: body }))
}

/// Sort document for the document driver: `{field: 1|-1}` per order entry,
/// with the identifying attribute appended ascending when absent.
pub fn sort_document(order: &OrderBy, id_attribute: &str) -> Value {
    let mut doc = Map::new();
    for key in &order.0 {
        let dir = if key.dir == SortDir::Asc { 1 } else { -1 };
        doc.insert(key.field.clone(), json!(dir));
    }
    if !doc.contains_key(id_attribute) {
        doc.insert(id_attribute.to_string(), json!(1));
    }
    Value::Object(doc)
}
