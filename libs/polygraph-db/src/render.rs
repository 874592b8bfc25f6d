//! Literal rendering and value coercion.
//!
//! Raw filter values are strings until they meet an attribute's declared
//! kind here. Every conversion validates the raw form; a parse failure is a
//! [`CompileError::ValueMismatch`].

use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::attrs::AttributeKind;
use crate::error::CompileError;

fn mismatch(field: &str, kind: &AttributeKind, raw: &str) -> CompileError {
    CompileError::ValueMismatch {
        field: field.to_string(),
        expected: kind.clone(),
        value: raw.to_string(),
    }
}

/// Typed JSON value for the document backend.
pub(crate) fn scalar_json(
    kind: &AttributeKind,
    field: &str,
    raw: &str,
) -> Result<Value, CompileError> {
    Ok(match kind {
        AttributeKind::String => Value::String(raw.to_string()),
        AttributeKind::Int => {
            let n: i64 = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            Value::Number(n.into())
        }
        AttributeKind::Float => {
            let f: f64 = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            Value::Number(Number::from_f64(f).ok_or_else(|| mismatch(field, kind, raw))?)
        }
        AttributeKind::Boolean => {
            let b: bool = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            Value::Bool(b)
        }
        AttributeKind::DateTime => {
            DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| mismatch(field, kind, raw))?;
            Value::String(raw.trim().to_string())
        }
        AttributeKind::Uuid => {
            Uuid::parse_str(raw.trim()).map_err(|_| mismatch(field, kind, raw))?;
            Value::String(raw.trim().to_string())
        }
        AttributeKind::Decimal => {
            let d: Decimal = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            Value::String(d.to_string())
        }
        AttributeKind::Array(inner) => scalar_json(inner, field, raw)?,
    })
}

/// Typed `sea_orm::Value` for the relational backend.
pub(crate) fn scalar_sea(
    kind: &AttributeKind,
    field: &str,
    raw: &str,
) -> Result<sea_orm::Value, CompileError> {
    use sea_orm::Value as V;
    Ok(match kind {
        AttributeKind::String => V::String(Some(Box::new(raw.to_string()))),
        AttributeKind::Int => {
            let n: i64 = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            V::BigInt(Some(n))
        }
        AttributeKind::Float => {
            let f: f64 = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            V::Double(Some(f))
        }
        AttributeKind::Boolean => {
            let b: bool = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            V::Bool(Some(b))
        }
        AttributeKind::DateTime => {
            let dt = DateTime::parse_from_rfc3339(raw.trim())
                .map_err(|_| mismatch(field, kind, raw))?
                .with_timezone(&chrono::Utc);
            V::ChronoDateTimeUtc(Some(Box::new(dt)))
        }
        AttributeKind::Uuid => {
            let u = Uuid::parse_str(raw.trim()).map_err(|_| mismatch(field, kind, raw))?;
            V::Uuid(Some(Box::new(u)))
        }
        AttributeKind::Decimal => {
            let d: Decimal = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            V::Decimal(Some(Box::new(d)))
        }
        AttributeKind::Array(inner) => scalar_sea(inner, field, raw)?,
    })
}

/// Quoted/escaped literal for the text-query backends (CQL, S3 Select,
/// Cypher). Strings, datetimes and uuids are single-quoted with embedded
/// quotes doubled; numbers and booleans render bare.
pub(crate) fn scalar_literal(
    kind: &AttributeKind,
    field: &str,
    raw: &str,
) -> Result<String, CompileError> {
    Ok(match kind {
        AttributeKind::String => quote(raw),
        AttributeKind::Int => {
            let n: i64 = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            n.to_string()
        }
        AttributeKind::Float => {
            let f: f64 = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            if !f.is_finite() {
                return Err(mismatch(field, kind, raw));
            }
            ryu::Buffer::new().format(f).to_string()
        }
        AttributeKind::Boolean => {
            let b: bool = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            b.to_string()
        }
        AttributeKind::DateTime => {
            DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| mismatch(field, kind, raw))?;
            quote(raw.trim())
        }
        AttributeKind::Uuid => {
            Uuid::parse_str(raw.trim()).map_err(|_| mismatch(field, kind, raw))?;
            quote(raw.trim())
        }
        AttributeKind::Decimal => {
            let d: Decimal = raw.trim().parse().map_err(|_| mismatch(field, kind, raw))?;
            d.to_string()
        }
        AttributeKind::Array(inner) => scalar_literal(inner, field, raw)?,
    })
}

/// One element of a JSON-serialized array, as it appears inside the stored
/// text: strings JSON-quoted, everything else bare. Used to synthesize the
/// containment patterns for backends without a native array operator.
pub(crate) fn element_literal(
    kind: &AttributeKind,
    field: &str,
    raw: &str,
) -> Result<String, CompileError> {
    let element = kind.element();
    Ok(match element {
        AttributeKind::String | AttributeKind::DateTime | AttributeKind::Uuid => {
            serde_json::to_string(raw).map_err(|_| mismatch(field, element, raw))?
        }
        _ => match scalar_json(element, field, raw)? {
            Value::String(s) => s,
            other => other.to_string(),
        },
    })
}

pub(crate) fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/* ---------- LIKE helpers ---------- */

pub(crate) fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

/// SQL `LIKE` wildcards to an anchored regex: `%` → `.*`, `_` → `.`,
/// everything else taken literally.
pub(crate) fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    let mut literal = String::new();
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(".*");
            }
            '_' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push('.');
            }
            c => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}
