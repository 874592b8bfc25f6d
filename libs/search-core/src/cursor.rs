//! Opaque record cursor codec.
//!
//! A cursor is the base64 encoding of the JSON projection of a record onto
//! the order fields, in order. It is self-describing and stateless: nothing
//! is kept server-side, and a cursor stays valid for as long as the entity
//! still carries the projected fields. The exact encoding (standard padded
//! base64 of a JSON object keyed by the order fields) is a wire contract
//! with existing clients.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::Error;

/// A record's order-field projection, as decoded from a cursor.
pub type Projection = Map<String, Value>;

/// Project `record` onto `fields` (in order) and encode the result.
///
/// Fields absent from the record are omitted; the boundary builder treats
/// the omission as a degraded input.
pub fn encode_cursor<'a>(record: &Projection, fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut projection = Map::new();
    for field in fields {
        if let Some(value) = record.get(field) {
            projection.insert(field.to_string(), value.clone());
        }
    }
    STANDARD.encode(Value::Object(projection).to_string())
}

/// Serialize any record type to JSON and encode its cursor.
pub fn encode_node<'a, T: Serialize>(
    node: &T,
    fields: impl IntoIterator<Item = &'a str>,
) -> Result<String, Error> {
    let value = serde_json::to_value(node).map_err(|_| Error::CursorSourceNotObject)?;
    match value {
        Value::Object(record) => Ok(encode_cursor(&record, fields)),
        _ => Err(Error::CursorSourceNotObject),
    }
}

/// Inverse of [`encode_cursor`].
pub fn decode_cursor(raw: &str) -> Result<Projection, Error> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|_| Error::CursorInvalidBase64)?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|_| Error::CursorInvalidJson)?;
    match value {
        Value::Object(projection) => Ok(projection),
        _ => Err(Error::CursorNotObject),
    }
}

/// Raw string form of a projected value, as fed back into a
/// [`crate::SearchExpression`] leaf. Strings pass through unquoted; other
/// scalars use their JSON rendering.
pub fn raw_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
