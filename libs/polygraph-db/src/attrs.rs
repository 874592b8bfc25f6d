//! Attribute-type metadata.
//!
//! Compilers coerce raw filter values against the attribute types declared in
//! the model definition (`"Int"`, `"DateTime"`, `"[String]"`, …).

use std::collections::HashMap;
use std::fmt;

use crate::error::CompileError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    Uuid,
    Decimal,
    Array(Box<AttributeKind>),
}

impl AttributeKind {
    /// Parse the model-definition notation; `[T]` declares an array of `T`.
    pub fn parse(declared: &str) -> Option<Self> {
        let declared = declared.trim();
        if let Some(inner) = declared
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        {
            return AttributeKind::parse(inner).map(|k| AttributeKind::Array(Box::new(k)));
        }
        Some(match declared {
            "String" | "ID" | "ObjectId" => AttributeKind::String,
            "Int" => AttributeKind::Int,
            "Float" => AttributeKind::Float,
            "Boolean" => AttributeKind::Boolean,
            "DateTime" => AttributeKind::DateTime,
            "Uuid" => AttributeKind::Uuid,
            "Decimal" => AttributeKind::Decimal,
            _ => return None,
        })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, AttributeKind::Array(_))
    }

    /// The element kind of an array attribute; scalars are their own element.
    pub fn element(&self) -> &AttributeKind {
        match self {
            AttributeKind::Array(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::String => f.write_str("String"),
            AttributeKind::Int => f.write_str("Int"),
            AttributeKind::Float => f.write_str("Float"),
            AttributeKind::Boolean => f.write_str("Boolean"),
            AttributeKind::DateTime => f.write_str("DateTime"),
            AttributeKind::Uuid => f.write_str("Uuid"),
            AttributeKind::Decimal => f.write_str("Decimal"),
            AttributeKind::Array(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Field name → declared kind, one map per entity.
#[derive(Clone, Debug, Default)]
pub struct AttributeMap {
    map: HashMap<String, AttributeKind>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.map.insert(name.into(), kind);
        self
    }

    /// Build from `(name, declared)` pairs as they appear in a model
    /// definition.
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CompileError> {
        let mut map = HashMap::new();
        for (name, declared) in definitions {
            let kind =
                AttributeKind::parse(declared).ok_or_else(|| CompileError::InvalidAttributeType {
                    field: name.to_string(),
                    declared: declared.to_string(),
                })?;
            map.insert(name.to_string(), kind);
        }
        Ok(Self { map })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeKind> {
        self.map.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&AttributeKind, CompileError> {
        self.map
            .get(name)
            .ok_or_else(|| CompileError::UnknownAttribute {
                field: name.to_string(),
            })
    }
}
