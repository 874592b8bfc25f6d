use std::fmt;

use search_core::Operator;
use thiserror::Error;

use crate::attrs::AttributeKind;

/// The five storage backends a filter can be compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Relational,
    Document,
    WideColumn,
    ObjectStore,
    Graph,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Relational => "relational",
            Backend::Document => "document",
            Backend::WideColumn => "wide-column",
            Backend::ObjectStore => "object-store",
            Backend::Graph => "graph",
        })
    }
}

/// Compilation failures. All are raised synchronously at compile time and
/// never retried; an empty predicate is not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("operator '{operator}' is not supported by the {backend} backend")]
    UnsupportedOperator { operator: Operator, backend: Backend },

    #[error("field '{field}': '{operator}' expects exactly two values on the {backend} backend")]
    RangeArity {
        field: String,
        operator: Operator,
        backend: Backend,
    },

    #[error(
        "field '{field}': '{operator}' cannot be applied to an array attribute on the {backend} backend"
    )]
    RangeOnArray {
        field: String,
        operator: Operator,
        backend: Backend,
    },

    #[error("field '{field}': operator '{operator}' expects a single value")]
    SingleValue { field: String, operator: Operator },

    #[error("unknown attribute: {field}")]
    UnknownAttribute { field: String },

    #[error("field '{field}': declared type '{declared}' is not recognized")]
    InvalidAttributeType { field: String, declared: String },

    #[error("field '{field}': expected a {expected} value, got '{value}'")]
    ValueMismatch {
        field: String,
        expected: AttributeKind,
        value: String,
    },

    #[error("operator '{operator}' requires a field name")]
    MissingField { operator: Operator },

    #[error("'not' takes exactly one operand")]
    NotArity,
}
