//! Backend compilers for the PolyGraph search core (AST in, native
//! predicates out).
//!
//! One compiler per storage backend, all sharing the same contract:
//! `compile(&SearchExpression, &AttributeMap) -> Result<Native, CompileError>`,
//! pure, side-effect-free and safe to invoke concurrently. The native output
//! is a structured object for the document-oriented backends
//! (`sea_orm::Condition`, a `$`-operator JSON object) and a query-language
//! fragment for the text backends (CQL, S3 Select, Cypher).
//!
//! Operator support differs per backend on purpose; each compiler carries an
//! exhaustive match over the operator set, so adding an operator without a
//! per-backend decision fails the build instead of failing a request.

pub mod attrs;
pub mod document;
pub mod graph;
pub mod object_store;
pub mod relational;
pub mod wide_column;

mod error;
mod render;
mod shape;

pub use attrs::{AttributeKind, AttributeMap};
pub use error::{Backend, CompileError};

#[cfg(test)]
mod tests;
