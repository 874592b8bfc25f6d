//! Backend-neutral search and pagination primitives for the PolyGraph server.
//!
//! This crate owns everything that does not depend on a concrete storage
//! backend: the recursive filter AST ([`SearchExpression`]), the order
//! specification ([`OrderBy`]), the opaque record cursor codec, the keyset
//! boundary-predicate builder, the pagination normalizer and the GraphQL
//! connection shape. Compiling a filter into a backend's native query
//! representation lives in `polygraph-db`.
//!
//! The whole crate is pure and stateless: no I/O, no shared mutable state,
//! safe to call from any number of concurrent request contexts.

pub mod ast;
pub mod boundary;
pub mod connection;
pub mod cursor;
pub mod order;
pub mod pagination;

mod error;

pub use ast::{Operator, SearchExpression, SearchValue, ValueType};
pub use boundary::{build_boundary, Boundary, BoundaryPredicate, DegradedReason};
pub use connection::{Connection, Edge, PageInfo};
pub use cursor::{decode_cursor, encode_cursor, encode_node, raw_value, Projection};
pub use error::Error;
pub use order::{sort_records, OrderBy, OrderKey, SortDir};
pub use pagination::{
    normalize, page_backward, page_forward, PaginationLimits, PaginationRequest, ScanPlan,
};
