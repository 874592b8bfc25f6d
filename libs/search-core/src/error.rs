use thiserror::Error;

/// Unified error type for the backend-neutral core.
///
/// An empty predicate is never an error; degraded boundary construction is
/// reported through [`crate::BoundaryPredicate::Unbounded`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid cursor: invalid base64 encoding")]
    CursorInvalidBase64,

    #[error("invalid cursor: payload is not valid JSON")]
    CursorInvalidJson,

    #[error("invalid cursor: payload is not a JSON object")]
    CursorNotObject,

    #[error("cursor source does not serialize to a JSON object")]
    CursorSourceNotObject,

    #[error("pagination: 'first'/'after' cannot be combined with 'last'/'before'")]
    ForwardBackwardConflict,

    #[error("pagination: cursor-style and offset-style arguments cannot be mixed")]
    MixedPaginationStyles,

    #[error("pagination: one of 'first', 'last' or 'limit'/'offset' is required")]
    PaginationUnspecified,

    #[error("unknown search operator: {0}")]
    UnknownOperator(String),
}
