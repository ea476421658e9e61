//! Error types shared by the page-split and quadtree components.

use thiserror::Error;

/// Errors that abort a split, choose or search call.
///
/// Quality problems (a column strategy that refuses to use all four
/// quadrants, for instance) are not errors: they are recovered locally and
/// reported through a [`DiagnosticSink`](crate::diagnostics::DiagnosticSink).
/// Everything here means the call refused to produce a result because the
/// result could be silently wrong.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Unrecognized strategy: {0}")]
    UnrecognizedStrategy(u16),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;
