//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent misuse of the object-graph components.
/// These are independent of configuration and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Structural misuse, e.g. adding a child to a leaf.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("no prototype registered under key: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// A counter or other bounded resource has no values left.
    #[error("exhausted: {0}")]
    Exhausted(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
