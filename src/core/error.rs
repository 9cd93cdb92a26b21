//! Error types raised while building a sequence.

use thiserror::Error;

/// Errors raised synchronously by construction and the append family.
///
/// Errors that handlers pass to their continuation are not represented here;
/// they travel along the chain as the sequence's `E` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A required argument was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// A supplied value failed a type check.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SequenceError {
    pub const DEFAULT_MISSING_MESSAGE: &'static str = "one or more arguments are missing";

    /// Creates a `MissingArgument` error.
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingArgument(what.into())
    }

    /// Creates an `InvalidArgument` error.
    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidArgument(what.into())
    }

    pub fn is_missing_argument(&self) -> bool {
        matches!(self, Self::MissingArgument(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl Default for SequenceError {
    fn default() -> Self {
        Self::missing(Self::DEFAULT_MISSING_MESSAGE)
    }
}

/// Result type for sequence construction and append operations.
pub type SequenceResult<T> = Result<T, SequenceError>;
