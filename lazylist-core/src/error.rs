// lazylist-core - Error types for lazy list operations
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for lazy list operations.
//!
//! Exhaustion of a producer is never an error. Forcing an infinite list is
//! not guarded either, unless a materialization limit has been configured
//! (see [`crate::config`]).

use thiserror::Error;

/// Result type for lazy list operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing, normalizing or indexing values.
///
/// `Clone` because a tee-split replays the same produced item, failures
/// included, to both of its halves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Materialization would exceed the configured limit
    #[error("materialization exceeded the limit of {limit} elements")]
    MaterializeLimit { limit: usize },
    /// A float that has no rational form (NaN or infinity)
    #[error("cannot represent non-finite number {0} as a rational")]
    NonFinite(f64),
    /// An external value with no canonical form
    #[error("cannot canonicalize value: {0}")]
    Unrepresentable(String),
    /// A decimal string that failed to parse as an exact rational
    #[error("invalid decimal literal: {0:?}")]
    InvalidDecimal(String),
    /// Overwrite past the end of an exhausted list
    #[error("index {index} out of bounds for list of length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    /// Failure raised by a user-supplied producer or predicate
    #[error("producer failed: {0}")]
    Producer(String),
    /// Conversion from a flattened value into a host type failed
    #[error("expected {expected}, got {got}")]
    Conversion {
        expected: &'static str,
        got: &'static str,
    },
}

impl Error {
    /// Create a producer error from any displayable message.
    pub fn producer(message: impl Into<String>) -> Self {
        Error::Producer(message.into())
    }

    /// Create a conversion error.
    pub fn conversion(expected: &'static str, got: &'static str) -> Self {
        Error::Conversion { expected, got }
    }
}
