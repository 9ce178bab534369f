//! Canonical error type for the crate.
//!
//! The containers do not retry, log, or swallow: every failure surfaces to
//! the caller as one of these variants. Keep the surface minimal and
//! stable; callers match on it.

use thiserror::Error;

/// Canonical error for the container crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StructError {
    /// `get`/`delete` on a key that is not present.
    #[error("no such element: {0}")]
    KeyNotFound(String),

    /// A hash selector string outside the supported set.
    #[error("{0} is not supported")]
    UnsupportedHash(String),

    /// A hash argument that is neither a known name nor a usable digest
    /// function.
    #[error("incorrect hash argument")]
    InvalidHashArg,
}

/// Convenience alias for results that use [`StructError`].
pub type Result<T> = core::result::Result<T, StructError>;
