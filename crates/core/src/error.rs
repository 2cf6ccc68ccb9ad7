//! Error types for kvlens
//!
//! One error enum covers the whole workspace. We use `thiserror` for the
//! `Display` and `Error` trait implementations.
//!
//! ## Propagation policy
//!
//! Every error is surfaced synchronously from the call that produced it.
//! Views never log, swallow, or substitute defaults, with two documented
//! exceptions: out-of-range rank lookup on a scored set returns `Ok(None)`,
//! and `MapView::try_get` folds its not-found path into `Ok(None)`.

use thiserror::Error;

/// Result type alias for kvlens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kvlens views and store backends
#[derive(Debug, Error)]
pub enum Error {
    /// A requested map field or positional index does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation is structurally meaningless for the target structure
    ///
    /// Always fatal to the call; never retried. The scored set rejects
    /// indexed set and positional insert this way.
    #[error("unsupported operation: {op} on {target}")]
    Unsupported {
        /// The rejected operation
        op: &'static str,
        /// The structure that cannot support it
        target: &'static str,
    },

    /// A serializer could not encode a value
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A serializer rejected a stored string
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The composite key holds a different structure than the command expects
    #[error("wrong type: key '{key}' holds a {actual}")]
    WrongType {
        /// The store key name
        key: String,
        /// The structure actually stored there
        actual: &'static str,
    },

    /// Store or transport failure, passed through unchanged
    #[error("store error: {0}")]
    Store(String),
}
