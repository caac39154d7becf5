//! Error types for Strata Query
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Taxonomy
//!
//! - **Configuration**: rejected at construction, before the backend is touched
//! - **Backend**: failures of the key-value store, propagated unchanged
//! - **Write contract**: `AlreadyExists` / `NotFound` / `UniqueViolation`
//!   raised by the strict write operations and unique indexes
//!
//! A missing document is never an error on read or delete; those paths
//! return `None` or an empty result instead.

use std::io;
use thiserror::Error;

/// Result type alias for Strata Query operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Strata Query
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid construction-time configuration (empty names, bad namespace, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Field path could not be parsed
    #[error("Invalid field path '{path}': {reason}")]
    InvalidFieldPath {
        /// The offending path as written by the caller
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Document payload is not a mapping
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Backing store failure (network, timeout, protocol)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type for key '{key}': expected {expected}")]
    WrongType {
        /// Key that was accessed
        key: String,
        /// What the operation expected to find
        expected: &'static str,
    },

    /// A pipelined batch was only partially applied
    #[error("Batch failed: {failed} of {total} operations failed (first: {first})")]
    BatchFailed {
        /// Number of operations that failed
        failed: usize,
        /// Number of operations staged in the batch
        total: usize,
        /// Message of the first failure
        first: String,
    },

    /// Create-only write found an existing document
    #[error("Document '{id}' already exists in collection '{collection}'")]
    AlreadyExists {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Update found no document to replace
    #[error("Document '{id}' not found in collection '{collection}'")]
    NotFound {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Unique index already maps the fingerprint to another document
    #[error("Unique index '{index}' already holds document '{existing}' for fingerprint {fingerprint}")]
    UniqueViolation {
        /// Index name
        index: String,
        /// Conflicting fingerprint
        fingerprint: String,
        /// Document currently owning the fingerprint
        existing: String,
    },

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Build a configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Build a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    /// Build a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Error::SerializationError(msg.into())
    }

    /// True for failures that originate in the backing store
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Error::Backend(_) | Error::WrongType { .. } | Error::BatchFailed { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
