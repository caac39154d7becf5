//! Core types and traits for Strata Query
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: Tagged field value (null, bool, int, float, string, array, object)
//! - FieldPath: Dotted path into document data
//! - Document: Stored envelope `{ id, ts, data }`
//! - Keyspace: Persisted key layout for documents and index mappings
//! - Codec: Pluggable value encoding (JSON by default)
//! - Batch: Pipelined, non-atomic write batch
//! - KeyValueStore: Backing store contract
//! - IdGenerator: Opaque identifier generation
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod codec;
pub mod document;
pub mod error;
pub mod id;
pub mod key;
pub mod path;
pub mod timestamp;
pub mod traits;
pub mod value;

pub use batch::{Batch, BatchOp};
pub use codec::{Codec, JsonCodec};
pub use document::Document;
pub use error::{Error, Result};
pub use id::{new_id, IdGenerator, IdKind, UuidIdGenerator};
pub use key::{
    escape_glob, validate_name, validate_segment_name, Keyspace, NameError, DEFAULT_NAMESPACE,
};
pub use path::FieldPath;
pub use timestamp::Timestamp;
pub use traits::{KeyValueStore, ScanPage};
pub use value::Value;
