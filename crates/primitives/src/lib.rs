//! Document collections and secondary indexes for Strata Query
//!
//! This crate builds the query layer on top of a
//! [`KeyValueStore`](strata_core::KeyValueStore):
//! - Query: client handing out collections over one backend
//! - Collection: named document store with write interception
//! - EventHub: per-collection registry of write handlers
//! - SecondaryIndex: exact-match index maintained from the write path
//! - fingerprint: deterministic digest of indexed field values
//! - QueryConfig: `strata-query.toml` configuration
//!
//! All state lives in the backend; these types are facades over it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod event_hub;
pub mod fingerprint;
pub mod index;
pub mod query;

pub use collection::{Collection, CollectionConfig};
pub use config::{QueryConfig, RepairMode, WritePolicy, CONFIG_FILE_NAME, DEFAULT_SCAN_COUNT};
pub use event_hub::{EventHandler, EventHub, EventKind, Subscription};
pub use fingerprint::{fingerprint, FINGERPRINT_LEN};
pub use index::{IndexOptions, SecondaryIndex};
pub use query::Query;
