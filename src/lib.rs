//! Strata Query - document collections with exact-match secondary indexes
//!
//! Strata Query stores JSON-like documents in a key-value backend with Redis
//! semantics and maintains secondary indexes from the write path, so that
//! equality lookups on one or more fields cost two backend round trips.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use strata_query::{MemoryStore, Query};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> strata_query::Result<()> {
//! let query = Query::new(Arc::new(MemoryStore::new()));
//! let users = query.collection("users")?;
//! let by_city = users.create_index("by_city", ["address.city"])?;
//!
//! users.set("u1", json!({ "name": "ada", "address": { "city": "Oslo" } })).await?;
//! let hits = by_city.match_documents([("address.city", "Oslo")]).await?;
//! assert_eq!(hits.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: values, documents, key layout, codec, batch and the
//!   [`KeyValueStore`] contract
//! - `strata-storage`: the in-memory backend and failure injection
//! - `strata-primitives`: collections, the event hub, indexes and config
//!
//! Any backend implementing [`KeyValueStore`] can be plugged in; the key
//! layout is compatible with existing `@upstash/query` stores.

pub use strata_core::{
    new_id, Batch, BatchOp, Codec, Document, Error, FieldPath, IdGenerator, IdKind, JsonCodec,
    KeyValueStore, Keyspace, Result, ScanPage, Timestamp, UuidIdGenerator, Value,
    DEFAULT_NAMESPACE,
};
pub use strata_primitives::{
    fingerprint, Collection, CollectionConfig, EventHandler, EventHub, EventKind, IndexOptions,
    Query, QueryConfig, RepairMode, SecondaryIndex, Subscription, WritePolicy, CONFIG_FILE_NAME,
};
pub use strata_storage::{testing, MemoryStore};
