//! Storage backends for Strata Query
//!
//! This crate implements the [`KeyValueStore`](strata_core::KeyValueStore)
//! contract:
//! - MemoryStore: BTreeMap-based backend with RwLock and Redis semantics
//!   (typed string/set entries, cursor scans, non-atomic pipelines)
//! - testing::FaultyStore: failure injection for drift and error-path tests
//!
//! Network backends implement the same trait outside this crate; the query
//! layer only ever sees `Arc<dyn KeyValueStore>`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod glob;
pub mod memory;
pub mod testing;

pub use glob::glob_match;
pub use memory::{Entry, MemoryStore};
