//! MemoryStore: in-process backend with Redis semantics
//!
//! This module implements the KeyValueStore trait using:
//! - `BTreeMap<String, Entry>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` counting round trips, so tests can assert how many
//!   backend calls an operation made
//!
//! # Design Notes
//!
//! - **Typed entries**: a key holds either a string or a set, and the
//!   set/string commands enforce that the same way Redis does
//! - **Positional cursors**: a scan cursor is the offset into key order at
//!   which the next page starts; keys inserted or removed mid-scan may be
//!   seen twice or skipped, which the scan contract permits
//! - **Batch execution**: each staged op is applied under its own lock
//!   acquisition, so a concurrent reader can observe a half-applied batch,
//!   exactly like a pipelined request against a server

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use strata_core::{Batch, BatchOp, Error, KeyValueStore, Result, ScanPage};

use crate::glob::glob_match;

/// Value held under a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Plain string value
    String(String),
    /// Unordered set of strings (kept sorted for deterministic output)
    Set(BTreeSet<String>),
}

impl Entry {
    fn type_name(&self) -> &'static str {
        match self {
            Entry::String(_) => "string",
            Entry::Set(_) => "set",
        }
    }
}

/// In-memory key-value backend
///
/// Suitable for tests, embedded use and as the reference behavior other
/// backends are compared against.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Entry>>,
    round_trips: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of backend calls served so far (a batch counts once)
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if no keys are stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of the entry at `key`, bypassing round-trip accounting
    pub fn entry(&self, key: &str) -> Option<Entry> {
        self.data.read().get(key).cloned()
    }

    /// Every key currently stored, in order
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    fn tick(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
    }

    fn wrong_type(key: &str, expected: &'static str) -> Error {
        Error::WrongType {
            key: key.to_string(),
            expected,
        }
    }

    fn apply_set_add(data: &mut BTreeMap<String, Entry>, key: &str, member: &str) -> Result<bool> {
        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(set) => Ok(set.insert(member.to_string())),
            Entry::String(_) => Err(Self::wrong_type(key, "set")),
        }
    }

    fn apply_set_remove(
        data: &mut BTreeMap<String, Entry>,
        key: &str,
        member: &str,
    ) -> Result<bool> {
        let (removed, now_empty) = match data.get_mut(key) {
            None => return Ok(false),
            Some(Entry::String(_)) => return Err(Self::wrong_type(key, "set")),
            Some(Entry::Set(set)) => (set.remove(member), set.is_empty()),
        };
        if now_empty {
            data.remove(key);
        }
        Ok(removed)
    }

    fn apply(&self, op: &BatchOp) -> Result<()> {
        let mut data = self.data.write();
        match op {
            BatchOp::Set { key, value } => {
                data.insert(key.clone(), Entry::String(value.clone()));
            }
            BatchOp::Delete { key } => {
                data.remove(key);
            }
            BatchOp::SetAdd { key, member } => {
                Self::apply_set_add(&mut data, key, member)?;
            }
            BatchOp::SetRemove { key, member } => {
                Self::apply_set_remove(&mut data, key, member)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.tick();
        match self.data.read().get(key) {
            None => Ok(None),
            Some(Entry::String(s)) => Ok(Some(s.clone())),
            Some(other) => {
                debug!(target: "strata::storage", key, found = other.type_name(), "GET on non-string key");
                Err(Self::wrong_type(key, "string"))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tick();
        self.data
            .write()
            .insert(key.to_string(), Entry::String(value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.tick();
        Ok(self.data.write().remove(key).is_some())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        self.tick();
        let data = self.data.read();
        Ok(keys
            .iter()
            .map(|k| match data.get(k) {
                Some(Entry::String(s)) => Some(s.clone()),
                _ => None,
            })
            .collect())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        self.tick();
        let data = self.data.read();
        let start = cursor as usize;
        let page_size = count.max(1);

        let keys: Vec<String> = data
            .keys()
            .skip(start)
            .take(page_size)
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect();

        let end = start.saturating_add(page_size);
        let next = if end >= data.len() { 0 } else { end as u64 };
        Ok(ScanPage { cursor: next, keys })
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        self.tick();
        Self::apply_set_add(&mut self.data.write(), key, member)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.tick();
        Self::apply_set_remove(&mut self.data.write(), key, member)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.tick();
        match self.data.read().get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(Entry::String(_)) => Err(Self::wrong_type(key, "set")),
        }
    }

    async fn execute(&self, batch: Batch) -> Result<()> {
        self.tick();
        let total = batch.len();
        let mut failed = 0usize;
        let mut first: Option<String> = None;

        for op in batch.ops() {
            if let Err(e) = self.apply(op) {
                failed += 1;
                first.get_or_insert_with(|| format!("{} {}: {}", op.name(), op.key(), e));
            }
        }

        debug!(target: "strata::storage", total, failed, "Executed batch");
        match first {
            None => Ok(()),
            Some(first) => Err(Error::BatchFailed {
                failed,
                total,
                first,
            }),
        }
    }
}
