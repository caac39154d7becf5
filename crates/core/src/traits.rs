//! Backing store abstraction
//!
//! This module defines the [`KeyValueStore`] trait, the only contract the
//! document store and indexes have with persistence. The primitives mirror
//! a Redis-style server: string values, unordered string sets, cursor scans
//! and pipelined batches.
//!
//! Thread safety: implementations are shared as `Arc<dyn KeyValueStore>`
//! across every collection and index built on them, so all methods must be
//! safe to call concurrently.
//!
//! ## Contract
//!
//! - `get`/`multi_get` on a key holding a set: `get` fails with `WrongType`,
//!   `multi_get` yields `None` for that slot
//! - `set` and `delete` work on any key regardless of its type
//! - set commands on a key holding a string fail with `WrongType`
//! - removing the last member of a set removes the key
//! - `scan` returns cursor `0` once iteration is complete
//! - `execute` attempts every staged op in order and never rolls back

use async_trait::async_trait;

use crate::batch::Batch;
use crate::error::Result;

/// One page of a cursor scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` when the scan is complete
    pub cursor: u64,
    /// Keys matched in this page (may be empty even if `cursor != 0`)
    pub keys: Vec<String>,
}

impl ScanPage {
    /// True if this is the final page
    pub fn is_last(&self) -> bool {
        self.cursor == 0
    }
}

/// Key-value backend used by collections and indexes
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a string value
    ///
    /// Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Unconditionally overwrite `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Read many string values at once
    ///
    /// The result has the same length and order as `keys`; missing keys and
    /// keys holding sets are `None`.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Iterate keys matching a glob `pattern` (`*`, `?` and `\` escapes)
    ///
    /// Start with cursor `0` and call again with the returned cursor until it
    /// comes back as `0`. `count` is a page-size hint.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage>;

    /// Add `member` to the set at `key`; returns whether it was newly added
    async fn set_add(&self, key: &str, member: &str) -> Result<bool>;

    /// Remove `member` from the set at `key`; returns whether it was present
    async fn set_remove(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of the set at `key` (empty if the key does not exist)
    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Execute a pipelined batch
    ///
    /// Every operation is attempted, in order, even after a failure. If any
    /// fail, returns `BatchFailed` describing how many; the ones that
    /// succeeded stay applied.
    async fn execute(&self, batch: Batch) -> Result<()>;

    /// Collect every key matching `pattern` by looping over [`scan`](Self::scan)
    async fn scan_all(&self, pattern: &str, count: usize) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor = 0;
        loop {
            let page = self.scan(cursor, pattern, count).await?;
            keys.extend(page.keys);
            if page.cursor == 0 {
                break;
            }
            cursor = page.cursor;
        }
        Ok(keys)
    }
}
