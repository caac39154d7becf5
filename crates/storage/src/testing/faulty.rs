//! Failure-injecting backend wrapper

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use strata_core::{Batch, Error, KeyValueStore, Result, ScanPage};

/// Message carried by every injected error
pub const INJECTED_FAILURE: &str = "injected failure";

/// Backend wrapper that fails on demand
///
/// Faults are armed explicitly and are otherwise transparent: with nothing
/// armed every call is forwarded to the inner store unchanged.
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    fail_all: AtomicBool,
    /// Apply only this many ops of the next batch, then fail the rest
    partial_batch: Mutex<Option<usize>>,
}

impl<S: KeyValueStore> FaultyStore<S> {
    /// Wrap `inner` with no faults armed
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            fail_all: AtomicBool::new(false),
            partial_batch: Mutex::new(None),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every call fail (`true`) or pass through again (`false`)
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Apply only the first `applied` ops of the next batch
    ///
    /// The remaining ops are reported as failed and never reach the inner
    /// store, simulating a connection dropped mid-pipeline.
    pub fn fail_next_batch_after(&self, applied: usize) {
        *self.partial_batch.lock() = Some(applied);
    }

    fn check(&self) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(Error::backend(INJECTED_FAILURE));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for FaultyStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        self.check()?;
        self.inner.multi_get(keys).await
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        self.check()?;
        self.inner.scan(cursor, pattern, count).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        self.check()?;
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.check()?;
        self.inner.set_remove(key, member).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.check()?;
        self.inner.set_members(key).await
    }

    async fn execute(&self, batch: Batch) -> Result<()> {
        self.check()?;
        let armed = self.partial_batch.lock().take();
        let applied = match armed {
            None => return self.inner.execute(batch).await,
            Some(applied) => applied,
        };

        let total = batch.len();
        let mut ops = batch.into_ops();
        let dropped = ops.split_off(applied.min(total));
        let mut prefix = Batch::new();
        for op in ops {
            prefix.push(op);
        }
        self.inner.execute(prefix).await?;

        debug!(target: "strata::storage", total, dropped = dropped.len(), "Injected partial batch");
        if dropped.is_empty() {
            return Ok(());
        }
        Err(Error::BatchFailed {
            failed: dropped.len(),
            total,
            first: format!("{} {}: {}", dropped[0].name(), dropped[0].key(), INJECTED_FAILURE),
        })
    }
}
