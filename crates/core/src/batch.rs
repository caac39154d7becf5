//! Pipelined write batches
//!
//! A [`Batch`] collects write operations that are sent to the backend as a
//! single pipelined request. One `set`/`delete` on a collection produces one
//! batch: the document write plus every subscribed index's mapping updates.
//!
//! ## Guarantees
//!
//! - Operations execute in the order they were staged
//! - Execution is NOT atomic: if the backend fails part way, earlier
//!   operations stay applied and nothing is rolled back
//!
//! Readers are expected to tolerate the drift this can leave behind.

/// One staged write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Overwrite `key` with a string value
    Set {
        /// Target key
        key: String,
        /// Encoded value
        value: String,
    },
    /// Remove `key` regardless of its type
    Delete {
        /// Target key
        key: String,
    },
    /// Add `member` to the set at `key`
    SetAdd {
        /// Set key
        key: String,
        /// Member to add
        member: String,
    },
    /// Remove `member` from the set at `key`
    SetRemove {
        /// Set key
        key: String,
        /// Member to remove
        member: String,
    },
}

impl BatchOp {
    /// Key touched by this operation
    pub fn key(&self) -> &str {
        match self {
            BatchOp::Set { key, .. }
            | BatchOp::Delete { key }
            | BatchOp::SetAdd { key, .. }
            | BatchOp::SetRemove { key, .. } => key,
        }
    }

    /// Operation name, for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            BatchOp::Set { .. } => "set",
            BatchOp::Delete { .. } => "del",
            BatchOp::SetAdd { .. } => "sadd",
            BatchOp::SetRemove { .. } => "srem",
        }
    }
}

/// Ordered list of staged operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    /// Start an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a string overwrite
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(BatchOp::Set {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Stage a key removal
    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.push(BatchOp::Delete { key: key.into() })
    }

    /// Stage a set insertion
    pub fn set_add(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.push(BatchOp::SetAdd {
            key: key.into(),
            member: member.into(),
        })
    }

    /// Stage a set removal
    pub fn set_remove(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.push(BatchOp::SetRemove {
            key: key.into(),
            member: member.into(),
        })
    }

    /// Stage an arbitrary operation
    pub fn push(&mut self, op: BatchOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Staged operations in submission order
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch, yielding its operations
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}
