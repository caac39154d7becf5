//! Testing utilities for backend failure handling
//!
//! This module provides tools for exercising the query layer against a
//! misbehaving backend:
//!
//! - **FaultyStore**: wraps any backend and injects failures, either a
//!   partially applied batch (the non-atomic pipeline case) or a hard
//!   failure of every call
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_storage::{MemoryStore, testing::FaultyStore};
//!
//! let store = Arc::new(FaultyStore::new(MemoryStore::new()));
//! // The next batch applies its first op only, then fails
//! store.fail_next_batch_after(1);
//! ```

mod faulty;

pub use faulty::{FaultyStore, INJECTED_FAILURE};
