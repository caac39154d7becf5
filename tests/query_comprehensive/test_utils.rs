//! Shared helpers for the comprehensive suite

#![allow(dead_code)]

use std::sync::{Arc, Once};

use strata_query::{Collection, Document, MemoryStore, Query, QueryConfig, RepairMode};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (shown on failure)
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh in-memory backend plus a client over it with inline repair
pub fn setup() -> (Arc<MemoryStore>, Query) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let config = QueryConfig {
        repair: RepairMode::Inline,
        ..QueryConfig::default()
    };
    let query = Query::with_config(store.clone(), config).unwrap();
    (store, query)
}

/// `users` collection on a fresh backend
pub fn users() -> (Arc<MemoryStore>, Collection) {
    let (store, query) = setup();
    let users = query.collection("users").unwrap();
    (store, users)
}

/// Document ids, sorted
pub fn sorted_ids(documents: &[Document]) -> Vec<String> {
    let mut ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
    ids.sort();
    ids
}

/// Key of a document in the default namespace
pub fn document_key(collection: &str, id: &str) -> String {
    format!("@upstash/query:collection:{}:{}", collection, id)
}
