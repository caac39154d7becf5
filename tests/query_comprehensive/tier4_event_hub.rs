//! Tier 4: Write interception with custom handlers

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use strata_query::{Batch, Document, EventHandler, EventKind, KeyValueStore, Result};

use crate::test_utils::*;

/// Maintains a set of all document ids ever written, minus deleted ones
struct Registry {
    key: String,
}

#[async_trait]
impl EventHandler for Registry {
    async fn handle(&self, kind: EventKind, batch: &mut Batch, documents: &[Document]) -> Result<()> {
        for document in documents {
            match kind {
                EventKind::Created | EventKind::Updated => {
                    batch.set_add(self.key.as_str(), document.id.as_str());
                }
                EventKind::Deleted => {
                    batch.set_remove(self.key.as_str(), document.id.as_str());
                }
            }
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_custom_handler_rides_the_write_batch() {
    let (store, users) = users();
    let registry = Arc::new(Registry {
        key: "registry:users".to_string(),
    });
    let subs: Vec<_> = [EventKind::Created, EventKind::Updated, EventKind::Deleted]
        .into_iter()
        .map(|kind| users.hub().subscribe(kind, registry.clone()))
        .collect();

    users.set("a", json!({})).await.unwrap();
    users.set("b", json!({})).await.unwrap();
    users.update("a", json!({ "v": 2 })).await.unwrap();
    users.delete("b").await.unwrap();
    assert_eq!(store.set_members("registry:users").await.unwrap(), vec!["a"]);

    for sub in &subs {
        assert!(users.hub().unsubscribe(sub));
    }
    users.set("c", json!({})).await.unwrap();
    assert_eq!(store.set_members("registry:users").await.unwrap(), vec!["a"]);
}

#[tokio::test]
async fn test_handler_sees_index_ops_staged_before_it() {
    struct Inspector;

    #[async_trait]
    impl EventHandler for Inspector {
        async fn handle(&self, _: EventKind, batch: &mut Batch, _: &[Document]) -> Result<()> {
            // document write + forward sadd + inverted sadd
            assert_eq!(batch.len(), 3);
            Ok(())
        }
    }

    let (_, users) = users();
    users.create_index("by_name", ["name"]).unwrap();
    users
        .hub()
        .subscribe(EventKind::Created, Arc::new(Inspector));
    users.set("a", json!({ "name": "x" })).await.unwrap();
}
