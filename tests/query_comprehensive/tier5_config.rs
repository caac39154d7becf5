//! Tier 5: Configuration

use std::sync::Arc;

use serde_json::json;
use strata_query::{Error, MemoryStore, Query, QueryConfig, RepairMode, WritePolicy};

#[test]
fn test_default_toml_round_trips() {
    let config = QueryConfig::from_toml_str(QueryConfig::default_toml()).unwrap();
    assert_eq!(config, QueryConfig::default());
    assert_eq!(config.namespace, strata_query::DEFAULT_NAMESPACE);
}

#[test]
fn test_bad_values_rejected_before_backend_use() {
    let store = Arc::new(MemoryStore::new());
    for toml in ["scan_count = 0", "namespace = \"\"", "repair = \"later\""] {
        assert!(matches!(
            QueryConfig::from_toml_str(toml),
            Err(Error::InvalidConfig(_))
        ));
    }
    let query = Query::new(store.clone());
    assert!(query.collection("").is_err());
    assert_eq!(store.round_trips(), 0);
}

#[tokio::test]
async fn test_configured_client_end_to_end() {
    let store = Arc::new(MemoryStore::new());
    let config = QueryConfig::from_toml_str(
        r#"
namespace = "app"
scan_count = 2
write_policy = "strict"
repair = "inline"
codec_debug = true
"#,
    )
    .unwrap();
    assert_eq!(config.write_policy, WritePolicy::Strict);
    assert_eq!(config.repair, RepairMode::Inline);

    let query = Query::with_config(store.clone(), config).unwrap();
    let users = query.collection("users").unwrap();
    let index = users.create_index("by_name", ["name"]).unwrap();
    assert_eq!(index.repair_mode(), RepairMode::Inline);

    for i in 0..5 {
        users
            .set(&format!("u{}", i), json!({ "name": "x" }))
            .await
            .unwrap();
    }
    assert!(users.set("u0", json!({})).await.is_err());
    assert_eq!(users.list(None).await.unwrap().len(), 5);
    assert_eq!(index.match_documents([("name", "x")]).await.unwrap().len(), 5);
    assert!(store.keys().iter().all(|k| k.starts_with("app:collection:users:")));
}
