//! Tier 3: Persisted layout compatibility
//!
//! Stores written by other `@upstash/query` clients must stay readable, and
//! index entries written here must be found by them. These tests pin the
//! key layout, the document envelope and the fingerprint bytes.

use serde_json::json;
use sha2::{Digest, Sha256};
use strata_query::{Batch, JsonCodec, KeyValueStore, Value};

use crate::test_utils::*;

const USERS: &str = "@upstash/query:collection:users";

#[tokio::test]
async fn test_key_layout() {
    let (store, users) = users();
    let index = users.create_index("by_name", ["name"]).unwrap();
    users.set("u1", json!({ "name": "ada" })).await.unwrap();

    let fp = index.fingerprint([("name", "ada")]).unwrap();
    let mut expected = vec![
        format!("{}:u1", USERS),
        format!("{}:index:by_name:document_ids:u1", USERS),
        format!("{}:index:by_name:hashes:{}", USERS, fp),
    ];
    expected.sort();
    assert_eq!(store.keys(), expected);
}

#[tokio::test]
async fn test_envelope_is_pretty_json() {
    let (store, users) = users();
    users.set("u1", json!({ "b": 1, "a": "x" })).await.unwrap();

    let raw = store.get(&format!("{}:u1", USERS)).await.unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let ts = parsed["ts"].as_u64().unwrap();
    let expected = format!(
        "{{\n  \"data\": {{\n    \"a\": \"x\",\n    \"b\": 1\n  }},\n  \"id\": \"u1\",\n  \"ts\": {}\n}}",
        ts
    );
    assert_eq!(raw, expected);
}

#[tokio::test]
async fn test_fingerprint_bytes() {
    let (_, users) = users();
    let index = users
        .create_index("by_city_age", ["age", "address.city"])
        .unwrap();

    // Sorted paths, each followed by the pretty JSON of its value
    let expected = hex::encode(Sha256::digest(b"address.city\"Oslo\"age30"));
    let fp = index
        .fingerprint([("age", Value::from(30)), ("address.city", Value::from("Oslo"))])
        .unwrap();
    assert_eq!(fp, expected);

    let object = Value::from(json!({ "k": 1 }));
    let direct = strata_query::fingerprint(&JsonCodec::new(), [("obj", Some(&object))]).unwrap();
    assert_eq!(
        direct,
        hex::encode(Sha256::digest(b"obj{\n  \"k\": 1\n}"))
    );
}

#[tokio::test]
async fn test_reads_documents_written_by_other_clients() {
    let (store, users) = users();
    let raw = r#"{"id":"legacy","ts":1700000000000,"data":{"name":"old","n":1.5}}"#;
    store.set(&format!("{}:legacy", USERS), raw).await.unwrap();

    let doc = users.get("legacy").await.unwrap().unwrap();
    assert_eq!(doc.ts.as_millis(), 1_700_000_000_000);
    assert_eq!(doc.data.get("n"), Some(&Value::Float(1.5)));
    assert_eq!(users.list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_matches_index_entries_written_by_other_clients() {
    let (store, users) = users();
    let raw = r#"{"id":"legacy","ts":1,"data":{"name":"old"}}"#;
    store.set(&format!("{}:legacy", USERS), raw).await.unwrap();

    let fp = hex::encode(Sha256::digest(b"name\"old\""));
    let mut batch = Batch::new();
    batch
        .set_add(format!("{}:index:by_name:document_ids:legacy", USERS), fp.as_str())
        .set_add(format!("{}:index:by_name:hashes:{}", USERS, fp), "legacy");
    store.execute(batch).await.unwrap();

    let index = users.create_index("by_name", ["name"]).unwrap();
    let hits = index.match_documents([("name", "old")]).await.unwrap();
    assert_eq!(sorted_ids(&hits), vec!["legacy"]);

    // Deleting through this client cleans the foreign entries too
    users.delete("legacy").await.unwrap();
    assert!(store.is_empty());
}
