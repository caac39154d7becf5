//! Tier 1: Document store contract

use serde_json::json;
use strata_query::{Error, KeyValueStore, QueryConfig, Value, WritePolicy};

use crate::test_utils::*;

#[tokio::test]
async fn test_round_trip_preserves_data() {
    let (_, users) = users();
    let data = json!({
        "name": "ada",
        "age": 36,
        "score": 9.5,
        "active": true,
        "tags": ["a", "b"],
        "address": { "city": "Oslo", "zip": null }
    });
    users.set("u1", data.clone()).await.unwrap();

    let doc = users.get("u1").await.unwrap().unwrap();
    assert_eq!(doc.id, "u1");
    assert_eq!(doc.data, Value::from(data));
}

#[tokio::test]
async fn test_unknown_id_is_none_and_delete_is_noop() {
    let (store, users) = users();
    assert!(users.get("ghost").await.unwrap().is_none());
    users.delete("ghost").await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_list_zero_ten_zero() {
    let (_, users) = users();
    assert!(users.list(None).await.unwrap().is_empty());

    let mut expected = Vec::new();
    for i in 0..10 {
        let id = format!("u{:02}", i);
        users.set(&id, json!({ "i": i })).await.unwrap();
        expected.push(id);
    }
    assert_eq!(sorted_ids(&users.list(None).await.unwrap()), expected);

    for id in &expected {
        users.delete(id).await.unwrap();
    }
    assert!(users.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_ids_never_returns_placeholders() {
    let (_, users) = users();
    users.set("a", json!({})).await.unwrap();
    let ids = vec!["missing".to_string(), "a".to_string()];
    let docs = users.list(Some(ids.as_slice())).await.unwrap();
    assert_eq!(sorted_ids(&docs), vec!["a"]);
}

#[tokio::test]
async fn test_collections_are_isolated() {
    let (_, query) = setup();
    let users = query.collection("users").unwrap();
    let posts = query.collection("posts").unwrap();

    users.set("x", json!({ "kind": "user" })).await.unwrap();
    posts.set("x", json!({ "kind": "post" })).await.unwrap();

    let user = users.get("x").await.unwrap().unwrap();
    let post = posts.get("x").await.unwrap().unwrap();
    assert_eq!(user.data.get("kind"), Some(&Value::from("user")));
    assert_eq!(post.data.get("kind"), Some(&Value::from("post")));

    users.delete("x").await.unwrap();
    assert!(posts.get("x").await.unwrap().is_some());
}

#[tokio::test]
async fn test_strict_policy_and_named_writes() {
    let (store, _) = setup();
    let config = QueryConfig {
        write_policy: WritePolicy::Strict,
        ..QueryConfig::default()
    };
    let query = strata_query::Query::with_config(store.clone(), config).unwrap();
    let users = query.collection("users").unwrap();

    users.set("u1", json!({ "v": 1 })).await.unwrap();
    assert!(matches!(
        users.set("u1", json!({ "v": 2 })).await,
        Err(Error::AlreadyExists { .. })
    ));
    assert!(matches!(
        users.update("u2", json!({ "v": 1 })).await,
        Err(Error::NotFound { .. })
    ));

    users.update("u1", json!({ "v": 3 })).await.unwrap();
    let doc = users.get("u1").await.unwrap().unwrap();
    assert_eq!(doc.data.get("v"), Some(&Value::Int(3)));

    let generated = users.create(json!({ "v": 4 })).await.unwrap();
    assert!(generated.starts_with("doc_"));
    assert!(store.get(&document_key("users", &generated)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_non_object_documents_rejected() {
    let (store, users) = users();
    for bad in [json!(null), json!(1), json!("s"), json!([1])] {
        assert!(matches!(
            users.set("u1", bad).await,
            Err(Error::InvalidDocument(_))
        ));
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_timestamp_advances_on_overwrite() {
    let (_, users) = users();
    users.set("u1", json!({ "v": 1 })).await.unwrap();
    let first = users.get("u1").await.unwrap().unwrap().ts;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    users.set("u1", json!({ "v": 2 })).await.unwrap();
    let second = users.get("u1").await.unwrap().unwrap().ts;
    assert!(second > first);
}
