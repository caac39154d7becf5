//! Tier 2: Secondary index lookups and maintenance

use serde_json::json;
use strata_query::{Error, IndexOptions, KeyValueStore, RepairMode, Value};

use crate::test_utils::*;

#[tokio::test]
async fn test_one_one_two_scenario() {
    let (_, users) = users();
    let index = users.create_index("by_name", ["name"]).unwrap();

    users.set("1", json!({ "name": "x" })).await.unwrap();
    users.set("2", json!({ "name": "x" })).await.unwrap();
    users.set("3", json!({ "name": "y" })).await.unwrap();

    assert_eq!(
        sorted_ids(&index.match_documents([("name", "x")]).await.unwrap()),
        vec!["1", "2"]
    );
    assert_eq!(
        sorted_ids(&index.match_documents([("name", "y")]).await.unwrap()),
        vec!["3"]
    );

    users.delete("2").await.unwrap();
    assert_eq!(
        sorted_ids(&index.match_documents([("name", "x")]).await.unwrap()),
        vec!["1"]
    );
}

#[tokio::test]
async fn test_multi_field_lookup_is_order_independent() {
    let (_, users) = users();
    let index = users
        .create_index("by_team_role", ["team", "profile.role"])
        .unwrap();
    users
        .set("u1", json!({ "team": "core", "profile": { "role": "dev" } }))
        .await
        .unwrap();
    users
        .set("u2", json!({ "team": "core", "profile": { "role": "ops" } }))
        .await
        .unwrap();

    let a = index
        .match_documents([("team", "core"), ("profile.role", "dev")])
        .await
        .unwrap();
    let b = index
        .match_documents([("profile.role", "dev"), ("team", "core")])
        .await
        .unwrap();
    assert_eq!(sorted_ids(&a), vec!["u1"]);
    assert_eq!(sorted_ids(&a), sorted_ids(&b));

    // Partial criteria never match a multi-field index
    assert!(index
        .match_documents([("team", "core")])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_structured_values_match_exactly() {
    let (_, users) = users();
    let index = users.create_index("by_tags", ["tags"]).unwrap();
    users.set("u1", json!({ "tags": ["a", "b"] })).await.unwrap();
    users.set("u2", json!({ "tags": ["b", "a"] })).await.unwrap();

    let hits = index
        .match_documents([("tags", Value::from(json!(["a", "b"])))])
        .await
        .unwrap();
    assert_eq!(sorted_ids(&hits), vec!["u1"]);
}

#[tokio::test]
async fn test_array_element_path() {
    let (_, users) = users();
    let index = users.create_index("by_first_tag", ["tags.0"]).unwrap();
    users.set("u1", json!({ "tags": ["a", "b"] })).await.unwrap();
    users.set("u2", json!({ "tags": ["b"] })).await.unwrap();

    let hits = index.match_documents([("tags.0", "b")]).await.unwrap();
    assert_eq!(sorted_ids(&hits), vec!["u2"]);
}

#[tokio::test]
async fn test_out_of_band_removal_heals_durably() {
    let (store, users) = users();
    let index = users.create_index("by_name", ["name"]).unwrap();
    users.set("1", json!({ "name": "x" })).await.unwrap();
    users.set("2", json!({ "name": "x" })).await.unwrap();

    store.delete(&document_key("users", "1")).await.unwrap();

    for _ in 0..2 {
        let hits = index.match_documents([("name", "x")]).await.unwrap();
        assert_eq!(sorted_ids(&hits), vec!["2"]);
    }
    let fp = index.fingerprint([("name", "x")]).unwrap();
    let members = store
        .set_members(&format!(
            "@upstash/query:collection:users:index:by_name:hashes:{}",
            fp
        ))
        .await
        .unwrap();
    assert_eq!(members, vec!["2"]);
}

#[tokio::test]
async fn test_reindex_discovers_existing_documents() {
    let (_, users) = users();
    for i in 0..5 {
        users
            .set(&i.to_string(), json!({ "parity": i % 2 }))
            .await
            .unwrap();
    }
    let index = users.create_index("by_parity", ["parity"]).unwrap();
    assert!(index.match_documents([("parity", 0)]).await.unwrap().is_empty());

    assert_eq!(index.reindex().await.unwrap(), 5);
    assert_eq!(
        sorted_ids(&index.match_documents([("parity", 0)]).await.unwrap()),
        vec!["0", "2", "4"]
    );

    // Running it again changes nothing
    assert_eq!(index.reindex().await.unwrap(), 5);
    assert_eq!(
        sorted_ids(&index.match_documents([("parity", 1)]).await.unwrap()),
        vec!["1", "3"]
    );
}

#[tokio::test]
async fn test_unique_index() {
    let (_, users) = users();
    let index = users
        .create_index_with(
            IndexOptions::new("by_email", ["email"])
                .unique(true)
                .repair(RepairMode::Inline),
        )
        .unwrap();

    users.set("u1", json!({ "email": "a@x" })).await.unwrap();
    let err = users
        .insert("u2", json!({ "email": "a@x" }))
        .await
        .unwrap_err();
    match err {
        Error::UniqueViolation {
            index, existing, ..
        } => {
            assert_eq!(index, "by_email");
            assert_eq!(existing, "u1");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Freeing the value lets another document take it
    users.update("u1", json!({ "email": "b@x" })).await.unwrap();
    users.set("u2", json!({ "email": "a@x" })).await.unwrap();
    assert_eq!(
        sorted_ids(&index.match_documents([("email", "a@x")]).await.unwrap()),
        vec!["u2"]
    );
}

#[tokio::test]
async fn test_index_delete_then_recreate() {
    let (store, users) = users();
    let index = users.create_index("by_name", ["name"]).unwrap();
    users.set("1", json!({ "name": "x" })).await.unwrap();

    assert_eq!(index.delete().await.unwrap(), 2);
    assert_eq!(store.len(), 1);
    assert!(index.match_documents([("name", "x")]).await.unwrap().is_empty());

    // Writes after delete are not indexed by the deleted index
    users.set("2", json!({ "name": "x" })).await.unwrap();
    assert_eq!(store.len(), 2);

    let rebuilt = users.create_index("by_name", ["name"]).unwrap();
    rebuilt.reindex().await.unwrap();
    assert_eq!(
        sorted_ids(&rebuilt.match_documents([("name", "x")]).await.unwrap()),
        vec!["1", "2"]
    );
}
