use std::collections::HashSet;

use jsoncache_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::DocumentStoreError,
    query::{Filter, Query},
    store::DocumentStore,
    value::Value,
};
use jsoncache_memory::{FlushPolicy, InMemoryStore};
use serde_json::json;
use tempfile::TempDir;

fn doc(json: serde_json::Value) -> Value {
    Value::from(json)
}

async fn people(ages: [u32; 3]) -> DocumentStore<InMemoryStore> {
    let store = DocumentStore::new(InMemoryStore::new());
    let names = ["Alice", "Bob", "Charlie"];

    for (index, (name, age)) in names.iter().zip(ages).enumerate() {
        store
            .put(&(index + 1).to_string(), doc(json!({ "name": name, "age": age })))
            .await
            .unwrap();
    }

    store
}

fn names(found: &[Value]) -> HashSet<String> {
    found
        .iter()
        .filter_map(|document| document.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn insert_then_get_returns_the_same_document() {
    let store = DocumentStore::new(InMemoryStore::new());
    let document = doc(json!({
        "name": "frank",
        "items": ["music", "sport"],
        "workRevenues": { "freelance": 800, "9-5": 2000 }
    }));

    let id = store.insert(document.clone()).await.unwrap();

    assert_eq!(store.get(&id).await.unwrap(), Some(document));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let store = DocumentStore::new(InMemoryStore::new());
    let id = store.insert(doc(json!({ "name": "Clare", "age": 24 }))).await.unwrap();

    assert!(store.delete(&id).await.unwrap());
    assert_eq!(store.get(&id).await.unwrap(), None);
    assert!(!store.delete(&id).await.unwrap());
}

#[tokio::test]
async fn replace_discards_previous_fields() {
    let store = DocumentStore::new(InMemoryStore::new());
    store.put("x", doc(json!({ "a": 1, "b": 2 }))).await.unwrap();

    assert!(store.replace("x", doc(json!({ "c": [3] }))).await.unwrap());
    assert_eq!(store.get("x").await.unwrap(), Some(doc(json!({ "c": [3] }))));

    assert!(!store.replace("fresh", doc(json!({}))).await.unwrap());
    assert!(store.get("fresh").await.unwrap().is_some());
}

#[tokio::test]
async fn update_requires_an_existing_document() {
    let store = DocumentStore::new(InMemoryStore::new());

    let err = store.update("ghost", doc(json!({ "a": 1 }))).await.unwrap_err();
    assert!(matches!(err, DocumentStoreError::DocumentNotFound(id) if id == "ghost"));
    assert_eq!(store.get("ghost").await.unwrap(), None);

    store.put("real", doc(json!({ "a": 1 }))).await.unwrap();
    store.update("real", doc(json!({ "b": 2 }))).await.unwrap();
    assert_eq!(store.get("real").await.unwrap(), Some(doc(json!({ "b": 2 }))));
}

#[tokio::test]
async fn literal_query_matches_exact_values() {
    let store = people([30, 25, 30]).await;

    let found = store.find(&doc(json!({ "name": "Alice" }))).await.unwrap();

    assert_eq!(found, vec![doc(json!({ "name": "Alice", "age": 30 }))]);
}

#[tokio::test]
async fn lte_query_returns_lower_ages() {
    let store = people([30, 25, 20]).await;

    let found = store.find(&doc(json!({ "age": { "$lte": 25 } }))).await.unwrap();

    assert_eq!(names(&found), set(&["Bob", "Charlie"]));
}

#[tokio::test]
async fn gte_query_returns_higher_ages() {
    let store = people([30, 25, 20]).await;

    let found = store.find(&doc(json!({ "age": { "$gte": 25 } }))).await.unwrap();

    assert_eq!(names(&found), set(&["Alice", "Bob"]));
}

#[tokio::test]
async fn gte_query_excludes_non_numeric_fields() {
    let store = people([30, 25, 20]).await;
    store.put("4", doc(json!({ "name": "Dana", "age": "unknown" }))).await.unwrap();
    store.put("5", doc(json!({ "name": "Eve", "age": "41" }))).await.unwrap();

    let found = store.find(&doc(json!({ "age": { "$gte": 25 } }))).await.unwrap();

    assert_eq!(names(&found), set(&["Alice", "Bob", "Eve"]));
}

#[tokio::test]
async fn query_fields_are_conjunctive() {
    let store = people([30, 25, 30]).await;

    let found = store
        .find(&doc(json!({ "name": "Alice", "age": { "$gte": 20 } })))
        .await
        .unwrap();

    assert_eq!(found, vec![doc(json!({ "name": "Alice", "age": 30 }))]);
}

#[tokio::test]
async fn eq_differs_from_literal_equality_for_strings() {
    let store = people([30, 25, 20]).await;

    let literal = store.find(&doc(json!({ "name": "Bob" }))).await.unwrap();
    let eq = store.find(&doc(json!({ "name": { "$eq": "Bob" } }))).await.unwrap();

    assert_eq!(names(&literal), set(&["Bob"]));
    assert!(eq.is_empty());
}

#[tokio::test]
async fn programmatic_filters_match_parsed_queries() {
    let store = people([30, 25, 20]).await;

    let parsed = store
        .find(&doc(json!({ "age": { "$gte": 21, "$lte": 30 } })))
        .await
        .unwrap();
    let built = store
        .query(&Query::new(Filter::and([
            Filter::exists("age"),
            Filter::gte("age", 21),
            Filter::lte("age", 30),
        ])))
        .await
        .unwrap();

    assert_eq!(names(&parsed), names(&built));
    assert_eq!(names(&built), set(&["Alice", "Bob"]));
}

#[tokio::test]
async fn non_object_documents_are_skipped_by_queries() {
    let store = people([30, 25, 20]).await;
    store.put("list", Value::Array(vec![Value::from("Alice")])).await.unwrap();

    let all = store.find(&doc(json!({}))).await.unwrap();
    assert_eq!(all.len(), 3);

    let err = store.find(&Value::from("name")).await.unwrap_err();
    assert!(matches!(err, DocumentStoreError::InvalidDocument(_)));
}

#[tokio::test]
async fn save_then_load_restores_the_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.bson");

    let store = people([30, 25, 20]).await;
    store.put("nested", doc(json!({ "deep": [[1, { "x": null }], true, "s"] }))).await.unwrap();
    let before = store.snapshot().await.unwrap();

    store.save(&path).await.unwrap();

    let fresh = DocumentStore::new(InMemoryStore::new());
    fresh.load(&path).await.unwrap();

    assert_eq!(fresh.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn load_replaces_contents_wholesale() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.bson");

    let source = people([30, 25, 20]).await;
    source.save(&path).await.unwrap();

    let target = DocumentStore::new(InMemoryStore::new());
    target.put("stale", doc(json!({ "old": true }))).await.unwrap();
    target.load(&path).await.unwrap();

    assert_eq!(target.get("stale").await.unwrap(), None);
    assert_eq!(target.backend().len().await, 3);
}

#[tokio::test]
async fn load_of_missing_file_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::new(InMemoryStore::new());
    store.put("keep", doc(json!({ "a": 1 }))).await.unwrap();

    let err = store.load(dir.path().join("absent.bson")).await.unwrap_err();

    assert!(err.is_store_file_not_found());
    assert!(store.get("keep").await.unwrap().is_some());
}

#[tokio::test]
async fn persistent_store_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.bson");

    let first = InMemoryStore::builder().path(&path).build().await.unwrap();
    let store = DocumentStore::new(first);
    let id = store.insert(doc(json!({ "name": "Ben", "age": 44 }))).await.unwrap();
    store.put("gone", doc(json!({}))).await.unwrap();
    store.delete("gone").await.unwrap();
    store.shutdown().await.unwrap();

    let reopened = DocumentStore::new(InMemoryStore::builder().path(&path).build().await.unwrap());

    assert_eq!(
        reopened.get(&id).await.unwrap(),
        Some(doc(json!({ "name": "Ben", "age": 44 })))
    );
    assert_eq!(reopened.get("gone").await.unwrap(), None);
}

#[tokio::test]
async fn deferred_store_flushes_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.bson");

    let backend = InMemoryStore::builder()
        .path(&path)
        .flush_policy(FlushPolicy::Deferred)
        .build()
        .await
        .unwrap();
    backend.put_document("1", doc(json!({ "v": 1 }))).await.unwrap();
    backend.put_document("1", doc(json!({ "v": 2 }))).await.unwrap();
    assert!(!path.exists());

    backend.shutdown().await.unwrap();

    let reopened = InMemoryStore::builder().path(&path).build().await.unwrap();
    assert_eq!(
        reopened.get_document("1").await.unwrap(),
        Some(doc(json!({ "v": 2 })))
    );
}

#[tokio::test]
async fn missing_data_file_starts_empty() {
    let dir = TempDir::new().unwrap();

    let store = InMemoryStore::builder()
        .path(dir.path().join("never-written.bson"))
        .build()
        .await
        .unwrap();

    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_all_reach_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.bson");
    let store = InMemoryStore::builder().path(&path).build().await.unwrap();

    let mut handles = Vec::new();
    for worker in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for item in 0..10 {
                let id = format!("{worker}-{item}");
                store
                    .put_document(&id, doc(json!({ "worker": worker, "item": item })))
                    .await
                    .unwrap();
                assert!(store.get_document(&id).await.unwrap().is_some());
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len().await, 80);
    assert!(!store.is_dirty().await);

    let reopened = InMemoryStore::builder().path(&path).build().await.unwrap();
    assert_eq!(reopened.snapshot().await.unwrap(), store.snapshot().await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_to_one_path_all_succeed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.bson");
    let store = InMemoryStore::new();
    for item in 0..2000 {
        store
            .put_document(&item.to_string(), doc(json!({ "item": item })))
            .await
            .unwrap();
    }

    for _ in 0..10 {
        let saves = (0..4).map(|_| {
            let store = store.clone();
            let path = path.clone();
            tokio::spawn(async move { store.save(&path).await })
        });

        for save in saves.collect::<Vec<_>>() {
            save.await.unwrap().unwrap();
        }
    }

    assert_eq!(jsoncache_core::codec::load(&path).unwrap(), store.snapshot().await.unwrap());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
