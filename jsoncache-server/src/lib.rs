//! HTTP API for the jsoncache document store.
//!
//! Exposes create/read/replace/delete by id and query-by-example over a shared
//! [`InMemoryStore`](jsoncache_memory::InMemoryStore) persisted to a BSON data file.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::SharedStore;
pub use router::build_router;
pub use server::JsonCacheServer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use jsoncache_core::store::DocumentStore;
    use jsoncache_memory::InMemoryStore;
    use serde_json::{Value as JsonValue, json};
    use tower::util::ServiceExt;

    fn app() -> (Router, SharedStore) {
        let store = Arc::new(DocumentStore::new(InMemoryStore::new()));
        (build_router(store.clone()), store)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, JsonValue) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    async fn create(app: &Router, body: JsonValue) -> String {
        let (status, json) = send(app, "POST", "/store", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        json["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let (app, _) = app();
        let id = create(&app, json!({ "name": "Alice", "age": 30 })).await;

        let (status, json) = send(&app, "GET", &format!("/store/{id}"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "name": "Alice", "age": 30 }));
    }

    #[tokio::test]
    async fn create_rejects_non_objects() {
        let (app, store) = app();

        let (status, json) = send(&app, "POST", "/store", "[1, 2, 3]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("invalid JSON format"));

        let (status, _) = send(&app, "POST", "/store", "{broken").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(store.backend().is_empty().await);
    }

    #[tokio::test]
    async fn fetch_unknown_id_is_not_found() {
        let (app, _) = app();
        let (status, json) = send(&app, "GET", "/store/nope", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({ "error": "ID not found: nope" }));
    }

    #[tokio::test]
    async fn replace_overwrites_existing_document() {
        let (app, _) = app();
        let id = create(&app, json!({ "name": "Bob", "age": 25 })).await;

        let (status, json) = send(&app, "PUT", &format!("/store/{id}"), r#"{"nick": "B"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "id": id }));

        let (_, json) = send(&app, "GET", &format!("/store/{id}"), "").await;
        assert_eq!(json, json!({ "nick": "B" }));
    }

    #[tokio::test]
    async fn replace_unknown_id_does_not_create() {
        let (app, store) = app();

        let (status, _) = send(&app, "PUT", "/store/ghost", r#"{"a": 1}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.get("ghost").await.unwrap().is_none());

        let (status, _) = send(&app, "PUT", "/store/ghost", "nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let (app, _) = app();
        let id = create(&app, json!({ "name": "Clare" })).await;

        let (status, _) = send(&app, "DELETE", &format!("/store/{id}"), "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "DELETE", &format!("/store/{id}"), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn query_endpoint_filters_documents() {
        let (app, _) = app();
        create(&app, json!({ "name": "Alice", "age": 30 })).await;
        create(&app, json!({ "name": "Bob", "age": 25 })).await;
        create(&app, json!({ "name": "Charlie", "age": 30 })).await;

        let (status, json) = send(&app, "POST", "/query", r#"{"name": "Alice", "age": {"$gte": 20}}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([{ "name": "Alice", "age": 30 }]));

        let (_, json) = send(&app, "POST", "/query", r#"{"age": {"$lte": 1}}"#).await;
        assert_eq!(json, json!([]));

        let (status, _) = send(&app, "POST", "/query", r#""age""#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
