use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use jsoncache_core::{store::DocumentStore, value::Value};
use jsoncache_memory::InMemoryStore;

use crate::error::{ServerError, ServerResult};

/// Store shared by every request handler.
pub type SharedStore = Arc<DocumentStore<InMemoryStore>>;

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: String,
}

/// Parses a request body that must be a JSON object.
fn object_body(body: &[u8]) -> ServerResult<Value> {
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(json @ JsonValue::Object(_)) => Ok(Value::from(json)),
        Ok(other) => Err(ServerError::InvalidJson(format!("expected an object, found {other}"))),
        Err(e) => Err(ServerError::InvalidJson(e.to_string())),
    }
}

/// `POST /store`
pub async fn insert_handler(
    State(store): State<SharedStore>,
    body: Bytes,
) -> ServerResult<Json<IdResponse>> {
    let document = object_body(&body)?;
    let id = store.insert(document).await?;
    tracing::info!(%id, "Created document");
    Ok(Json(IdResponse { id }))
}

/// `GET /store/:id`
pub async fn get_handler(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> ServerResult<Json<JsonValue>> {
    match store.get(&id).await? {
        Some(document) => Ok(Json(JsonValue::from(document))),
        None => Err(ServerError::NotFound(id)),
    }
}

/// `PUT /store/:id`
pub async fn replace_handler(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    body: Bytes,
) -> ServerResult<Json<IdResponse>> {
    let document = object_body(&body)?;
    store.update(&id, document).await?;
    Ok(Json(IdResponse { id }))
}

/// `DELETE /store/:id`
pub async fn delete_handler(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    if store.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(id))
    }
}

/// `POST /query`
pub async fn query_handler(
    State(store): State<SharedStore>,
    body: Bytes,
) -> ServerResult<Json<Vec<JsonValue>>> {
    let query = object_body(&body)?;
    let found = store.find(&query).await?;
    tracing::debug!(matches = found.len(), "Query evaluated");
    Ok(Json(found.into_iter().map(JsonValue::from).collect()))
}
