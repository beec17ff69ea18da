use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use jsoncache_core::error::DocumentStoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("ID not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] DocumentStoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(DocumentStoreError::InvalidDocument(_)) => StatusCode::BAD_REQUEST,
            Self::Store(DocumentStoreError::DocumentNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
