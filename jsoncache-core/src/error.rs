//! Error types and result types for document store operations.
//!
//! This module provides error handling for every store, codec and query operation.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.
//!
//! Absence of a document is not an error at the store level: lookups return
//! `Option` and mutations report whether the id existed. [`DocumentStoreError::DocumentNotFound`]
//! is raised by callers that require existence.

use std::path::PathBuf;

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The requested document was not found in the store.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    /// The payload or query is not shaped as expected.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The persisted store file does not exist.
    ///
    /// Kept apart from [`DocumentStoreError::Io`] so callers can decide to start empty.
    #[error("Store file not found: {}", .0.display())]
    StoreFileNotFound(PathBuf),
    /// Reading, writing or renaming the store file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DocumentStoreError {
    /// Returns `true` if this error reports a missing store file.
    pub fn is_store_file_not_found(&self) -> bool {
        matches!(self, DocumentStoreError::StoreFileNotFound(_))
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
