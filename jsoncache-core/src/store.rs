//! Main document store interface.
//!
//! [`DocumentStore`] wraps a [`StoreBackend`] and adds what the backend deliberately does
//! not do: identifier generation, query parsing, typed documents and "must exist"
//! semantics for callers that want an error instead of a flag.
//!
//! # Example
//!
//! ```ignore
//! use jsoncache::{prelude::*, memory::InMemoryStore};
//!
//! let store = DocumentStore::new(InMemoryStore::builder().path("data.bson").build().await?);
//! let id = store.insert(Value::from_json_str(r#"{"name": "Alice", "age": 30}"#)?).await?;
//! let adults = store.find(&Value::from_json_str(r#"{"age": {"$gte": 18}}"#)?).await?;
//! store.shutdown().await?;
//! ```

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    backend::StoreBackend,
    codec::StoreMap,
    document::{DocumentExt, DocumentId, new_document_id},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
    value::Value,
};

/// A document store bound to a specific backend implementation.
///
/// Cheap backends (such as an `Arc`-backed in-memory store) can be cloned and shared;
/// `DocumentStore` itself only borrows the backend for each call.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stores `document` under a freshly generated id and returns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to persist the change.
    pub async fn insert(&self, document: Value) -> DocumentStoreResult<DocumentId> {
        let id = new_document_id();
        self.backend.put_document(&id, document).await?;

        Ok(id)
    }

    /// Stores `document` under a caller-chosen id, overwriting any previous document.
    pub async fn put(&self, id: &str, document: Value) -> DocumentStoreResult<()> {
        self.backend.put_document(id, document).await
    }

    /// Serializes a typed document and stores it under a freshly generated id.
    pub async fn insert_typed<D>(&self, document: &D) -> DocumentStoreResult<DocumentId>
    where
        D: Serialize + DeserializeOwned,
    {
        self.insert(document.to_value()?).await
    }

    /// Returns the document stored under `id`, if any.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<Value>> {
        self.backend.get_document(id).await
    }

    /// Returns the document stored under `id` deserialized as `D`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if the stored document does not have
    /// the shape of `D`.
    pub async fn get_typed<D>(&self, id: &str) -> DocumentStoreResult<Option<D>>
    where
        D: Serialize + DeserializeOwned,
    {
        self.get(id)
            .await?
            .map(D::from_value)
            .transpose()
    }

    /// Stores `document` under `id` and reports whether `id` already existed.
    pub async fn replace(&self, id: &str, document: Value) -> DocumentStoreResult<bool> {
        self.backend.replace_document(id, document).await
    }

    /// Replaces the document under an existing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if `id` is absent; nothing is
    /// written in that case.
    pub async fn update(&self, id: &str, document: Value) -> DocumentStoreResult<()> {
        if self.backend.update_document(id, document).await? {
            Ok(())
        } else {
            Err(DocumentStoreError::DocumentNotFound(id.to_string()))
        }
    }

    /// Removes the document under `id` and reports whether it existed.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<bool> {
        self.backend.delete_document(id).await
    }

    /// Returns every document matching a query document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`] if `query` is not an object.
    pub async fn find(&self, query: &Value) -> DocumentStoreResult<Vec<Value>> {
        self.query(&Query::from_value(query)?).await
    }

    /// Returns every document matching an already parsed query.
    pub async fn query(&self, query: &Query) -> DocumentStoreResult<Vec<Value>> {
        self.backend.query_documents(query).await
    }

    /// Returns a point-in-time copy of every stored document.
    pub async fn snapshot(&self) -> DocumentStoreResult<StoreMap> {
        self.backend.snapshot().await
    }

    /// Writes the whole store to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> DocumentStoreResult<()> {
        self.backend.save(path.as_ref()).await
    }

    /// Replaces the store contents with the file at `path`.
    pub async fn load(&self, path: impl AsRef<Path>) -> DocumentStoreResult<()> {
        self.backend.load(path.as_ref()).await
    }

    /// Writes pending changes to the backing file, if the backend defers them.
    pub async fn flush(&self) -> DocumentStoreResult<()> {
        self.backend.flush().await
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// This consumes the store and should be called when no longer needed.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }
}
