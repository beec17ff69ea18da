//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the contract the HTTP layer and the [`DocumentStore`]
//! facade program against. Implementations are required to be thread-safe
//! (`Send + Sync`) and to serialize concurrent access to their table themselves.
//!
//! # Contract
//!
//! - Every operation touches exactly one id, except [`StoreBackend::snapshot`],
//!   [`StoreBackend::restore`] and [`StoreBackend::query_documents`], which see or replace
//!   the whole table atomically with respect to writers.
//! - Absence is reported through `Option` / `bool`, never as an error.
//! - Mutations of a persistent backend write the table through to disk before returning
//!   (unless the backend is configured to defer flushing). A persistence failure is
//!   returned to the caller, but the in-memory change stays applied.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

use std::{fmt::Debug, path::Path};

use async_trait::async_trait;

use crate::{codec::StoreMap, error::DocumentStoreResult, query::Query, value::Value};

/// Abstract interface for document storage backends.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts `document` under `id`, overwriting any previous document.
    async fn put_document(&self, id: &str, document: Value) -> DocumentStoreResult<()>;

    /// Returns a copy of the document stored under `id`, if any.
    async fn get_document(&self, id: &str) -> DocumentStoreResult<Option<Value>>;

    /// Stores `document` under `id` and reports whether `id` already existed.
    ///
    /// The previous document is discarded entirely; fields are never merged.
    async fn replace_document(&self, id: &str, document: Value) -> DocumentStoreResult<bool>;

    /// Stores `document` under `id` only if `id` already exists, reporting whether it did.
    ///
    /// The existence check and the write happen under the same lock, so a concurrent
    /// delete can never be resurrected by an update.
    async fn update_document(&self, id: &str, document: Value) -> DocumentStoreResult<bool>;

    /// Removes the document under `id` and reports whether it existed.
    ///
    /// Deleting an absent id is not an error.
    async fn delete_document(&self, id: &str) -> DocumentStoreResult<bool>;

    /// Returns every object-shaped document matching `query`, in no particular order.
    async fn query_documents(&self, query: &Query) -> DocumentStoreResult<Vec<Value>>;

    /// Returns a point-in-time copy of the whole table.
    async fn snapshot(&self) -> DocumentStoreResult<StoreMap>;

    /// Replaces the whole table with `documents`.
    async fn restore(&self, documents: StoreMap) -> DocumentStoreResult<()>;

    /// Writes the current table to `path`.
    async fn save(&self, path: &Path) -> DocumentStoreResult<()>;

    /// Replaces the current table with the one stored at `path`.
    ///
    /// A missing file is reported as
    /// [`DocumentStoreError::StoreFileNotFound`](crate::error::DocumentStoreError::StoreFileNotFound)
    /// and leaves the table untouched.
    async fn load(&self, path: &Path) -> DocumentStoreResult<()>;

    /// Writes any pending changes to the backing file.
    ///
    /// The default implementation is a no-op for backends that never defer writes.
    async fn flush(&self) -> DocumentStoreResult<()> {
        Ok(())
    }

    /// Cleanly shuts down the backend, flushing pending changes and releasing resources.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        self.flush().await
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn put_document(&self, id: &str, document: Value) -> DocumentStoreResult<()> {
        (*self).put_document(id, document).await
    }

    async fn get_document(&self, id: &str) -> DocumentStoreResult<Option<Value>> {
        (*self).get_document(id).await
    }

    async fn replace_document(&self, id: &str, document: Value) -> DocumentStoreResult<bool> {
        (*self).replace_document(id, document).await
    }

    async fn update_document(&self, id: &str, document: Value) -> DocumentStoreResult<bool> {
        (*self).update_document(id, document).await
    }

    async fn delete_document(&self, id: &str) -> DocumentStoreResult<bool> {
        (*self).delete_document(id).await
    }

    async fn query_documents(&self, query: &Query) -> DocumentStoreResult<Vec<Value>> {
        (*self).query_documents(query).await
    }

    async fn snapshot(&self) -> DocumentStoreResult<StoreMap> {
        (*self).snapshot().await
    }

    async fn restore(&self, documents: StoreMap) -> DocumentStoreResult<()> {
        (*self).restore(documents).await
    }

    async fn save(&self, path: &Path) -> DocumentStoreResult<()> {
        (*self).save(path).await
    }

    async fn load(&self, path: &Path) -> DocumentStoreResult<()> {
        (*self).load(path).await
    }

    async fn flush(&self) -> DocumentStoreResult<()> {
        (*self).flush().await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
