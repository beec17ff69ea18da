//! In-memory storage implementation with write-through persistence.
//!
//! This module provides the table every request is served from. Documents live in a
//! `HashMap` behind an async-aware read-write lock; when a data path is configured, the
//! whole table is written to disk with the BSON codec after mutations.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use mea::{mutex::Mutex, rwlock::RwLock};
use tracing::{debug, info, warn};

use jsoncache_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::{self, StoreMap},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
    value::Value,
};

use crate::evaluator::DocumentEvaluator;

/// When mutations reach the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Every mutation writes the table before returning.
    #[default]
    EveryWrite,
    /// Mutations only mark the table dirty. Changes reach disk on
    /// [`StoreBackend::flush`] or [`StoreBackend::shutdown`].
    Deferred,
}

#[derive(Debug, Default)]
struct Table {
    documents: StoreMap,
    /// Bumped on every mutation; compared against the generation last written to disk.
    generation: u64,
}

#[derive(Debug)]
struct Persistence {
    path: PathBuf,
    policy: FlushPolicy,
    /// Generation of the table currently on disk. Holding the lock serializes writers.
    written: Mutex<u64>,
}

#[derive(Debug, Default)]
struct Inner {
    table: RwLock<Table>,
    persistence: Option<Persistence>,
}

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones share
/// the same table and can be handed to concurrent request handlers.
///
/// # Concurrency
///
/// Reads (`get`, `query`, `snapshot`) share the read lock; a query holds it for its whole
/// scan. Mutations take the write lock only for the map update. Persisting happens after
/// the lock is released: the flusher copies the table under the read lock and writes the
/// copy on the blocking thread pool, one flush at a time. A flush that finds the table
/// already on disk at its current generation does nothing, so bursts of writes coalesce.
///
/// # Example
///
/// ```ignore
/// use jsoncache_memory::InMemoryStore;
/// use jsoncache_core::{backend::{StoreBackend, StoreBackendBuilder}, value::Value};
///
/// let store = InMemoryStore::builder().path("data.bson").build().await?;
/// store.put_document("1", Value::from_json_str(r#"{"name": "Alice"}"#)?).await?;
/// assert!(store.get_document("1").await?.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    /// Creates a new empty store that never touches the filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing an `InMemoryStore` with a data file.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn with_documents(documents: StoreMap, persistence: Option<Persistence>) -> Self {
        Self {
            inner: Arc::new(Inner {
                table: RwLock::new(Table { documents, generation: 0 }),
                persistence,
            }),
        }
    }

    /// Path of the data file, if the store is persistent.
    pub fn path(&self) -> Option<&Path> {
        self.inner
            .persistence
            .as_ref()
            .map(|persistence| persistence.path.as_path())
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.inner.table.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns `true` if the table has changes that have not reached the data file.
    pub async fn is_dirty(&self) -> bool {
        let Some(persistence) = &self.inner.persistence else {
            return false;
        };

        let written = *persistence.written.lock().await;
        self.inner.table.read().await.generation != written
    }

    /// Applies `apply` under the write lock, then writes through if the policy says so.
    async fn mutate<T>(&self, apply: impl FnOnce(&mut StoreMap) -> (T, bool)) -> DocumentStoreResult<T> {
        let (result, changed) = {
            let mut table = self.inner.table.write().await;
            let (result, changed) = apply(&mut table.documents);

            if changed {
                table.generation += 1;
            }

            (result, changed)
        };

        if !changed {
            return Ok(result);
        }

        match &self.inner.persistence {
            Some(persistence) if persistence.policy == FlushPolicy::EveryWrite => {
                self.persist(persistence).await?;
            }
            _ => {}
        }

        Ok(result)
    }

    /// Writes the latest table to the data file unless it is already there.
    async fn persist(&self, persistence: &Persistence) -> DocumentStoreResult<()> {
        let mut written = persistence.written.lock().await;

        let (generation, snapshot) = {
            let table = self.inner.table.read().await;

            if table.generation == *written {
                return Ok(());
            }

            (table.generation, table.documents.clone())
        };

        write_file(persistence.path.clone(), snapshot).await?;
        *written = generation;

        Ok(())
    }
}

async fn write_file(path: PathBuf, snapshot: StoreMap) -> DocumentStoreResult<()> {
    tokio::task::spawn_blocking(move || codec::save(&path, &snapshot))
        .await
        .map_err(|err| DocumentStoreError::Backend(err.to_string()))?
}

async fn read_file(path: PathBuf) -> DocumentStoreResult<StoreMap> {
    tokio::task::spawn_blocking(move || codec::load(&path))
        .await
        .map_err(|err| DocumentStoreError::Backend(err.to_string()))?
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn put_document(&self, id: &str, document: Value) -> DocumentStoreResult<()> {
        self.mutate(|documents| {
            documents.insert(id.to_string(), document);
            ((), true)
        })
        .await?;

        debug!(id, "Stored document");

        Ok(())
    }

    async fn get_document(&self, id: &str) -> DocumentStoreResult<Option<Value>> {
        Ok(
            self.inner
                .table
                .read()
                .await
                .documents
                .get(id)
                .cloned()
        )
    }

    async fn replace_document(&self, id: &str, document: Value) -> DocumentStoreResult<bool> {
        let existed = self
            .mutate(|documents| (documents.insert(id.to_string(), document).is_some(), true))
            .await?;

        debug!(id, existed, "Replaced document");

        Ok(existed)
    }

    async fn update_document(&self, id: &str, document: Value) -> DocumentStoreResult<bool> {
        let existed = self
            .mutate(|documents| match documents.get_mut(id) {
                Some(slot) => {
                    *slot = document;
                    (true, true)
                }
                None => (false, false),
            })
            .await?;

        debug!(id, existed, "Updated document");

        Ok(existed)
    }

    async fn delete_document(&self, id: &str) -> DocumentStoreResult<bool> {
        let existed = self
            .mutate(|documents| {
                let existed = documents.remove(id).is_some();
                (existed, existed)
            })
            .await?;

        debug!(id, existed, "Deleted document");

        Ok(existed)
    }

    async fn query_documents(&self, query: &Query) -> DocumentStoreResult<Vec<Value>> {
        let table = self.inner.table.read().await;

        Ok(DocumentEvaluator::filter_documents(
            table.documents.values(),
            &query.filter,
        ))
    }

    async fn snapshot(&self) -> DocumentStoreResult<StoreMap> {
        Ok(self.inner.table.read().await.documents.clone())
    }

    async fn restore(&self, documents: StoreMap) -> DocumentStoreResult<()> {
        let count = documents.len();

        self.mutate(move |current| {
            *current = documents;
            ((), true)
        })
        .await?;

        info!(documents = count, "Restored store contents");

        Ok(())
    }

    async fn save(&self, path: &Path) -> DocumentStoreResult<()> {
        let snapshot = self.snapshot().await?;
        write_file(path.to_path_buf(), snapshot).await
    }

    async fn load(&self, path: &Path) -> DocumentStoreResult<()> {
        let documents = read_file(path.to_path_buf()).await?;
        self.restore(documents).await
    }

    async fn flush(&self) -> DocumentStoreResult<()> {
        match &self.inner.persistence {
            Some(persistence) => self.persist(persistence).await,
            None => Ok(()),
        }
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// Without a path the store is purely in memory. With a path, [`build`] loads the existing
/// data file. A missing or unreadable file is logged and the store starts empty; a file
/// that cannot be decoded aborts construction.
///
/// [`build`]: StoreBackendBuilder::build
///
/// # Example
///
/// ```ignore
/// use jsoncache_memory::{FlushPolicy, InMemoryStore};
/// use jsoncache_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .path("./data.bson")
///     .flush_policy(FlushPolicy::Deferred)
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    path: Option<PathBuf>,
    flush_policy: FlushPolicy,
}

impl InMemoryStoreBuilder {
    /// Sets the data file the store is loaded from and persisted to.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets when mutations are written to the data file.
    pub fn flush_policy(mut self, flush_policy: FlushPolicy) -> Self {
        self.flush_policy = flush_policy;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let Some(path) = self.path else {
            return Ok(InMemoryStore::new());
        };

        let documents = match read_file(path.clone()).await {
            Ok(documents) => {
                info!(path = %path.display(), documents = documents.len(), "Loaded data file");
                documents
            }
            Err(DocumentStoreError::StoreFileNotFound(_)) => {
                warn!(path = %path.display(), "No data file found, starting with an empty store");
                StoreMap::new()
            }
            Err(DocumentStoreError::Io(err)) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Data file unreadable, starting with an empty store"
                );
                StoreMap::new()
            }
            Err(err) => return Err(err),
        };

        Ok(InMemoryStore::with_documents(
            documents,
            Some(Persistence {
                path,
                policy: self.flush_policy,
                written: Mutex::new(0),
            }),
        ))
    }
}
