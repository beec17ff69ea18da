use std::{future::Future, sync::Arc, time::Duration};

use tokio::{net::TcpListener, task::JoinHandle, time::Instant};

use jsoncache_core::{backend::StoreBackendBuilder, store::DocumentStore};
use jsoncache_memory::{FlushPolicy, InMemoryStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::SharedStore;
use crate::router::build_router;

/// HTTP front end over a persistent in-memory document store.
pub struct JsonCacheServer {
    config: ServerConfig,
}

impl JsonCacheServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Load the data file and build the shared store.
    ///
    /// A missing data file yields an empty store; any other load failure is returned.
    pub async fn open_store(&self) -> ServerResult<SharedStore> {
        let policy = match self.config.flush_interval() {
            Some(_) => FlushPolicy::Deferred,
            None => FlushPolicy::EveryWrite,
        };

        let backend = InMemoryStore::builder()
            .path(&self.config.data_path)
            .flush_policy(policy)
            .build()
            .await?;

        Ok(Arc::new(DocumentStore::new(backend)))
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Start serving requests until `signal` resolves, then flush the store.
    pub async fn serve_with_shutdown(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        let store = self.open_store().await?;
        self.serve_store(store, signal).await
    }

    async fn serve_store(
        &self,
        store: SharedStore,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        let flusher = self
            .config
            .flush_interval()
            .map(|interval| spawn_flusher(store.clone(), interval));

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            data = %self.config.data_path.display(),
            "jsoncache server listening"
        );

        let served = axum::serve(listener, build_router(store.clone()))
            .with_graceful_shutdown(signal)
            .await
            .map_err(ServerError::Io);

        if let Some(flusher) = flusher {
            flusher.abort();
        }

        store.flush().await?;
        tracing::info!("jsoncache server stopped");

        served
    }
}

fn spawn_flusher(store: SharedStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        loop {
            ticker.tick().await;
            if let Err(e) = store.flush().await {
                tracing::warn!(error = %e, "Periodic flush failed");
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
