//! Main jsoncache crate providing a unified interface for document storage.
//!
//! This crate is the primary entry point for users of jsoncache. It re-exports the core
//! types and the in-memory backend, and optionally the HTTP server.
//!
//! # Features
//!
//! - **Schemaless documents** - Store any JSON object; typed serde structs convert on the way in and out
//! - **Query by example** - Literal equality plus `$eq`, `$lte` and `$gte` operator clauses
//! - **Durable snapshots** - The whole store is written atomically to a BSON data file
//!
//! # Quick Start
//!
//! ```ignore
//! use jsoncache::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     pub age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(
//!         InMemoryStore::builder().path("./data.bson").build().await.unwrap()
//!     );
//!
//!     let id = store
//!         .insert_typed(&User { name: "Alice".to_string(), age: 30 })
//!         .await
//!         .unwrap();
//!
//!     let alice: Option<User> = store.get_typed(&id).await.unwrap();
//!
//!     let adults = store
//!         .query(&Query::new(Filter::gte("age", 18)))
//!         .await
//!         .unwrap();
//!
//!     println!("{alice:?} {adults:?}");
//!
//!     store.shutdown().await.unwrap();
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory table with write-through BSON persistence
//! - [`server`] - HTTP API over the in-memory backend (requires `server` feature)

pub mod prelude;

pub use jsoncache_core::{backend, codec, document, error, query, store, value};

// Re-export serialization crates for convenience
pub use bson;
pub use serde_json;

/// In-memory storage backend implementations.
pub mod memory {
    pub use jsoncache_memory::{FlushPolicy, InMemoryStore, InMemoryStoreBuilder};
}

/// HTTP server exposing a store over the network.
///
/// This module is only available when the `server` feature is enabled.
#[cfg(feature = "server")]
pub mod server {
    pub use jsoncache_server::{JsonCacheServer, ServerConfig, ServerError, build_router};
}
