//! In-memory storage backend for jsoncache.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and can write its whole table
//! through to a BSON data file.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Write-through persistence** - Atomic whole-table saves after every mutation, or on demand
//! - **Query evaluation** - Linear-scan matching of literal and `$eq`/`$lte`/`$gte` clauses
//!
//! # Quick Start
//!
//! ```ignore
//! use jsoncache::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().path("./data.bson").build().await?;
//!     let store = DocumentStore::new(backend);
//!
//!     let id = store.insert(Value::from_json_str(r#"{"name": "Alice", "age": 30}"#)?).await?;
//!     let found = store.find(&Value::from_json_str(r#"{"age": {"$gte": 18}}"#)?).await?;
//!     assert_eq!(found.len(), 1);
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as jsoncache_memory;

pub mod store;
pub mod evaluator;

pub use store::{FlushPolicy, InMemoryStore, InMemoryStoreBuilder};
