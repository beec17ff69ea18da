//! Storage-and-query core of jsoncache, an embedded JSON document store.
//!
//! This crate provides:
//!
//! - **Value model** ([`value`]) - The recursive tagged union every document is made of
//! - **Documents** ([`document`]) - Identifiers and typed document conversions
//! - **Query representation** ([`query`]) - Parsing of query documents and the evaluation visitor
//! - **Persistence codec** ([`codec`]) - Atomic BSON snapshots of a whole store
//! - **Store backend abstraction** ([`backend`]) - Trait implemented by concrete stores
//! - **Document store** ([`store`]) - Main interface used by applications
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use jsoncache_core::{store::DocumentStore, value::Value};
//!
//! let store = DocumentStore::new(backend);
//! let id = store.insert(Value::from_json_str(r#"{"name": "Alice"}"#)?).await?;
//! assert!(store.get(&id).await?.is_some());
//! ```

pub mod backend;
pub mod codec;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
pub mod value;
