//! Convenient re-exports of commonly used types from jsoncache.
//!
//! ```ignore
//! use jsoncache::prelude::*;
//! ```

pub use jsoncache_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::StoreMap,
    document::{DocumentExt, DocumentId},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, FieldOp, Filter, Query, QueryVisitor},
    store::DocumentStore,
    value::{Map, Value},
};
