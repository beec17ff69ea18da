use axum::{
    Router,
    routing::{get, post},
};

use crate::handler::{self, SharedStore};

/// Build the axum router with all store endpoints.
pub fn build_router(store: SharedStore) -> Router {
    Router::new()
        .route("/store", post(handler::insert_handler))
        .route(
            "/store/:id",
            get(handler::get_handler)
                .put(handler::replace_handler)
                .delete(handler::delete_handler),
        )
        .route("/query", post(handler::query_handler))
        .with_state(store)
}
