//! The thin HTTP collaborator: route wiring over the [`crate::facade::Indexer`].
//!
//! # Usage
//!
//! ```ignore
//! use erc20_holder_indexer::http::router;
//!
//! let app = router(indexer);
//! axum::serve(listener, app).await?;
//! ```

mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::facade::Indexer;

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub(crate) indexer: Arc<Indexer>,
}

/// Build the application router.
#[must_use]
pub fn router(indexer: Arc<Indexer>) -> Router {
    let state = AppState { indexer };

    Router::new()
        .route("/health", get(routes::health))
        .route("/get_balance", get(routes::get_balance))
        .route("/get_balance_batch", post(routes::get_balance_batch))
        .route("/get_token_info", get(routes::get_token_info))
        .route("/bootstrap", post(routes::bootstrap))
        .route("/index", post(routes::index))
        .route("/get_top", get(routes::get_top))
        .route("/get_top_with_transactions", get(routes::get_top_with_transactions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
