//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use conveyor::JobStore;
use tower_http::trace::TraceLayer;

use crate::kernel::jobs::ScrapeService;
use crate::server::routes::{enqueue_refresh_handler, health_handler, scrape_failures_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scrape: Arc<ScrapeService>,
    pub store: Arc<dyn JobStore>,
}

/// Build the Axum application router.
///
/// The gateway and the diagnostics routes share the same store the
/// worker consumes from; they communicate through it and nothing else.
pub fn build_app(store: Arc<dyn JobStore>) -> Router {
    let state = AppState {
        scrape: Arc::new(ScrapeService::new(store.clone())),
        store,
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/scrape/refresh", post(enqueue_refresh_handler))
        .route("/scrape/failures", get(scrape_failures_handler))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
