pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod forms;
pub mod models;
pub mod search;
pub mod services;
pub mod store;
pub mod views;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::DirectoryService;
use crate::store::BookingStore;

// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryService,
    pub config: config::Config,
}

impl AppState {
    pub fn new(store: Arc<dyn BookingStore>, config: config::Config) -> Arc<Self> {
        tracing::debug!("Using {} store", store.backend_tag());
        Arc::new(Self {
            directory: DirectoryService::new(store),
            config,
        })
    }

    /// Open the configured store (running migrations for PostgreSQL).
    pub async fn connect(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let store = store::connect(&config.database).await?;
        Ok(Self::new(store, config))
    }
}

/// Full application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking Directory v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
