//! HTTP surface for ziptap: one download route per delivery strategy.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use ziptap_archive::SourceItemProvider;
use ziptap_deliver::Deliverer;

pub mod body;
pub mod config;
pub mod error;
mod routes;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn SourceItemProvider>,
    pub deliverer: Arc<Deliverer>,
}

impl AppState {
    pub fn new(provider: impl SourceItemProvider + 'static, deliverer: Deliverer) -> Self {
        Self {
            provider: Arc::new(provider),
            deliverer: Arc::new(deliverer),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download/tmp-file", get(routes::tmp_file))
        .route("/download/piped", get(routes::piped))
        .route("/download/streaming", get(routes::streaming))
        .with_state(state)
}
