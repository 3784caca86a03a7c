//! Mock API router — store endpoints under /api/store, ad platform under /api/impact.

use crate::handlers::{self, MockApiState};
use crate::provider::SyntheticProvider;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Build the mock API router over an existing provider.
/// Returns a Router that should be merged into the main app.
pub fn mock_api_router(provider: Arc<SyntheticProvider>) -> Router {
    let state = MockApiState { provider };

    Router::new()
        // Store
        .route("/api/store/products", get(handlers::list_products))
        .route("/api/store/products/:id", get(handlers::get_product))
        .route("/api/store/products/:id/analytics", get(handlers::product_analytics))
        // Impact
        .route("/api/impact/campaigns", get(handlers::list_campaigns).post(handlers::create_campaign))
        .route("/api/impact/campaigns/:id", get(handlers::get_campaign))
        .route("/api/impact/campaigns/:id/pause", post(handlers::pause_campaign))
        .route("/api/impact/campaigns/:id/resume", post(handlers::resume_campaign))
        // Utility
        .route("/api/health", get(handlers::health))
        .route("/api/reset", post(handlers::reset))
        .route("/api/audit-log", get(handlers::audit_log))
        .with_state(state)
}
