//! Liveness and readiness endpoints served next to the mock API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pilot_mock_api::SyntheticProvider;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

#[derive(Clone)]
pub struct ProbeState {
    pub provider: Arc<SyntheticProvider>,
    pub start_time: Instant,
}

/// GET /live — Liveness check. The process answering is enough.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /ready — Readiness check.
/// Ready once the provider reports healthy and has a catalog to serve.
pub async fn readiness(State(state): State<ProbeState>) -> (StatusCode, Json<ReadinessResponse>) {
    let health = state.provider.health();
    let products = state.provider.list_products().len();
    let ready = health.status == "healthy" && products > 0;
    if !ready {
        warn!(status = %health.status, products, "Readiness check failed");
    }

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(ReadinessResponse {
            ready,
            products,
            campaigns: state.provider.store().len(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub products: usize,
    pub campaigns: usize,
    pub uptime_secs: u64,
}
