//! Axum REST handlers for the mock store and ad-platform API.

use crate::models::*;
use crate::provider::SyntheticProvider;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pilot_core::types::{Campaign, CreateCampaignRequest, Product, ProductAnalytics, ResetSummary};
use pilot_core::PilotError;
use std::sync::Arc;
use tracing::warn;

/// Shared mock API state.
#[derive(Clone)]
pub struct MockApiState {
    pub provider: Arc<SyntheticProvider>,
}

/// Error wrapper that renders a [`PilotError`] as a JSON error body.
pub struct ApiError(pub PilotError);

impl From<PilotError> for ApiError {
    fn from(e: PilotError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PilotError::NotFound { .. } => StatusCode::NOT_FOUND,
            PilotError::Validation(_) => StatusCode::BAD_REQUEST,
            PilotError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "Mock API request failed");
        }
        metrics::counter!("mock_api.errors", "code" => self.0.code()).increment(1);
        let body = ErrorResponse {
            status: "error".to_string(),
            error: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;

// ─── Store API ─────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<MockApiState>) -> Json<ApiEnvelope<Vec<Product>>> {
    Json(ApiEnvelope::list(state.provider.list_products()))
}

pub async fn get_product(State(state): State<MockApiState>, Path(id): Path<u32>) -> ApiResult<Product> {
    let product = state.provider.get_product(id)?;
    Ok(Json(ApiEnvelope::success(product)))
}

pub async fn product_analytics(
    State(state): State<MockApiState>,
    Path(id): Path<u32>,
) -> ApiResult<ProductAnalytics> {
    let analytics = state.provider.product_analytics(id)?;
    Ok(Json(ApiEnvelope::success(analytics)))
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn create_campaign(
    State(state): State<MockApiState>,
    payload: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiEnvelope<Campaign>>), ApiError> {
    let Json(req) = payload.map_err(|rejection| PilotError::Validation(rejection.body_text()))?;
    let campaign = state.provider.create_campaign(req)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(campaign).with_message("Campaign created successfully")),
    ))
}

pub async fn list_campaigns(State(state): State<MockApiState>) -> Json<ApiEnvelope<Vec<Campaign>>> {
    Json(ApiEnvelope::list(state.provider.list_campaigns()))
}

pub async fn get_campaign(State(state): State<MockApiState>, Path(id): Path<String>) -> ApiResult<Campaign> {
    let campaign = state.provider.get_campaign(&id)?;
    Ok(Json(ApiEnvelope::success(campaign)))
}

pub async fn pause_campaign(State(state): State<MockApiState>, Path(id): Path<String>) -> ApiResult<Campaign> {
    let campaign = state.provider.pause_campaign(&id)?;
    Ok(Json(ApiEnvelope::success(campaign).with_message("Campaign paused successfully")))
}

pub async fn resume_campaign(State(state): State<MockApiState>, Path(id): Path<String>) -> ApiResult<Campaign> {
    let campaign = state.provider.resume_campaign(&id)?;
    Ok(Json(ApiEnvelope::success(campaign).with_message("Campaign resumed successfully")))
}

// ─── Utility ───────────────────────────────────────────────────────────────

pub async fn reset(State(state): State<MockApiState>) -> Json<ApiEnvelope<ResetSummary>> {
    let summary = state.provider.reset();
    Json(ApiEnvelope::success(summary).with_message("All campaign data reset"))
}

pub async fn health(State(state): State<MockApiState>) -> Json<HealthResponse> {
    let health = state.provider.health();
    Json(HealthResponse {
        status: health.status,
        message: "API is running".to_string(),
        timestamp: health.timestamp,
        endpoints: HealthEndpoints {
            store: "/api/store/*".to_string(),
            impact: "/api/impact/*".to_string(),
        },
    })
}

pub async fn audit_log(State(state): State<MockApiState>) -> Json<ApiEnvelope<Vec<AuditLogEntry>>> {
    Json(ApiEnvelope::list(state.provider.store().audit_log()))
}
