//! HTTP backend for a remote mock API server.
//!
//! Transport failures and timeouts surface as `UpstreamUnavailable`; nothing is retried here.

use crate::backend::CampaignBackend;
use async_trait::async_trait;
use pilot_core::config::ClientConfig;
use pilot_core::types::{
    Campaign, CreateCampaignRequest, HealthStatus, Product, ProductAnalytics, ResetSummary,
};
use pilot_core::{PilotError, PilotResult};
use pilot_mock_api::models::{ApiEnvelope, ErrorResponse, HealthResponse};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> PilotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PilotError::Config(format!("Failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| PilotError::Config(format!("Invalid base URL '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(PilotError::Config(format!("Invalid base URL '{}'", config.base_url)));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Endpoint URL under the base path. Each segment is percent-encoded, so
    /// ids containing `/` or `?` stay a single path segment.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    /// Send a request and unwrap the success envelope. `entity`/`id` name the
    /// resource for a 404.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        entity: &'static str,
        id: &str,
    ) -> PilotResult<T> {
        let start = Instant::now();
        let resp = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "Mock API call failed");
            PilotError::UpstreamUnavailable(format!("{endpoint}: {e}"))
        })?;
        let status = resp.status();
        debug!(endpoint, status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "Mock API call");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(match status {
                StatusCode::NOT_FOUND => PilotError::NotFound {
                    entity,
                    id: id.to_string(),
                },
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => PilotError::Validation(message),
                _ => PilotError::UpstreamUnavailable(format!("{endpoint}: HTTP {status}: {message}")),
            });
        }

        let envelope: ApiEnvelope<T> = resp
            .json()
            .await
            .map_err(|e| PilotError::UpstreamUnavailable(format!("{endpoint}: invalid response: {e}")))?;
        envelope
            .data
            .ok_or_else(|| PilotError::UpstreamUnavailable(format!("{endpoint}: response has no data")))
    }
}

#[async_trait]
impl CampaignBackend for HttpBackend {
    async fn list_products(&self) -> PilotResult<Vec<Product>> {
        let url = self.url(&["api", "store", "products"]);
        self.call(self.client.get(&url), &url, "product", "*").await
    }

    async fn get_product(&self, id: u32) -> PilotResult<Product> {
        let url = self.url(&["api", "store", "products", id.to_string().as_str()]);
        self.call(self.client.get(&url), &url, "product", &id.to_string()).await
    }

    async fn product_analytics(&self, id: u32) -> PilotResult<ProductAnalytics> {
        let url = self.url(&["api", "store", "products", id.to_string().as_str(), "analytics"]);
        self.call(self.client.get(&url), &url, "product", &id.to_string()).await
    }

    async fn create_campaign(&self, req: CreateCampaignRequest) -> PilotResult<Campaign> {
        let url = self.url(&["api", "impact", "campaigns"]);
        let id = req.product_id.map(|p| p.to_string()).unwrap_or_default();
        self.call(self.client.post(&url).json(&req), &url, "product", &id).await
    }

    async fn get_campaign(&self, id: &str) -> PilotResult<Campaign> {
        let url = self.url(&["api", "impact", "campaigns", id]);
        self.call(self.client.get(&url), &url, "campaign", id).await
    }

    async fn list_campaigns(&self) -> PilotResult<Vec<Campaign>> {
        let url = self.url(&["api", "impact", "campaigns"]);
        self.call(self.client.get(&url), &url, "campaign", "*").await
    }

    async fn pause_campaign(&self, id: &str) -> PilotResult<Campaign> {
        let url = self.url(&["api", "impact", "campaigns", id, "pause"]);
        self.call(self.client.post(&url), &url, "campaign", id).await
    }

    async fn resume_campaign(&self, id: &str) -> PilotResult<Campaign> {
        let url = self.url(&["api", "impact", "campaigns", id, "resume"]);
        self.call(self.client.post(&url), &url, "campaign", id).await
    }

    async fn reset(&self) -> PilotResult<ResetSummary> {
        let url = self.url(&["api", "reset"]);
        self.call(self.client.post(&url), &url, "campaign", "*").await
    }

    async fn health(&self) -> PilotResult<HealthStatus> {
        let url = self.url(&["api", "health"]);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PilotError::UpstreamUnavailable(format!("{url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(PilotError::UpstreamUnavailable(format!(
                "{url}: HTTP {}",
                resp.status()
            )));
        }
        let health: HealthResponse = resp
            .json()
            .await
            .map_err(|e| PilotError::UpstreamUnavailable(format!("{url}: invalid response: {e}")))?;
        Ok(HealthStatus {
            status: health.status,
            timestamp: health.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilot_core::config::ProviderConfig;
    use pilot_core::types::CampaignStatus;
    use pilot_mock_api::{mock_api_router, CampaignStore, SyntheticProvider};
    use std::sync::Arc;

    async fn spawn_mock_api() -> String {
        let config = ProviderConfig {
            seed: Some(11),
            ..ProviderConfig::default()
        };
        let provider = SyntheticProvider::new(&config, Arc::new(CampaignStore::new())).unwrap();
        let app = mock_api_router(Arc::new(provider));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend(base_url: String) -> HttpBackend {
        HttpBackend::new(&ClientConfig {
            base_url,
            timeout_ms: 2_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_against_mock_api() {
        let backend = backend(spawn_mock_api().await);

        assert_eq!(backend.health().await.unwrap().status, "healthy");
        assert_eq!(backend.list_products().await.unwrap().len(), 5);

        let created = backend
            .create_campaign(CreateCampaignRequest {
                budget: Some(30.0),
                ..CreateCampaignRequest::for_product(100)
            })
            .await
            .unwrap();
        let fetched = backend.get_campaign(&created.campaign_id).await.unwrap();
        assert_eq!(fetched.product_id, 100);
        assert!((fetched.budget - 30.0).abs() < f64::EPSILON);
        assert_eq!(fetched.status, CampaignStatus::Active);

        let paused = backend.pause_campaign(&created.campaign_id).await.unwrap();
        assert_eq!(paused.status, CampaignStatus::Paused);
        let resumed = backend.resume_campaign(&created.campaign_id).await.unwrap();
        assert_eq!(resumed.status, CampaignStatus::Active);

        assert_eq!(backend.reset().await.unwrap().campaigns_removed, 1);
        assert!(backend.list_campaigns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let backend = backend(spawn_mock_api().await);

        let err = backend.get_product(9999).await.unwrap_err();
        assert!(matches!(err, PilotError::NotFound { entity: "product", ref id } if id == "9999"));

        let err = backend.get_campaign("camp_missing").await.unwrap_err();
        assert!(matches!(err, PilotError::NotFound { entity: "campaign", .. }));

        let err = backend.create_campaign(CreateCampaignRequest::default()).await.unwrap_err();
        assert!(matches!(err, PilotError::Validation(ref m) if m.contains("product_id")));
    }

    #[test]
    fn test_ids_are_encoded_as_one_path_segment() {
        let backend = backend("http://localhost:6000/mock/".to_string());
        assert_eq!(backend.base_url(), "http://localhost:6000/mock");
        assert_eq!(
            backend.url(&["api", "impact", "campaigns", "camp_1/pause?x=1"]),
            "http://localhost:6000/mock/api/impact/campaigns/camp_1%2Fpause%3Fx=1"
        );
        assert_eq!(
            backend.url(&["api", "health"]),
            "http://localhost:6000/mock/api/health"
        );
    }

    #[tokio::test]
    async fn test_id_with_separators_does_not_hit_another_route() {
        let backend = backend(spawn_mock_api().await);
        let created = backend.create_campaign(CreateCampaignRequest::for_product(100)).await.unwrap();

        let tricky = format!("{}/pause", created.campaign_id);
        let err = backend.get_campaign(&tricky).await.unwrap_err();
        assert!(matches!(err, PilotError::NotFound { entity: "campaign", ref id } if *id == tricky));

        let err = backend.pause_campaign("camp_x?y=1").await.unwrap_err();
        assert!(matches!(err, PilotError::NotFound { .. }));
        let still = backend.get_campaign(&created.campaign_id).await.unwrap();
        assert_eq!(still.status, CampaignStatus::Active);
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = HttpBackend::new(&ClientConfig {
            base_url: "not a url".to_string(),
            timeout_ms: 1_000,
        });
        assert!(matches!(result, Err(PilotError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_upstream_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend(format!("http://{addr}/"));
        assert_eq!(backend.base_url(), format!("http://{addr}"));
        let err = backend.list_products().await.unwrap_err();
        assert!(matches!(err, PilotError::UpstreamUnavailable(_)));
    }
}
