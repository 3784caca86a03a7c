//! API server — mounts the mock store/ads API plus liveness/readiness routes, and the metrics exporter.

use crate::rest::{self, ProbeState};
use axum::routing::get;
use axum::Router;
use pilot_core::config::AppConfig;
use pilot_mock_api::{mock_api_router, SyntheticProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    provider: Arc<SyntheticProvider>,
}

impl ApiServer {
    pub fn new(config: AppConfig, provider: Arc<SyntheticProvider>) -> Self {
        Self { config, provider }
    }

    /// Full application router with middleware applied.
    pub fn router(&self) -> Router {
        let health_routes = Router::new()
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            .with_state(ProbeState {
                provider: self.provider.clone(),
                start_time: Instant::now(),
            });

        Router::new()
            .merge(mock_api_router(self.provider.clone()))
            .merge(health_routes)
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, products = self.provider.list_products().len(), "Starting mock API server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }

    /// Install the Prometheus recorder and serve it on the metrics port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
