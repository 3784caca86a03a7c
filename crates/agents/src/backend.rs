//! Store / ad-platform backend seam. The pipeline only talks to this trait, so the
//! in-process synthetic provider and the remote mock API are interchangeable.

use async_trait::async_trait;
use pilot_core::types::{
    Campaign, CreateCampaignRequest, HealthStatus, Product, ProductAnalytics, ResetSummary,
};
use pilot_core::PilotResult;
use pilot_mock_api::SyntheticProvider;

#[async_trait]
pub trait CampaignBackend: Send + Sync {
    async fn list_products(&self) -> PilotResult<Vec<Product>>;
    async fn get_product(&self, id: u32) -> PilotResult<Product>;
    async fn product_analytics(&self, id: u32) -> PilotResult<ProductAnalytics>;
    async fn create_campaign(&self, req: CreateCampaignRequest) -> PilotResult<Campaign>;
    async fn get_campaign(&self, id: &str) -> PilotResult<Campaign>;
    async fn list_campaigns(&self) -> PilotResult<Vec<Campaign>>;
    async fn pause_campaign(&self, id: &str) -> PilotResult<Campaign>;
    async fn resume_campaign(&self, id: &str) -> PilotResult<Campaign>;
    async fn reset(&self) -> PilotResult<ResetSummary>;
    async fn health(&self) -> PilotResult<HealthStatus>;
}

#[async_trait]
impl CampaignBackend for SyntheticProvider {
    async fn list_products(&self) -> PilotResult<Vec<Product>> {
        Ok(SyntheticProvider::list_products(self))
    }

    async fn get_product(&self, id: u32) -> PilotResult<Product> {
        SyntheticProvider::get_product(self, id)
    }

    async fn product_analytics(&self, id: u32) -> PilotResult<ProductAnalytics> {
        SyntheticProvider::product_analytics(self, id)
    }

    async fn create_campaign(&self, req: CreateCampaignRequest) -> PilotResult<Campaign> {
        SyntheticProvider::create_campaign(self, req)
    }

    async fn get_campaign(&self, id: &str) -> PilotResult<Campaign> {
        SyntheticProvider::get_campaign(self, id)
    }

    async fn list_campaigns(&self) -> PilotResult<Vec<Campaign>> {
        Ok(SyntheticProvider::list_campaigns(self))
    }

    async fn pause_campaign(&self, id: &str) -> PilotResult<Campaign> {
        SyntheticProvider::pause_campaign(self, id)
    }

    async fn resume_campaign(&self, id: &str) -> PilotResult<Campaign> {
        SyntheticProvider::resume_campaign(self, id)
    }

    async fn reset(&self) -> PilotResult<ResetSummary> {
        Ok(SyntheticProvider::reset(self))
    }

    async fn health(&self) -> PilotResult<HealthStatus> {
        Ok(SyntheticProvider::health(self))
    }
}
