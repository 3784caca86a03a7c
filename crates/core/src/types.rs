//! Store and ad-platform domain types shared by the mock API, the
//! pipeline, and the HTTP client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Product ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub stock: u32,
    pub page_views: u64,
    pub sales: u64,
    pub revenue: f64,
}

/// A current/previous pair with the percent change between them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricTrend<T> {
    pub current: T,
    pub previous: T,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalytics {
    pub product_id: u32,
    pub time_range: String,
    pub page_views: MetricTrend<u64>,
    pub sales: MetricTrend<u64>,
    pub revenue: MetricTrend<f64>,
    pub conversion_rate: f64,
    pub bounce_rate: f64,
    /// Seconds.
    pub avg_session_duration: u32,
}

// ─── Campaign ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Paused => f.write_str("paused"),
        }
    }
}

/// Product figures captured when the campaign was created. Never overwritten.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CampaignBaseline {
    pub page_views: u64,
    pub sales: u64,
    pub revenue: f64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct CampaignMetrics {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub spend: f64,
    /// Percent.
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
}

impl CampaignMetrics {
    /// Cost per acquisition; `None` when nothing converted.
    pub fn cpa(&self) -> Option<f64> {
        if self.conversions == 0 {
            None
        } else {
            Some(self.spend / self.conversions as f64)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: String,
    pub product_id: u32,
    pub campaign_name: String,
    pub status: CampaignStatus,
    pub budget: f64,
    pub duration_days: u32,
    pub campaign_copy: String,
    pub created_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub baseline: CampaignBaseline,
    pub metrics: CampaignMetrics,
}

/// Payload for creating a campaign. Only `product_id` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCampaignRequest {
    #[serde(default)]
    pub product_id: Option<u32>,
    #[serde(default)]
    pub campaign_name: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub campaign_copy: Option<String>,
}

impl CreateCampaignRequest {
    pub fn for_product(product_id: u32) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::default()
        }
    }
}

// ─── Operational ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSummary {
    pub campaigns_removed: usize,
    pub reset_at: DateTime<Utc>,
}
