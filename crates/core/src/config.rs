use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_PILOT__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    6000
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

// ─── Synthetic Provider Config ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_budget")]
    pub default_budget: f64,
    #[serde(default = "default_duration_days")]
    pub default_duration_days: u32,
    /// Upper bound on synthesized spend as a fraction of the campaign budget.
    #[serde(default = "default_spend_cap_fraction")]
    pub spend_cap_fraction: f64,
    #[serde(default = "default_min_spend")]
    pub min_spend: f64,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_budget() -> f64 { 20.0 }
fn default_duration_days() -> u32 { 7 }
fn default_spend_cap_fraction() -> f64 { 0.8 }
fn default_min_spend() -> f64 { 5.0 }

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_budget: default_budget(),
            default_duration_days: default_duration_days(),
            spend_cap_fraction: default_spend_cap_fraction(),
            min_spend: default_min_spend(),
            seed: None,
        }
    }
}

// ─── Lifecycle Config ───────────────────────────────────────────────────────

/// Thresholds for the campaign lifecycle decision policy, in percent
/// (CPA in currency units).
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_cpa_pause_threshold")]
    pub cpa_pause_threshold: f64,
    #[serde(default = "default_decline_sales_percent")]
    pub decline_sales_percent: f64,
    #[serde(default = "default_decline_views_percent")]
    pub decline_views_percent: f64,
    #[serde(default = "default_growth_sales_percent")]
    pub growth_sales_percent: f64,
    #[serde(default = "default_growth_views_percent")]
    pub growth_views_percent: f64,
    #[serde(default = "default_moderate_floor_percent")]
    pub moderate_floor_percent: f64,
}

fn default_cpa_pause_threshold() -> f64 { 25.0 }
fn default_decline_sales_percent() -> f64 { -10.0 }
fn default_decline_views_percent() -> f64 { -5.0 }
fn default_growth_sales_percent() -> f64 { 15.0 }
fn default_growth_views_percent() -> f64 { 10.0 }
fn default_moderate_floor_percent() -> f64 { 5.0 }

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            cpa_pause_threshold: default_cpa_pause_threshold(),
            decline_sales_percent: default_decline_sales_percent(),
            decline_views_percent: default_decline_views_percent(),
            growth_sales_percent: default_growth_sales_percent(),
            growth_views_percent: default_growth_views_percent(),
            moderate_floor_percent: default_moderate_floor_percent(),
        }
    }
}

// ─── Pipeline Config ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_campaigns")]
    pub max_campaigns: usize,
    #[serde(default = "default_min_stock")]
    pub min_stock: u32,
    #[serde(default = "default_min_budget")]
    pub min_budget: f64,
    #[serde(default = "default_max_budget")]
    pub max_budget: f64,
    #[serde(default = "default_budget_price_ratio")]
    pub budget_price_ratio: f64,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

fn default_max_campaigns() -> usize { 3 }
fn default_min_stock() -> u32 { 50 }
fn default_min_budget() -> f64 { 15.0 }
fn default_max_budget() -> f64 { 50.0 }
fn default_budget_price_ratio() -> f64 { 0.5 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_campaigns: default_max_campaigns(),
            min_stock: default_min_stock(),
            min_budget: default_min_budget(),
            max_budget: default_max_budget(),
            budget_price_ratio: default_budget_price_ratio(),
            duration_days: default_duration_days(),
        }
    }
}

// ─── Remote Client Config ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String { "http://localhost:6000".to_string() }
fn default_timeout_ms() -> u64 { 10_000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_PILOT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 6000);
        assert!((config.provider.default_budget - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.provider.default_duration_days, 7);
        assert!((config.provider.spend_cap_fraction - 0.8).abs() < f64::EPSILON);
        assert!((config.lifecycle.growth_sales_percent - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.pipeline.max_campaigns, 3);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "lifecycle": { "cpa_pause_threshold": 40.0 },
            "provider": { "seed": 7 }
        }))
        .unwrap();
        assert!((config.lifecycle.cpa_pause_threshold - 40.0).abs() < f64::EPSILON);
        assert!((config.lifecycle.decline_views_percent + 5.0).abs() < f64::EPSILON);
        assert_eq!(config.provider.seed, Some(7));
        assert_eq!(config.api.host, "0.0.0.0");
    }
}
