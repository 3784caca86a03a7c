//! Synthetic metrics provider — stands in for a live storefront and ad platform.
//!
//! Every query draws fresh figures from fixed ranges, so repeated calls differ.
//! The random source is owned by the provider and can be seeded for tests.

use crate::store::CampaignStore;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use pilot_core::config::ProviderConfig;
use pilot_core::numeric::{floor2, round2};
use pilot_core::types::{
    Campaign, CampaignBaseline, CampaignMetrics, CampaignStatus, CreateCampaignRequest,
    HealthStatus, MetricTrend, Product, ProductAnalytics, ResetSummary,
};
use pilot_core::{PilotError, PilotResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const PAGE_VIEW_JITTER: (i64, i64) = (-50, 100);
const SALES_JITTER: (i64, i64) = (-5, 15);

const VIEWS_CHANGE_PERCENT: (f64, f64) = (-25.0, 45.0);
const SALES_CHANGE_PERCENT: (f64, f64) = (-20.0, 35.0);
const REVENUE_CHANGE_PERCENT: (f64, f64) = (-20.0, 35.0);
const CONVERSION_RATE: (f64, f64) = (2.1, 8.5);
const BOUNCE_RATE: (f64, f64) = (35.0, 75.0);
const SESSION_SECS: (u32, u32) = (120, 500);

const DAILY_IMPRESSIONS: (u64, u64) = (1_000, 10_000);
const CLICK_RATE: (f64, f64) = (0.01, 0.05);
const CONVERSION_FRACTION: (f64, f64) = (0.001, 0.008);
const CTR_PERCENT: (f64, f64) = (1.2, 4.8);
const CPC: (f64, f64) = (0.25, 2.50);
const ROAS: (f64, f64) = (1.5, 6.2);

const DEFAULT_COPY: &str = "Discover our amazing product!";

/// Largest budget a campaign may be created with.
pub const MAX_BUDGET: f64 = 1_000_000_000.0;

/// Generates product and campaign snapshots on top of an injected [`CampaignStore`].
pub struct SyntheticProvider {
    products: Vec<Product>,
    store: Arc<CampaignStore>,
    rng: Mutex<StdRng>,
    config: ProviderConfig,
}

impl SyntheticProvider {
    /// Provider over the demo catalog, seeded from `config.seed` or entropy.
    pub fn new(config: &ProviderConfig, store: Arc<CampaignStore>) -> PilotResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_catalog(config, store, demo_catalog(), rng)
    }

    pub fn with_catalog(
        config: &ProviderConfig,
        store: Arc<CampaignStore>,
        products: Vec<Product>,
        rng: StdRng,
    ) -> PilotResult<Self> {
        if !(config.spend_cap_fraction > 0.0 && config.spend_cap_fraction <= 1.0) {
            return Err(PilotError::Config(format!(
                "spend_cap_fraction must be in (0, 1], got {}",
                config.spend_cap_fraction
            )));
        }
        if !(config.default_budget > 0.0) || config.min_spend < 0.0 {
            return Err(PilotError::Config(
                "default_budget must be positive and min_spend non-negative".to_string(),
            ));
        }
        info!(
            products = products.len(),
            spend_cap_fraction = config.spend_cap_fraction,
            seeded = config.seed.is_some(),
            "Synthetic provider initialized"
        );
        Ok(Self {
            products,
            store,
            rng: Mutex::new(rng),
            config: config.clone(),
        })
    }

    pub fn store(&self) -> &Arc<CampaignStore> {
        &self.store
    }

    // ─── Store API ─────────────────────────────────────────────────────────

    pub fn list_products(&self) -> Vec<Product> {
        self.products.clone()
    }

    /// Stored product with near-real-time jitter on views and sales. The
    /// jitter is applied to the stored value on every call, never accumulated.
    pub fn get_product(&self, id: u32) -> PilotResult<Product> {
        let mut product = self.find_product(id)?.clone();
        let mut rng = self.rng.lock();
        product.page_views = jitter(product.page_views, PAGE_VIEW_JITTER, &mut *rng);
        product.sales = jitter(product.sales, SALES_JITTER, &mut *rng);
        product.revenue = round2(product.sales as f64 * product.price);
        Ok(product)
    }

    pub fn product_analytics(&self, id: u32) -> PilotResult<ProductAnalytics> {
        let product = self.find_product(id)?;
        let mut rng = self.rng.lock();

        let views_change = round2(draw(VIEWS_CHANGE_PERCENT, &mut *rng));
        let sales_change = round2(draw(SALES_CHANGE_PERCENT, &mut *rng));
        let revenue_change = round2(draw(REVENUE_CHANGE_PERCENT, &mut *rng));

        Ok(ProductAnalytics {
            product_id: id,
            time_range: "last_7_days".to_string(),
            page_views: MetricTrend {
                current: apply_change(product.page_views, views_change),
                previous: product.page_views,
                change_percent: views_change,
            },
            sales: MetricTrend {
                current: apply_change(product.sales, sales_change),
                previous: product.sales,
                change_percent: sales_change,
            },
            revenue: MetricTrend {
                current: round2(product.revenue * (1.0 + revenue_change / 100.0)).max(0.0),
                previous: product.revenue,
                change_percent: revenue_change,
            },
            conversion_rate: round2(draw(CONVERSION_RATE, &mut *rng)),
            bounce_rate: round2(draw(BOUNCE_RATE, &mut *rng)),
            avg_session_duration: rng.gen_range(SESSION_SECS.0..=SESSION_SECS.1),
        })
    }

    // ─── Ad Platform API ───────────────────────────────────────────────────

    pub fn create_campaign(&self, req: CreateCampaignRequest) -> PilotResult<Campaign> {
        let product_id = req
            .product_id
            .ok_or_else(|| PilotError::Validation("missing required field 'product_id'".to_string()))?;
        let product = self
            .find_product(product_id)
            .map_err(|_| PilotError::Validation(format!("product {product_id} does not exist")))?;

        let budget = req.budget.unwrap_or(self.config.default_budget);
        if !budget.is_finite() || budget <= 0.0 {
            return Err(PilotError::Validation(format!("budget must be positive, got {budget}")));
        }
        if budget > MAX_BUDGET {
            return Err(PilotError::Validation(format!(
                "budget must be at most {MAX_BUDGET}, got {budget}"
            )));
        }
        let duration_days = req.duration_days.unwrap_or(self.config.default_duration_days);
        if duration_days == 0 {
            return Err(PilotError::Validation("duration_days must be at least 1".to_string()));
        }

        let now = Utc::now();
        let mut campaign = Campaign {
            campaign_id: String::new(),
            product_id,
            campaign_name: req
                .campaign_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Campaign for Product {product_id}")),
            status: CampaignStatus::Active,
            budget,
            duration_days,
            campaign_copy: req
                .campaign_copy
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COPY.to_string()),
            created_at: now,
            start_date: now,
            end_date: now + Duration::days(i64::from(duration_days)),
            baseline: CampaignBaseline {
                page_views: product.page_views,
                sales: product.sales,
                revenue: product.revenue,
                captured_at: now,
            },
            metrics: CampaignMetrics::default(),
        };

        loop {
            campaign.campaign_id = new_campaign_id();
            if self.store.insert(campaign.clone(), "impact-api") {
                break;
            }
            debug!(campaign_id = %campaign.campaign_id, "Campaign id collision, regenerating");
        }

        info!(
            campaign_id = %campaign.campaign_id,
            product_id,
            budget,
            duration_days,
            "Campaign created"
        );
        metrics::counter!("mock_api.campaigns.created").increment(1);
        Ok(campaign)
    }

    pub fn get_campaign(&self, id: &str) -> PilotResult<Campaign> {
        let campaign = self
            .store
            .get(id)
            .ok_or_else(|| PilotError::campaign_not_found(id))?;
        Ok(self.with_live_metrics(campaign, Utc::now()))
    }

    pub fn list_campaigns(&self) -> Vec<Campaign> {
        let now = Utc::now();
        self.store
            .list()
            .into_iter()
            .map(|c| self.with_live_metrics(c, now))
            .collect()
    }

    pub fn pause_campaign(&self, id: &str) -> PilotResult<Campaign> {
        self.transition(id, CampaignStatus::Paused)
    }

    pub fn resume_campaign(&self, id: &str) -> PilotResult<Campaign> {
        self.transition(id, CampaignStatus::Active)
    }

    /// Drop every campaign; the product catalog is untouched.
    pub fn reset(&self) -> ResetSummary {
        let removed = self.store.clear("impact-api");
        info!(campaigns_removed = removed, "Campaign data reset");
        metrics::counter!("mock_api.resets").increment(1);
        ResetSummary {
            campaigns_removed: removed,
            reset_at: Utc::now(),
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn find_product(&self, id: u32) -> PilotResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PilotError::product_not_found(id))
    }

    fn transition(&self, id: &str, status: CampaignStatus) -> PilotResult<Campaign> {
        let campaign = self
            .store
            .set_status(id, status, "impact-api")
            .ok_or_else(|| PilotError::campaign_not_found(id))?;
        info!(campaign_id = %id, status = %status, "Campaign status updated");
        match status {
            CampaignStatus::Paused => metrics::counter!("mock_api.campaigns.paused").increment(1),
            CampaignStatus::Active => metrics::counter!("mock_api.campaigns.resumed").increment(1),
        }
        Ok(campaign)
    }

    /// Fill in performance figures for a stored campaign. Rates are independent
    /// draws and do not reconcile arithmetically with the counts.
    fn with_live_metrics(&self, mut campaign: Campaign, now: DateTime<Utc>) -> Campaign {
        let days_running = (now - campaign.created_at).num_days().max(1) as u64;
        let spend_cap = campaign.budget * self.config.spend_cap_fraction;
        let spend_floor = self.config.min_spend.min(spend_cap);

        let mut rng = self.rng.lock();
        let impressions = days_running * rng.gen_range(DAILY_IMPRESSIONS.0..=DAILY_IMPRESSIONS.1);
        campaign.metrics = CampaignMetrics {
            impressions,
            clicks: (impressions as f64 * draw(CLICK_RATE, &mut *rng)) as u64,
            conversions: (impressions as f64 * draw(CONVERSION_FRACTION, &mut *rng)) as u64,
            spend: floor2(rng.gen_range(spend_floor..=spend_cap)).min(spend_cap),
            ctr: round2(draw(CTR_PERCENT, &mut *rng)),
            cpc: round2(draw(CPC, &mut *rng)),
            roas: round2(draw(ROAS, &mut *rng)),
        };
        campaign
    }
}

fn new_campaign_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("camp_{}", &hex[..8])
}

fn draw<R: Rng + ?Sized>(range: (f64, f64), rng: &mut R) -> f64 {
    rng.gen_range(range.0..=range.1)
}

fn jitter<R: Rng + ?Sized>(base: u64, range: (i64, i64), rng: &mut R) -> u64 {
    let value = base as i64 + rng.gen_range(range.0..=range.1);
    value.max(0) as u64
}

fn apply_change(previous: u64, change_percent: f64) -> u64 {
    (previous as f64 * (1.0 + change_percent / 100.0)).round().max(0.0) as u64
}

/// The five products the mock store ships with.
pub fn demo_catalog() -> Vec<Product> {
    let seed: [(u32, &str, &str, f64, &str, &str, u32, u64, u64, f64); 5] = [
        (100, "Wireless Bluetooth Headphones", "Electronics", 79.99, "High-quality wireless headphones with noise cancellation", "headphones", 150, 2341, 23, 1839.77),
        (101, "Organic Cotton T-Shirt", "Clothing", 24.99, "Comfortable organic cotton t-shirt in various colors", "tshirt", 200, 5672, 89, 2224.11),
        (102, "Smart Water Bottle", "Fitness", 34.99, "Smart water bottle with temperature control and app connectivity", "bottle", 75, 8934, 234, 8187.66),
        (103, "Premium Coffee Beans", "Food & Beverage", 18.99, "Single-origin premium coffee beans, freshly roasted", "coffee", 300, 1876, 34, 645.66),
        (104, "Yoga Mat Premium", "Fitness", 45.99, "Premium non-slip yoga mat with alignment lines", "yoga", 120, 3456, 67, 3081.33),
    ];
    seed.into_iter()
        .map(|(id, name, category, price, description, image, stock, page_views, sales, revenue)| Product {
            id,
            name: name.to_string(),
            category: category.to_string(),
            price,
            description: description.to_string(),
            image_url: format!("https://example.com/{image}.jpg"),
            stock,
            page_views,
            sales,
            revenue,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        let config = ProviderConfig {
            seed: Some(42),
            ..ProviderConfig::default()
        };
        SyntheticProvider::new(&config, Arc::new(CampaignStore::new())).unwrap()
    }

    #[test]
    fn test_list_products_keeps_catalog_order() {
        let ids: Vec<u32> = provider().list_products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![100, 101, 102, 103, 104]);
    }

    #[test]
    fn test_get_product_jitter_is_bounded_and_not_cumulative() {
        let provider = provider();
        for _ in 0..500 {
            let p = provider.get_product(100).unwrap();
            assert!((2291..=2441).contains(&p.page_views), "views {}", p.page_views);
            assert!((18..=38).contains(&p.sales), "sales {}", p.sales);
            assert!((p.revenue - round2(p.sales as f64 * 79.99)).abs() < 1e-9);
        }
        // stored catalog is unchanged
        assert_eq!(provider.list_products()[0].page_views, 2341);
    }

    #[test]
    fn test_unknown_product_is_not_found() {
        let provider = provider();
        assert!(matches!(provider.get_product(9999), Err(PilotError::NotFound { .. })));
        assert!(matches!(provider.product_analytics(9999), Err(PilotError::NotFound { .. })));
    }

    #[test]
    fn test_analytics_ranges() {
        let provider = provider();
        for _ in 0..500 {
            let a = provider.product_analytics(102).unwrap();
            assert_eq!(a.page_views.previous, 8934);
            assert!((-25.0..=45.0).contains(&a.page_views.change_percent));
            assert!((-20.0..=35.0).contains(&a.sales.change_percent));
            assert!((-20.0..=35.0).contains(&a.revenue.change_percent));
            assert!((2.1..=8.5).contains(&a.conversion_rate));
            assert!((35.0..=75.0).contains(&a.bounce_rate));
            assert!((120..=500).contains(&a.avg_session_duration));
            let expected = apply_change(a.sales.previous, a.sales.change_percent);
            assert_eq!(a.sales.current, expected);
        }
    }

    #[test]
    fn test_create_campaign_defaults() {
        let provider = provider();
        let c = provider.create_campaign(CreateCampaignRequest::for_product(101)).unwrap();
        assert!(c.campaign_id.starts_with("camp_"));
        assert_eq!(c.campaign_id.len(), 13);
        assert_eq!(c.status, CampaignStatus::Active);
        assert!((c.budget - 20.0).abs() < f64::EPSILON);
        assert_eq!(c.duration_days, 7);
        assert_eq!(c.end_date - c.start_date, Duration::days(7));
        assert_eq!(c.campaign_name, "Campaign for Product 101");
        assert_eq!(c.campaign_copy, DEFAULT_COPY);
        assert_eq!(c.metrics, CampaignMetrics::default());
        assert_eq!(c.baseline.page_views, 5672);
        assert_eq!(c.baseline.sales, 89);
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let provider = provider();
        let created = provider
            .create_campaign(CreateCampaignRequest {
                product_id: Some(100),
                budget: Some(30.0),
                duration_days: Some(7),
                ..CreateCampaignRequest::default()
            })
            .unwrap();

        let fetched = provider.get_campaign(&created.campaign_id).unwrap();
        assert_eq!(fetched.product_id, 100);
        assert!((fetched.budget - 30.0).abs() < f64::EPSILON);
        assert_eq!(fetched.status, CampaignStatus::Active);
        assert_eq!(fetched.baseline, created.baseline);
    }

    #[test]
    fn test_create_campaign_validation() {
        let provider = provider();
        let err = provider.create_campaign(CreateCampaignRequest::default()).unwrap_err();
        assert!(matches!(err, PilotError::Validation(_)));

        let err = provider.create_campaign(CreateCampaignRequest::for_product(9999)).unwrap_err();
        assert!(matches!(err, PilotError::Validation(_)));

        let err = provider
            .create_campaign(CreateCampaignRequest {
                budget: Some(-1.0),
                ..CreateCampaignRequest::for_product(100)
            })
            .unwrap_err();
        assert!(matches!(err, PilotError::Validation(_)));
        assert!(provider.store().is_empty());
    }

    #[test]
    fn test_campaign_ids_are_unique() {
        let provider = provider();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..200 {
            let c = provider.create_campaign(CreateCampaignRequest::for_product(100)).unwrap();
            assert!(ids.insert(c.campaign_id));
        }
        assert_eq!(provider.list_campaigns().len(), 200);
    }

    #[test]
    fn test_spend_never_exceeds_cap() {
        let provider = provider();
        let small = provider
            .create_campaign(CreateCampaignRequest {
                budget: Some(3.0),
                ..CreateCampaignRequest::for_product(100)
            })
            .unwrap();
        provider.create_campaign(CreateCampaignRequest::for_product(104)).unwrap();

        for _ in 0..300 {
            for c in provider.list_campaigns() {
                assert!(c.metrics.spend <= c.budget * 0.8 + 1e-9, "spend {} budget {}", c.metrics.spend, c.budget);
                assert!(c.metrics.spend >= 0.0);
                assert!((1000..=10_000).contains(&c.metrics.impressions));
                assert!(c.metrics.clicks <= c.metrics.impressions);
                assert!((1.2..=4.8).contains(&c.metrics.ctr));
                assert!((0.25..=2.5).contains(&c.metrics.cpc));
                assert!((1.5..=6.2).contains(&c.metrics.roas));
            }
            let single = provider.get_campaign(&small.campaign_id).unwrap();
            assert!(single.metrics.spend <= 2.4 + 1e-9);
        }
    }

    #[test]
    fn test_impressions_scale_with_days_running() {
        let provider = provider();
        let now = Utc::now();
        let mut campaign = provider.create_campaign(CreateCampaignRequest::for_product(100)).unwrap();
        provider.reset();
        campaign.created_at = now - Duration::days(3) - Duration::hours(2);
        provider.store().insert(campaign.clone(), "test");

        for _ in 0..100 {
            let c = provider.get_campaign(&campaign.campaign_id).unwrap();
            assert!((3_000..=30_000).contains(&c.metrics.impressions));
            assert_eq!(c.metrics.impressions % 3, 0);
        }
    }

    #[test]
    fn test_pause_resume_cycle() {
        let provider = provider();
        let c = provider.create_campaign(CreateCampaignRequest::for_product(100)).unwrap();

        assert_eq!(provider.pause_campaign(&c.campaign_id).unwrap().status, CampaignStatus::Paused);
        assert_eq!(provider.pause_campaign(&c.campaign_id).unwrap().status, CampaignStatus::Paused);
        assert_eq!(provider.resume_campaign(&c.campaign_id).unwrap().status, CampaignStatus::Active);

        assert!(matches!(provider.pause_campaign("camp_missing"), Err(PilotError::NotFound { .. })));
        assert!(matches!(provider.resume_campaign("camp_missing"), Err(PilotError::NotFound { .. })));
    }

    #[test]
    fn test_reset_keeps_products() {
        let provider = provider();
        provider.create_campaign(CreateCampaignRequest::for_product(100)).unwrap();
        provider.create_campaign(CreateCampaignRequest::for_product(102)).unwrap();

        let summary = provider.reset();
        assert_eq!(summary.campaigns_removed, 2);
        assert!(provider.list_campaigns().is_empty());
        assert_eq!(provider.list_products().len(), 5);
    }

    #[test]
    fn test_oversized_budget_is_rejected() {
        let provider = provider();
        let err = provider
            .create_campaign(CreateCampaignRequest {
                budget: Some(1e308),
                ..CreateCampaignRequest::for_product(100)
            })
            .unwrap_err();
        assert!(matches!(err, PilotError::Validation(ref m) if m.contains("at most")));
        assert!(provider.store().is_empty());
    }

    #[test]
    fn test_spend_stays_within_largest_budget() {
        let provider = provider();
        let c = provider
            .create_campaign(CreateCampaignRequest {
                budget: Some(MAX_BUDGET),
                ..CreateCampaignRequest::for_product(100)
            })
            .unwrap();

        for _ in 0..100 {
            let fetched = provider.get_campaign(&c.campaign_id).unwrap();
            let spend = fetched.metrics.spend;
            assert!(spend.is_finite());
            assert!(spend <= fetched.budget * 0.8, "spend {spend}");
            let json = serde_json::to_value(&fetched).unwrap();
            assert!(json["metrics"]["spend"].is_number());
        }
    }

    #[derive(Default)]
    struct CountingRecorder {
        counters: parking_lot::Mutex<std::collections::HashMap<String, Arc<std::sync::atomic::AtomicU64>>>,
    }

    impl CountingRecorder {
        fn get(&self, name: &str) -> u64 {
            self.counters
                .lock()
                .get(name)
                .map(|c| c.load(std::sync::atomic::Ordering::Relaxed))
                .unwrap_or(0)
        }
    }

    impl metrics::Recorder for CountingRecorder {
        fn describe_counter(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}
        fn describe_gauge(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}
        fn describe_histogram(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}

        fn register_counter(&self, key: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Counter {
            let counter = self.counters.lock().entry(key.name().to_string()).or_default().clone();
            metrics::Counter::from_arc(counter)
        }

        fn register_gauge(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Gauge {
            metrics::Gauge::noop()
        }

        fn register_histogram(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Histogram {
            metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_operations_record_counters_without_http() {
        let recorder = CountingRecorder::default();
        metrics::with_local_recorder(&recorder, || {
            let provider = provider();
            let c = provider.create_campaign(CreateCampaignRequest::for_product(100)).unwrap();
            provider.pause_campaign(&c.campaign_id).unwrap();
            provider.resume_campaign(&c.campaign_id).unwrap();
            provider.reset();
        });

        assert_eq!(recorder.get("mock_api.campaigns.created"), 1);
        assert_eq!(recorder.get("mock_api.campaigns.paused"), 1);
        assert_eq!(recorder.get("mock_api.campaigns.resumed"), 1);
        assert_eq!(recorder.get("mock_api.resets"), 1);
    }

    #[test]
    fn test_invalid_spend_cap_is_rejected() {
        let config = ProviderConfig {
            spend_cap_fraction: 1.5,
            ..ProviderConfig::default()
        };
        let result = SyntheticProvider::new(&config, Arc::new(CampaignStore::new()));
        assert!(matches!(result, Err(PilotError::Config(_))));
    }
}
