//! Campaign pipeline: create → analyze → decide.
//!
//! The stages run strictly in sequence against a [`CampaignBackend`]. A stage
//! failure aborts the run and is returned to the caller as-is.

use crate::backend::CampaignBackend;
use crate::evaluator::{Decision, LifecycleEvaluator, PerformanceDeltas, Transition};
use crate::journal::{SessionJournal, SessionSummary, Stage};
use crate::screening::underperformers;
use pilot_core::config::{AppConfig, LifecycleConfig, PipelineConfig};
use pilot_core::numeric::round2;
use pilot_core::types::{Campaign, CampaignStatus, CreateCampaignRequest, Product};
use pilot_core::PilotResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

// ─── Create ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPlan {
    pub product_id: u32,
    pub campaign_name: String,
    pub budget: f64,
    pub duration_days: u32,
    pub campaign_copy: String,
}

impl From<CampaignPlan> for CreateCampaignRequest {
    fn from(plan: CampaignPlan) -> Self {
        Self {
            product_id: Some(plan.product_id),
            campaign_name: Some(plan.campaign_name),
            budget: Some(plan.budget),
            duration_days: Some(plan.duration_days),
            campaign_copy: Some(plan.campaign_copy),
        }
    }
}

/// Pick the products worth promoting and size a budget for each.
///
/// Products must have more than `min_stock` units on hand. The most expensive
/// go first (page views break ties), and the budget is a fraction of the unit
/// price clamped to `[min_budget, max_budget]`.
pub fn plan_campaigns(products: &[Product], config: &PipelineConfig) -> Vec<CampaignPlan> {
    let mut candidates: Vec<&Product> = products.iter().filter(|p| p.stock > config.min_stock).collect();
    candidates.sort_by(|a, b| {
        b.price
            .partial_cmp(&a.price)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.page_views.cmp(&a.page_views))
    });

    candidates
        .into_iter()
        .take(config.max_campaigns)
        .map(|p| {
            let budget = round2(p.price * config.budget_price_ratio)
                .max(config.min_budget)
                .min(config.max_budget);
            CampaignPlan {
                product_id: p.id,
                campaign_name: format!("{} Spotlight", p.name),
                budget,
                duration_days: config.duration_days,
                campaign_copy: format!(
                    "{} from our {} range, now at ${:.2}. Limited stock, order today!",
                    p.name, p.category, p.price
                ),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOutcome {
    /// Products drawing traffic without converting, by id.
    pub underperformers: Vec<u32>,
    pub plans: Vec<CampaignPlan>,
    pub campaigns: Vec<Campaign>,
}

// ─── Analyze ───────────────────────────────────────────────────────────────

/// Percent change from `baseline` to `current`, rounded to two places.
/// A zero baseline yields 0 when nothing moved and 100 otherwise.
pub fn percent_change(current: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        return if current == 0.0 { 0.0 } else { 100.0 };
    }
    round2((current - baseline) / baseline * 100.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignAnalysis {
    pub campaign_id: String,
    pub product_id: u32,
    pub status: CampaignStatus,
    pub baseline_page_views: u64,
    pub current_page_views: u64,
    pub baseline_sales: u64,
    pub current_sales: u64,
    pub deltas: PerformanceDeltas,
}

// ─── Decide ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTaken {
    pub campaign_id: String,
    pub transition: Transition,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideOutcome {
    pub decisions: Vec<Decision>,
    pub actions: Vec<ActionTaken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub underperformers: Vec<u32>,
    pub created: Vec<Campaign>,
    pub analyses: Vec<CampaignAnalysis>,
    pub decisions: Vec<Decision>,
    pub actions: Vec<ActionTaken>,
    pub summary: SessionSummary,
}

// ─── Pipeline ──────────────────────────────────────────────────────────────

pub struct Pipeline {
    backend: Arc<dyn CampaignBackend>,
    evaluator: LifecycleEvaluator,
    config: PipelineConfig,
    journal: SessionJournal,
}

impl Pipeline {
    pub fn new(backend: Arc<dyn CampaignBackend>, lifecycle: LifecycleConfig, config: PipelineConfig) -> Self {
        Self {
            backend,
            evaluator: LifecycleEvaluator::new(lifecycle),
            config,
            journal: SessionJournal::new(),
        }
    }

    pub fn journal(&self) -> &SessionJournal {
        &self.journal
    }

    /// Stage 1: screen the catalog, plan campaigns and launch them.
    pub async fn create(&self) -> PilotResult<CreateOutcome> {
        let products = self.backend.list_products().await?;
        let flagged: Vec<u32> = underperformers(&products).iter().map(|p| p.id).collect();
        if !flagged.is_empty() {
            self.journal.note(
                Stage::Create,
                None,
                format!("underperforming products: {flagged:?}"),
            );
        }

        let plans = plan_campaigns(&products, &self.config);
        info!(products = products.len(), planned = plans.len(), "Create stage planned campaigns");

        let mut campaigns = Vec::with_capacity(plans.len());
        for plan in &plans {
            let campaign = self.backend.create_campaign(plan.clone().into()).await?;
            info!(
                campaign_id = %campaign.campaign_id,
                product_id = campaign.product_id,
                budget = campaign.budget,
                "Campaign launched"
            );
            self.journal.record_created(&campaign);
            campaigns.push(campaign);
        }

        Ok(CreateOutcome {
            underperformers: flagged,
            plans,
            campaigns,
        })
    }

    /// Stage 2: compare each campaign's product against the baseline captured at launch.
    pub async fn analyze(&self) -> PilotResult<Vec<CampaignAnalysis>> {
        let campaigns = self.backend.list_campaigns().await?;
        let mut analyses = Vec::with_capacity(campaigns.len());

        for campaign in campaigns {
            let analytics = self.backend.product_analytics(campaign.product_id).await?;
            let current_views = analytics.page_views.current;
            let current_sales = analytics.sales.current;

            let mut deltas = PerformanceDeltas::new(
                percent_change(current_sales as f64, campaign.baseline.sales as f64),
                percent_change(current_views as f64, campaign.baseline.page_views as f64),
            )
            .with_roas(campaign.metrics.roas);
            if let Some(cpa) = campaign.metrics.cpa() {
                deltas = deltas.with_cpa(round2(cpa));
            }

            debug!(
                campaign_id = %campaign.campaign_id,
                sales_change = ?deltas.sales_change_percent,
                views_change = ?deltas.views_change_percent,
                "Campaign analyzed"
            );
            self.journal.note(
                Stage::Analyze,
                Some(&campaign.campaign_id),
                format!(
                    "views {} -> {}, sales {} -> {}",
                    campaign.baseline.page_views, current_views, campaign.baseline.sales, current_sales
                ),
            );

            analyses.push(CampaignAnalysis {
                campaign_id: campaign.campaign_id,
                product_id: campaign.product_id,
                status: campaign.status,
                baseline_page_views: campaign.baseline.page_views,
                current_page_views: current_views,
                baseline_sales: campaign.baseline.sales,
                current_sales,
                deltas,
            });
        }

        Ok(analyses)
    }

    /// Stage 3: evaluate each analysis and pause the active campaigns that should stop.
    /// Nothing is ever resumed here.
    pub async fn decide(&self, analyses: &[CampaignAnalysis]) -> PilotResult<DecideOutcome> {
        let mut decisions = Vec::with_capacity(analyses.len());
        let mut actions = Vec::new();

        for analysis in analyses {
            let decision = self.evaluator.evaluate(&analysis.campaign_id, &analysis.deltas)?;
            metrics::counter!("pipeline.decisions", "action" => decision.action.to_string()).increment(1);
            info!(
                campaign_id = %decision.campaign_id,
                action = %decision.action,
                rationale = %decision.rationale,
                "Lifecycle decision"
            );
            self.journal.record_decision(&decision);

            if let Some(transition) = decision.transition_from(analysis.status) {
                match transition {
                    Transition::Pause => {
                        let updated = self.backend.pause_campaign(&analysis.campaign_id).await?;
                        self.journal.record_paused(&updated.campaign_id);
                        actions.push(ActionTaken {
                            campaign_id: updated.campaign_id,
                            transition,
                            status: updated.status,
                        });
                    }
                }
            }
            decisions.push(decision);
        }

        Ok(DecideOutcome { decisions, actions })
    }

    pub async fn run(&self) -> PilotResult<PipelineReport> {
        info!(session_id = %self.journal.session_id(), "Pipeline run started");
        let created = self.create().await?;
        let analyses = self.analyze().await?;
        let decided = self.decide(&analyses).await?;
        metrics::counter!("pipeline.runs").increment(1);

        let summary = self.journal.summary();
        info!(
            session_id = %summary.session_id,
            created = summary.campaigns_created,
            paused = summary.campaigns_paused,
            duration_ms = summary.duration_ms,
            "Pipeline run finished"
        );

        Ok(PipelineReport {
            underperformers: created.underperformers,
            created: created.campaigns,
            analyses,
            decisions: decided.decisions,
            actions: decided.actions,
            summary,
        })
    }
}

/// One full create → analyze → decide pass with the lifecycle and pipeline settings from `config`.
pub async fn run_pipeline(backend: Arc<dyn CampaignBackend>, config: &AppConfig) -> PilotResult<PipelineReport> {
    Pipeline::new(backend, config.lifecycle.clone(), config.pipeline.clone())
        .run()
        .await
}
