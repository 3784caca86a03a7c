//! Campaign lifecycle evaluator — turns performance deltas into CONTINUE / OPTIMIZE / PAUSE.
//!
//! Rules are checked in order and the first match wins:
//!
//! 1. ROAS below zero, or CPA strictly above `cpa_pause_threshold` → PAUSE
//! 2. sales change `< decline_sales_percent` or views change `< decline_views_percent` → PAUSE
//! 3. sales change `> growth_sales_percent` and views change `> growth_views_percent` → CONTINUE
//! 4. sales change in `[moderate_floor, growth_sales]` or views change in
//!    `[moderate_floor, growth_views]` → OPTIMIZE
//! 5. anything else → OPTIMIZE
//!
//! All comparisons against a threshold are strict and the moderate bands are
//! closed, so a value sitting exactly on a threshold always lands in the
//! softer bucket (exactly 15% sales growth is moderate, exactly -10% is not a decline).

use chrono::{DateTime, Utc};
use pilot_core::config::LifecycleConfig;
use pilot_core::types::CampaignStatus;
use pilot_core::{PilotError, PilotResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleAction {
    Continue,
    Optimize,
    Pause,
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => f.write_str("CONTINUE"),
            Self::Optimize => f.write_str("OPTIMIZE"),
            Self::Pause => f.write_str("PAUSE"),
        }
    }
}

/// Which rule of the policy produced a decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    LossOrExcessiveCpa,
    SignificantDecline,
    StrongGrowth,
    ModerateGrowth,
    InsufficientSignal,
}

impl DecisionRule {
    pub fn action(self) -> LifecycleAction {
        match self {
            Self::LossOrExcessiveCpa | Self::SignificantDecline => LifecycleAction::Pause,
            Self::StrongGrowth => LifecycleAction::Continue,
            Self::ModerateGrowth | Self::InsufficientSignal => LifecycleAction::Optimize,
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Self::LossOrExcessiveCpa => "negative return or excessive acquisition cost",
            Self::SignificantDecline => "significant decline in sales or views",
            Self::StrongGrowth => "strong dual growth in sales and views",
            Self::ModerateGrowth => "moderate growth, needs budget/targeting tuning",
            Self::InsufficientSignal => "insufficient signal to continue or pause confidently",
        }
    }
}

/// Evaluator input. Sales and views changes are required; ROAS and CPA are optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceDeltas {
    pub sales_change_percent: Option<f64>,
    pub views_change_percent: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
}

impl PerformanceDeltas {
    pub fn new(sales_change_percent: f64, views_change_percent: f64) -> Self {
        Self {
            sales_change_percent: Some(sales_change_percent),
            views_change_percent: Some(views_change_percent),
            roas: None,
            cpa: None,
        }
    }

    pub fn with_roas(mut self, roas: f64) -> Self {
        self.roas = Some(roas);
        self
    }

    pub fn with_cpa(mut self, cpa: f64) -> Self {
        self.cpa = Some(cpa);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub campaign_id: String,
    pub action: LifecycleAction,
    pub rule: DecisionRule,
    pub sales_change_percent: f64,
    pub views_change_percent: f64,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
    pub rationale: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Status change the actuator should apply for a decision, if any.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Pause,
}

impl Decision {
    /// Only PAUSE on an active campaign moves it. The evaluator never resumes,
    /// and CONTINUE / OPTIMIZE leave the status alone.
    pub fn transition_from(&self, status: CampaignStatus) -> Option<Transition> {
        match (self.action, status) {
            (LifecycleAction::Pause, CampaignStatus::Active) => Some(Transition::Pause),
            _ => None,
        }
    }
}

pub struct LifecycleEvaluator {
    config: LifecycleConfig,
}

impl LifecycleEvaluator {
    pub fn new(config: LifecycleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn evaluate(&self, campaign_id: &str, deltas: &PerformanceDeltas) -> PilotResult<Decision> {
        let sales = required(deltas.sales_change_percent, "sales_change_percent", campaign_id)?;
        let views = required(deltas.views_change_percent, "views_change_percent", campaign_id)?;
        let roas = optional(deltas.roas, "roas", campaign_id)?;
        let cpa = optional(deltas.cpa, "cpa", campaign_id)?;

        let rule = self.classify(sales, views, roas, cpa);
        let rationale = self.rationale(rule, sales, views, roas, cpa);

        Ok(Decision {
            campaign_id: campaign_id.to_string(),
            action: rule.action(),
            rule,
            sales_change_percent: sales,
            views_change_percent: views,
            roas,
            cpa,
            rationale,
            evaluated_at: Utc::now(),
        })
    }

    fn classify(&self, sales: f64, views: f64, roas: Option<f64>, cpa: Option<f64>) -> DecisionRule {
        let c = &self.config;

        let losing = roas.is_some_and(|r| r < 0.0);
        let expensive = cpa.is_some_and(|v| v > c.cpa_pause_threshold);
        if losing || expensive {
            return DecisionRule::LossOrExcessiveCpa;
        }

        if sales < c.decline_sales_percent || views < c.decline_views_percent {
            return DecisionRule::SignificantDecline;
        }

        if sales > c.growth_sales_percent && views > c.growth_views_percent {
            return DecisionRule::StrongGrowth;
        }

        let moderate_sales = (c.moderate_floor_percent..=c.growth_sales_percent).contains(&sales);
        let moderate_views = (c.moderate_floor_percent..=c.growth_views_percent).contains(&views);
        if moderate_sales || moderate_views {
            return DecisionRule::ModerateGrowth;
        }

        DecisionRule::InsufficientSignal
    }

    fn rationale(&self, rule: DecisionRule, sales: f64, views: f64, roas: Option<f64>, cpa: Option<f64>) -> String {
        let c = &self.config;
        let detail = match rule {
            DecisionRule::LossOrExcessiveCpa => format!(
                "ROAS {}, CPA {} against limit {:.2}; sales {:+.2}%, views {:+.2}%",
                fmt_opt(roas),
                fmt_opt(cpa),
                c.cpa_pause_threshold,
                sales,
                views
            ),
            DecisionRule::SignificantDecline => format!(
                "sales {:+.2}% (floor {:+.2}%), views {:+.2}% (floor {:+.2}%)",
                sales, c.decline_sales_percent, views, c.decline_views_percent
            ),
            DecisionRule::StrongGrowth => format!(
                "sales {:+.2}% > {:+.2}% and views {:+.2}% > {:+.2}%",
                sales, c.growth_sales_percent, views, c.growth_views_percent
            ),
            DecisionRule::ModerateGrowth | DecisionRule::InsufficientSignal => format!(
                "sales {:+.2}%, views {:+.2}%, ROAS {}",
                sales,
                views,
                fmt_opt(roas)
            ),
        };
        format!("{}: {}", rule.summary(), detail)
    }
}

impl Default for LifecycleEvaluator {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

fn required(value: Option<f64>, field: &str, campaign_id: &str) -> PilotResult<f64> {
    optional(value, field, campaign_id)?.ok_or_else(|| {
        PilotError::Validation(format!("campaign {campaign_id}: missing required metric '{field}'"))
    })
}

fn optional(value: Option<f64>, field: &str, campaign_id: &str) -> PilotResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => Err(PilotError::Validation(format!(
            "campaign {campaign_id}: metric '{field}' is not a finite number"
        ))),
        other => Ok(other),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}
