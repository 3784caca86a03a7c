//! Session journal — what a pipeline run did, stage by stage.

use crate::evaluator::{Decision, LifecycleAction};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pilot_core::numeric::round2;
use pilot_core::types::Campaign;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Create,
    Analyze,
    Decide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEvent {
    pub stage: Stage,
    pub campaign_id: Option<String>,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionCounts {
    #[serde(rename = "CONTINUE")]
    pub continue_: u32,
    #[serde(rename = "OPTIMIZE")]
    pub optimize: u32,
    #[serde(rename = "PAUSE")]
    pub pause: u32,
}

impl DecisionCounts {
    fn record(&mut self, action: LifecycleAction) {
        match action {
            LifecycleAction::Continue => self.continue_ += 1,
            LifecycleAction::Optimize => self.optimize += 1,
            LifecycleAction::Pause => self.pause += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.continue_ + self.optimize + self.pause
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub campaigns_created: u32,
    pub campaigns_paused: u32,
    pub decisions: DecisionCounts,
    pub total_budget: f64,
    pub events: Vec<JournalEvent>,
}

#[derive(Default)]
struct JournalState {
    campaigns_created: u32,
    campaigns_paused: u32,
    decisions: DecisionCounts,
    total_budget: f64,
    events: Vec<JournalEvent>,
}

pub struct SessionJournal {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    state: Mutex<JournalState>,
}

impl SessionJournal {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: Mutex::new(JournalState::default()),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn note(&self, stage: Stage, campaign_id: Option<&str>, message: impl Into<String>) {
        self.state.lock().events.push(JournalEvent {
            stage,
            campaign_id: campaign_id.map(str::to_string),
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn record_created(&self, campaign: &Campaign) {
        {
            let mut state = self.state.lock();
            state.campaigns_created += 1;
            state.total_budget += campaign.budget;
        }
        self.note(
            Stage::Create,
            Some(&campaign.campaign_id),
            format!(
                "created '{}' for product {} with budget {:.2} over {} days",
                campaign.campaign_name, campaign.product_id, campaign.budget, campaign.duration_days
            ),
        );
    }

    pub fn record_decision(&self, decision: &Decision) {
        self.state.lock().decisions.record(decision.action);
        self.note(
            Stage::Decide,
            Some(&decision.campaign_id),
            format!("{}: {}", decision.action, decision.rationale),
        );
    }

    pub fn record_paused(&self, campaign_id: &str) {
        self.state.lock().campaigns_paused += 1;
        self.note(Stage::Decide, Some(campaign_id), "paused");
    }

    pub fn summary(&self) -> SessionSummary {
        let state = self.state.lock();
        let finished_at = Utc::now();
        SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            finished_at,
            duration_ms: (finished_at - self.started_at).num_milliseconds(),
            campaigns_created: state.campaigns_created,
            campaigns_paused: state.campaigns_paused,
            decisions: state.decisions,
            total_budget: round2(state.total_budget),
            events: state.events.clone(),
        }
    }
}

impl Default for SessionJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{LifecycleEvaluator, PerformanceDeltas};
    use pilot_core::types::{CampaignBaseline, CampaignMetrics, CampaignStatus};

    fn campaign(id: &str, budget: f64) -> Campaign {
        let now = Utc::now();
        Campaign {
            campaign_id: id.to_string(),
            product_id: 101,
            campaign_name: "Spring push".to_string(),
            status: CampaignStatus::Active,
            budget,
            duration_days: 7,
            campaign_copy: String::new(),
            created_at: now,
            start_date: now,
            end_date: now,
            baseline: CampaignBaseline {
                page_views: 100,
                sales: 10,
                revenue: 250.0,
                captured_at: now,
            },
            metrics: CampaignMetrics::default(),
        }
    }

    #[test]
    fn test_counts_and_budget() {
        let journal = SessionJournal::new();
        journal.record_created(&campaign("camp_a", 20.0));
        journal.record_created(&campaign("camp_b", 12.5));

        let evaluator = LifecycleEvaluator::default();
        let pause = evaluator
            .evaluate("camp_a", &PerformanceDeltas::new(-20.0, 0.0))
            .unwrap();
        let keep = evaluator
            .evaluate("camp_b", &PerformanceDeltas::new(20.0, 15.0))
            .unwrap();
        journal.record_decision(&pause);
        journal.record_decision(&keep);
        journal.record_paused("camp_a");

        let summary = journal.summary();
        assert_eq!(summary.session_id, journal.session_id());
        assert_eq!(summary.campaigns_created, 2);
        assert_eq!(summary.campaigns_paused, 1);
        assert!((summary.total_budget - 32.5).abs() < 1e-9);
        assert_eq!(summary.decisions.pause, 1);
        assert_eq!(summary.decisions.continue_, 1);
        assert_eq!(summary.decisions.total(), 2);
        assert_eq!(summary.events.len(), 5);
        assert_eq!(summary.events[0].stage, Stage::Create);
        assert!(summary.events[2].message.starts_with("PAUSE: "));
        assert!(summary.duration_ms >= 0);
    }

    #[test]
    fn test_decision_counts_serialize_by_action_name() {
        let json = serde_json::to_value(DecisionCounts {
            continue_: 1,
            optimize: 2,
            pause: 3,
        })
        .unwrap();
        assert_eq!(json["CONTINUE"], 1);
        assert_eq!(json["OPTIMIZE"], 2);
        assert_eq!(json["PAUSE"], 3);
    }
}
