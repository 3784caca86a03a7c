pub mod backend;
pub mod client;
pub mod evaluator;
pub mod journal;
pub mod pipeline;
pub mod screening;

pub use backend::CampaignBackend;
pub use client::HttpBackend;
pub use evaluator::{Decision, LifecycleAction, LifecycleEvaluator, PerformanceDeltas};
pub use journal::{SessionJournal, SessionSummary};
pub use pipeline::{plan_campaigns, run_pipeline, Pipeline, PipelineReport};
pub use screening::underperformers;
