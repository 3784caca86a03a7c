//! Mock store and ad-platform backend — products, campaigns, synthetic metrics.
//!
//! Provides the REST endpoints the campaign pipeline talks to.
//! State lives in an in-memory store owned by the server; nothing is persisted.

pub mod handlers;
pub mod models;
pub mod provider;
pub mod router;
pub mod store;

pub use handlers::MockApiState;
pub use provider::SyntheticProvider;
pub use router::mock_api_router;
pub use store::CampaignStore;
