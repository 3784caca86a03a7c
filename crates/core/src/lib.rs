pub mod config;
pub mod error;
pub mod numeric;
pub mod types;

pub use config::AppConfig;
pub use error::{PilotError, PilotResult};
