use thiserror::Error;

pub type PilotResult<T> = Result<T, PilotError>;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PilotError {
    pub fn product_not_found(id: u32) -> Self {
        Self::NotFound {
            entity: "product",
            id: id.to_string(),
        }
    }

    pub fn campaign_not_found(id: &str) -> Self {
        Self::NotFound {
            entity: "campaign",
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_error",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl From<config::ConfigError> for PilotError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
