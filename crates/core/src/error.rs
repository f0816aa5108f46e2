use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Invalid {kind} filter: {value:?}")]
    InvalidFilter { kind: &'static str, value: String },

    #[error("Invalid creative record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CampaignError {
    pub fn invalid_filter(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFilter {
            kind,
            value: value.into(),
        }
    }

    pub fn is_invalid_filter(&self) -> bool {
        matches!(self, Self::InvalidFilter { .. })
    }
}
