use thiserror::Error;

use crate::models::Provider;

pub type Result<T> = std::result::Result<T, StudyError>;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("no API key configured for {provider}")]
    MissingCredential { provider: Provider },

    #[error("{provider} API returned HTTP {status}: {body}")]
    ProviderHttp {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StudyError {
    /// HTTP status carried by a provider failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StudyError::ProviderHttp { status, .. } => Some(*status),
            StudyError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
