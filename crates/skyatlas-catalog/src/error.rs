//! Catalog-specific error types.

use skyatlas_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// A record lacks the fields needed for its identity key.
    #[error("Invalid city record: {0}")]
    InvalidRecord(String),

    #[error("Catalog API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected catalog response: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.into_network_error())
    }
}

impl CatalogError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRecord(_) => "Skipped an incomplete city record".to_string(),
            Self::ApiError { status, .. } if *status >= 500 => {
                "The city catalog is unavailable. Please try again later.".to_string()
            }
            Self::ApiError { message, .. } => format!("City catalog error: {}", message),
            Self::Parse(_) => "The city catalog sent an unexpected response.".to_string(),
            Self::Network(e) => e.user_message().to_string(),
        }
    }

    /// Whether re-invoking the failed operation can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidRecord(_) | Self::Parse(_) => false,
        }
    }
}
