//! Weather-specific error types.

use skyatlas_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WeatherError {
    #[error("empty city name")]
    EmptyCityName,

    /// The provider answered with a failure code; `message` is shown verbatim.
    #[error("{message}")]
    Provider { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.into_network_error())
    }
}

impl WeatherError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCityName => "Enter a city name to see its weather.".to_string(),
            Self::Provider { code: 401, .. } => {
                "Weather API key is invalid. Check settings.".to_string()
            }
            Self::Provider { message, .. } => format!("Weather unavailable: {}", message),
            Self::Network(e) => e.user_message().to_string(),
            Self::Parse(_) => "Weather service sent an unexpected response.".to_string(),
        }
    }

    /// Provider and network failures can be retried by fetching again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Network(_))
    }
}
