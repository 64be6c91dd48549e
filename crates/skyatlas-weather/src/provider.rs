//! OpenWeatherMap current-weather client.

use std::time::Duration;

use async_trait::async_trait;
use skyatlas_core::WeatherConfig;
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{CurrentWeatherResponse, WeatherSnapshot};

/// Message used when the provider reports a failure without one.
const DEFAULT_FAILURE_MESSAGE: &str = "Weather fetch failed";

/// Where the snapshot store gets its weather from.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current conditions for `city`, mapped into canonical metric fields.
    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        if !config.has_api_key() {
            tracing::warn!("No weather API key configured; requests will be rejected");
        }
        Self::new(
            &config.base_url,
            config.api_key.as_deref().unwrap_or_default(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn weather_url(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url)
    }
}

/// Turn a non-200 `cod` into a provider failure.
fn provider_failure(body: &CurrentWeatherResponse, fallback_code: u16) -> WeatherError {
    WeatherError::Provider {
        code: body.status_code().unwrap_or(fallback_code),
        message: body
            .error_message()
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let response = self
            .client
            .get(self.weather_url())
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Weather request for {:?} failed with HTTP {}", city, status);
            return Err(match serde_json::from_str::<CurrentWeatherResponse>(&text) {
                Ok(body) if body.error_message().is_some() => provider_failure(&body, status.as_u16()),
                _ => WeatherError::Provider {
                    code: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                        .to_string(),
                },
            });
        }

        let body: CurrentWeatherResponse = serde_json::from_str(&text)
            .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))?;

        if !body.is_success() {
            return Err(provider_failure(&body, status.as_u16()));
        }

        tracing::debug!("Weather received for {:?}", body.name);
        Ok(WeatherSnapshot::from_response(&body))
    }
}
