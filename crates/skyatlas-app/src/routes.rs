//! Weather detail route.
//!
//! A city is addressed as `/weather/{percent-encoded name}`. The detail view
//! fetches once when it is first shown and again each time the routed name
//! changes; re-showing the same name does nothing.

use std::sync::Arc;

use skyatlas_core::DisplayConfig;
use skyatlas_weather::{
    to_display, DisplayReadout, DisplayWeather, FetchOutcome, FetchStatus, WeatherError,
    WeatherSnapshotStore,
};
use thiserror::Error;

pub const WEATHER_ROUTE_PREFIX: &str = "/weather/";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    #[error("not a weather route: {0}")]
    NotADetailPath(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl RouteError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotADetailPath(_) => "That page does not exist.".to_string(),
            Self::Weather(e) => e.user_message(),
        }
    }
}

/// Detail route for a city name.
pub fn detail_path(name: &str) -> String {
    format!("{}{}", WEATHER_ROUTE_PREFIX, urlencoding::encode(name))
}

/// City name from a detail route, or `None` if `path` is not one.
pub fn parse_detail_path(path: &str) -> Option<String> {
    let encoded = path.strip_prefix(WEATHER_ROUTE_PREFIX)?;
    let encoded = encoded.trim_end_matches('/');
    if encoded.is_empty() || encoded.contains('/') {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|name| name.into_owned())
}

/// The weather page for one routed city.
pub struct DetailView {
    weather: Arc<WeatherSnapshotStore>,
    routed: Option<String>,
}

impl DetailView {
    pub fn new(weather: Arc<WeatherSnapshotStore>) -> Self {
        Self {
            weather,
            routed: None,
        }
    }

    /// Show the view for `path`.
    ///
    /// Fetches when the view is first shown or the routed name differs from
    /// the last one; returns `Ok(None)` when nothing was fetched.
    pub async fn show(&mut self, path: &str) -> Result<Option<FetchOutcome>, RouteError> {
        let name =
            parse_detail_path(path).ok_or_else(|| RouteError::NotADetailPath(path.to_string()))?;

        if self.routed.as_deref() == Some(name.as_str()) {
            tracing::debug!("Route unchanged ({}), not refetching", name);
            return Ok(None);
        }

        tracing::info!("Showing weather for {}", name);
        self.routed = Some(name.clone());
        let outcome = self.weather.fetch_weather(&name).await?;
        Ok(Some(outcome))
    }

    pub fn routed_city(&self) -> Option<&str> {
        self.routed.as_deref()
    }

    pub fn status(&self) -> FetchStatus {
        self.weather.status()
    }

    /// Card contents and converted numbers, once any weather has loaded.
    pub fn card(&self, units: DisplayConfig) -> Option<(DisplayWeather, DisplayReadout)> {
        let display = to_display(&self.weather.snapshot()?);
        let readout = display.readout(units.temperature_unit, units.wind_unit);
        Some((display, readout))
    }
}
