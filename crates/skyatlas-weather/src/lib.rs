//! Weather service for SkyAtlas
//!
//! Fetches current conditions from OpenWeatherMap by city name, keeps one
//! canonical metric snapshot, and renders unit-converted display views of it.

pub mod error;
pub mod provider;
pub mod store;
pub mod types;
pub mod units;
pub mod view;

pub use error::WeatherError;
pub use provider::{WeatherProvider, WeatherSource};
pub use store::{FetchOutcome, FetchStatus, WeatherEvent, WeatherSnapshotStore};
pub use types::*;
pub use units::{to_temperature, to_wind, TemperatureUnit, WindSpeedUnit};
pub use view::{to_display, DisplayField, DisplayReadout, DisplayWeather};
