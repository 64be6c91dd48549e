//! Display-ready weather.
//!
//! [`to_display`] turns the canonical snapshot into a fully populated card,
//! filling placeholders for anything the provider did not send and
//! remembering which fields those were.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::types::{WeatherCondition, WeatherSnapshot};
use crate::units::{to_temperature, to_wind, TemperatureUnit, WindSpeedUnit};

pub const UNKNOWN_CITY: &str = "Unknown";
pub const UNKNOWN_COUNTRY: &str = "N/A";
pub const DEFAULT_ICON: &str = "01d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayField {
    Name,
    Country,
    Temperature,
    FeelsLike,
    High,
    Low,
    Description,
    Icon,
    Humidity,
    Pressure,
    WindSpeed,
    WindDeg,
    Sunrise,
    Sunset,
    TimezoneOffset,
    Visibility,
    CloudCover,
    ObservedAt,
    Lat,
    Lon,
}

/// Weather card contents. Values are metric; see [`DisplayWeather::readout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayWeather {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub high: f64,
    pub low: f64,
    pub description: String,
    pub icon: String,
    pub condition: WeatherCondition,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub sunrise: i64,
    pub sunset: i64,
    pub timezone_offset: i64,
    pub visibility: f64,
    pub cloud_cover: f64,
    pub observed_at: i64,
    pub lat: f64,
    pub lon: f64,
    /// Fields whose value is a placeholder rather than provider data.
    pub placeholders: BTreeSet<DisplayField>,
}

/// Unit-converted numbers for one render of the card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayReadout {
    pub temperature: f64,
    pub feels_like: f64,
    pub high: f64,
    pub low: f64,
    pub wind_speed: f64,
    pub temperature_unit: TemperatureUnit,
    pub wind_unit: WindSpeedUnit,
}

impl DisplayReadout {
    pub fn temperature_symbol(&self) -> &'static str {
        self.temperature_unit.symbol()
    }

    pub fn wind_symbol(&self) -> &'static str {
        self.wind_unit.symbol()
    }
}

/// Collects placeholder fields while filling values.
struct Filler {
    placeholders: BTreeSet<DisplayField>,
}

impl Filler {
    fn or<T>(&mut self, field: DisplayField, value: Option<T>, placeholder: T) -> T {
        value.unwrap_or_else(|| {
            self.placeholders.insert(field);
            placeholder
        })
    }

    fn text(&mut self, field: DisplayField, value: Option<&String>, placeholder: &str) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v.clone(),
            _ => {
                self.placeholders.insert(field);
                placeholder.to_string()
            }
        }
    }
}

pub fn to_display(snapshot: &WeatherSnapshot) -> DisplayWeather {
    use DisplayField as F;

    let mut fill = Filler {
        placeholders: BTreeSet::new(),
    };

    let temperature = fill.or(F::Temperature, snapshot.temperature, 0.0);
    // Secondary temperatures fall back to the current reading.
    let feels_like = fill.or(F::FeelsLike, snapshot.feels_like, temperature);
    let high = fill.or(F::High, snapshot.high, temperature);
    let low = fill.or(F::Low, snapshot.low, temperature);

    DisplayWeather {
        name: fill.text(F::Name, snapshot.city.as_ref(), UNKNOWN_CITY),
        country: fill.text(F::Country, snapshot.country.as_ref(), UNKNOWN_COUNTRY),
        temperature,
        feels_like,
        high,
        low,
        description: fill.text(F::Description, snapshot.description.as_ref(), ""),
        icon: fill.text(F::Icon, snapshot.icon.as_ref(), DEFAULT_ICON),
        condition: snapshot.condition(),
        humidity: fill.or(F::Humidity, snapshot.humidity, 0.0),
        pressure: fill.or(F::Pressure, snapshot.pressure, 0.0),
        wind_speed: fill.or(F::WindSpeed, snapshot.wind_speed, 0.0),
        wind_deg: fill.or(F::WindDeg, snapshot.wind_deg, 0.0),
        sunrise: fill.or(F::Sunrise, snapshot.sunrise, 0),
        sunset: fill.or(F::Sunset, snapshot.sunset, 0),
        timezone_offset: fill.or(F::TimezoneOffset, snapshot.timezone_offset, 0),
        visibility: fill.or(F::Visibility, snapshot.visibility, 0.0),
        cloud_cover: fill.or(F::CloudCover, snapshot.cloud_cover, 0.0),
        observed_at: fill.or(F::ObservedAt, snapshot.observed_at, 0),
        lat: fill.or(F::Lat, snapshot.lat, 0.0),
        lon: fill.or(F::Lon, snapshot.lon, 0.0),
        placeholders: fill.placeholders,
    }
}

impl DisplayWeather {
    pub fn is_placeholder(&self, field: DisplayField) -> bool {
        self.placeholders.contains(&field)
    }

    /// Convert the temperatures and wind speed for display. No rounding.
    pub fn readout(&self, temperature_unit: TemperatureUnit, wind_unit: WindSpeedUnit) -> DisplayReadout {
        DisplayReadout {
            temperature: to_temperature(self.temperature, temperature_unit),
            feels_like: to_temperature(self.feels_like, temperature_unit),
            high: to_temperature(self.high, temperature_unit),
            low: to_temperature(self.low, temperature_unit),
            wind_speed: to_wind(self.wind_speed, wind_unit),
            temperature_unit,
            wind_unit,
        }
    }

    /// Wall-clock time at the city for a Unix timestamp, as `HH:MM`.
    pub fn local_time(&self, epoch_secs: i64) -> Option<String> {
        let offset = i32::try_from(self.timezone_offset)
            .ok()
            .and_then(FixedOffset::east_opt)?;
        let utc = DateTime::from_timestamp(epoch_secs, 0)?;
        Some(utc.with_timezone(&offset).format("%H:%M").to_string())
    }

    /// `None` when the provider sent no sunrise.
    pub fn sunrise_local(&self) -> Option<String> {
        self.timestamp_local(DisplayField::Sunrise, self.sunrise)
    }

    pub fn sunset_local(&self) -> Option<String> {
        self.timestamp_local(DisplayField::Sunset, self.sunset)
    }

    pub fn observed_local(&self) -> Option<String> {
        self.timestamp_local(DisplayField::ObservedAt, self.observed_at)
    }

    fn timestamp_local(&self, field: DisplayField, epoch_secs: i64) -> Option<String> {
        if self.is_placeholder(field) {
            return None;
        }
        self.local_time(epoch_secs)
    }
}
