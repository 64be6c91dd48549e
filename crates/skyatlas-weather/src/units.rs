//! Display unit conversion.
//!
//! The snapshot always stores metric values; these functions derive the
//! numbers a view shows. No rounding happens here.

pub use skyatlas_core::{TemperatureUnit, WindSpeedUnit};

/// Miles per hour in one meter per second, as the weather card uses it.
pub const MPH_PER_MPS: f64 = 2.237;

/// Kilometers per hour in one meter per second.
pub const KPH_PER_MPS: f64 = 3.6;

pub fn to_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        TemperatureUnit::Kelvin => celsius + 273.15,
    }
}

pub fn to_wind(meters_per_second: f64, unit: WindSpeedUnit) -> f64 {
    match unit {
        WindSpeedUnit::MetersPerSecond => meters_per_second,
        WindSpeedUnit::KilometersPerHour => meters_per_second * KPH_PER_MPS,
        WindSpeedUnit::MilesPerHour => meters_per_second * MPH_PER_MPS,
    }
}
