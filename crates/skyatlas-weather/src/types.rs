use serde::{Deserialize, Serialize};

/// Current weather as OpenWeatherMap returns it (`/data/2.5/weather`).
///
/// Everything is optional: error bodies carry only `cod` and `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeatherResponse {
    /// 200 on success; arrives as a number or a string depending on the error path.
    #[serde(default)]
    pub cod: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub weather: Vec<ConditionEntry>,
    #[serde(default)]
    pub wind: Option<WindReadings>,
    #[serde(default)]
    pub sys: Option<SysInfo>,
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub clouds: Option<CloudCover>,
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub coord: Option<Coord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionEntry {
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindReadings {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SysInfo {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudCover {
    pub all: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Coord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl CurrentWeatherResponse {
    /// Provider status code from `cod`, if it is present and numeric.
    pub fn status_code(&self) -> Option<u16> {
        match self.cod.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code() == Some(200)
    }

    /// Provider-supplied failure text.
    pub fn error_message(&self) -> Option<String> {
        match self.message.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// Canonical metric weather for the current city.
///
/// Fields stay `None` until a fetch supplies them; a later fetch only
/// overwrites the fields its payload carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// °C
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,

    pub description: Option<String>,
    pub icon: Option<String>,

    /// Percent
    pub humidity: Option<f64>,
    /// hPa
    pub pressure: Option<f64>,

    /// m/s
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<f64>,

    pub city: Option<String>,
    pub country: Option<String>,

    /// Unix seconds
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    /// Seconds east of UTC
    pub timezone_offset: Option<i64>,

    /// Meters
    pub visibility: Option<f64>,
    /// Percent
    pub cloud_cover: Option<f64>,
    /// Unix seconds
    pub observed_at: Option<i64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl WeatherSnapshot {
    /// Map a provider payload into canonical fields.
    pub fn from_response(response: &CurrentWeatherResponse) -> Self {
        let main = response.main.clone().unwrap_or_default();
        let condition = response.weather.first().cloned().unwrap_or_default();
        let wind = response.wind.clone().unwrap_or_default();
        let sys = response.sys.clone().unwrap_or_default();
        let coord = response.coord.clone().unwrap_or_default();

        Self {
            temperature: main.temp,
            feels_like: main.feels_like,
            high: main.temp_max,
            low: main.temp_min,
            description: condition.description,
            icon: condition.icon,
            humidity: main.humidity,
            pressure: main.pressure,
            wind_speed: wind.speed,
            wind_deg: wind.deg,
            city: response.name.clone(),
            country: sys.country,
            sunrise: sys.sunrise,
            sunset: sys.sunset,
            timezone_offset: response.timezone,
            visibility: response.visibility,
            cloud_cover: response.clouds.as_ref().and_then(|c| c.all),
            observed_at: response.dt,
            lat: coord.lat,
            lon: coord.lon,
        }
    }

    /// Overwrite every field that `update` carries; keep the rest.
    pub fn merge(&mut self, update: WeatherSnapshot) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.temperature, update.temperature);
        take(&mut self.feels_like, update.feels_like);
        take(&mut self.high, update.high);
        take(&mut self.low, update.low);
        take(&mut self.description, update.description);
        take(&mut self.icon, update.icon);
        take(&mut self.humidity, update.humidity);
        take(&mut self.pressure, update.pressure);
        take(&mut self.wind_speed, update.wind_speed);
        take(&mut self.wind_deg, update.wind_deg);
        take(&mut self.city, update.city);
        take(&mut self.country, update.country);
        take(&mut self.sunrise, update.sunrise);
        take(&mut self.sunset, update.sunset);
        take(&mut self.timezone_offset, update.timezone_offset);
        take(&mut self.visibility, update.visibility);
        take(&mut self.cloud_cover, update.cloud_cover);
        take(&mut self.observed_at, update.observed_at);
        take(&mut self.lat, update.lat);
        take(&mut self.lon, update.lon);
    }

    pub fn condition(&self) -> WeatherCondition {
        self.description
            .as_deref()
            .map(WeatherCondition::from_description)
            .unwrap_or_default()
    }
}

/// Broad condition category derived from the provider's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Fog,
    #[default]
    Other,
}

impl WeatherCondition {
    /// Classify a free-text description such as `"light rain"`.
    ///
    /// Checks run in a fixed order, so `"thunderstorm with rain"` is `Rain`.
    pub fn from_description(description: &str) -> Self {
        let desc = description.to_lowercase();
        if desc.contains("clear") {
            Self::Clear
        } else if desc.contains("cloud") {
            Self::Clouds
        } else if desc.contains("rain") {
            Self::Rain
        } else if desc.contains("thunder") {
            Self::Thunderstorm
        } else if desc.contains("snow") {
            Self::Snow
        } else if desc.contains("mist") || desc.contains("fog") || desc.contains("haze") {
            Self::Fog
        } else {
            Self::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Cloudy",
            Self::Rain => "Rain",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
            Self::Other => "Other",
        }
    }
}
