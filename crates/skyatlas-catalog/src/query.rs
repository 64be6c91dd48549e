//! Search, filter and sort over loaded cities.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::text::locale_cmp;
use crate::types::CityRecord;

/// Column a city table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Name,
    Country,
    Timezone,
    Population,
    Latitude,
    Longitude,
}

impl SortKey {
    fn compare(&self, a: &CityRecord, b: &CityRecord) -> Ordering {
        match self {
            Self::Id => locale_cmp(&a.id, &b.id),
            Self::Name => locale_cmp(&a.name, &b.name),
            Self::Country => locale_cmp(&a.country, &b.country),
            Self::Timezone => locale_cmp(&a.timezone, &b.timezone),
            Self::Population => a.population.cmp(&b.population),
            Self::Latitude => a.lat.total_cmp(&b.lat),
            Self::Longitude => a.lon.total_cmp(&b.lon),
        }
    }
}

impl FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" | "city" => Ok(Self::Name),
            "country" => Ok(Self::Country),
            "timezone" | "tz" => Ok(Self::Timezone),
            "population" | "pop" => Ok(Self::Population),
            "lat" | "latitude" => Ok(Self::Latitude),
            "lon" | "longitude" => Ok(Self::Longitude),
            other => Err(CatalogError::Parse(format!("unknown sort key: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// What the table currently shows. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSortSpec {
    pub search_text: String,
    pub country: String,
    pub timezone: String,
    pub sort_key: Option<SortKey>,
    pub sort_order: SortOrder,
}

impl FilterSortSpec {
    /// Header-click behavior: the active column flips direction, a new column
    /// starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_key = Some(key);
            self.sort_order = SortOrder::Asc;
        }
    }

    pub fn is_searching(&self) -> bool {
        !self.search_text.trim().is_empty()
    }
}

/// Apply `spec` to `records`, returning a new vector.
///
/// Filters run in order: name substring (case-insensitive), exact country,
/// exact trimmed timezone. The sort is stable, so equal keys keep their
/// collection order in either direction.
pub fn filter_sort<'a, I>(records: I, spec: &FilterSortSpec) -> Vec<CityRecord>
where
    I: IntoIterator<Item = &'a CityRecord>,
{
    let needle = spec.search_text.to_lowercase();
    let timezone = spec.timezone.trim();

    let mut out: Vec<CityRecord> = records
        .into_iter()
        .filter(|city| needle.is_empty() || city.name.to_lowercase().contains(&needle))
        .filter(|city| spec.country.is_empty() || city.country == spec.country)
        .filter(|city| timezone.is_empty() || city.timezone.trim() == timezone)
        .cloned()
        .collect();

    if let Some(key) = spec.sort_key {
        match spec.sort_order {
            SortOrder::Asc => out.sort_by(|a, b| key.compare(a, b)),
            SortOrder::Desc => out.sort_by(|a, b| key.compare(b, a)),
        }
    }

    out
}
