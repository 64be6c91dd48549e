//! Catalog wire types and the normalized city record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CatalogError;

/// A city as stored in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: String,
    pub name: String,
    pub country: String,
    pub timezone: String,
    pub population: u64,
    pub lat: f64,
    pub lon: f64,
}

impl CityRecord {
    /// Check that the record has what its identity key needs.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidRecord(format!(
                "record {:?} has no name",
                self.id
            )));
        }
        if self.country.trim().is_empty() {
            return Err(CatalogError::InvalidRecord(format!(
                "record {:?} ({}) has no country",
                self.id, self.name
            )));
        }
        Ok(())
    }

    /// Composite identity used for deduplication: `lower(name)-lower(country)`.
    pub fn identity_key(&self) -> String {
        format!(
            "{}-{}",
            self.name.to_lowercase(),
            self.country.to_lowercase()
        )
    }
}

/// Coordinates object inside a raw catalog record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A record exactly as the catalog API returns it.
///
/// Every field is optional and a field of the wrong type reads as missing;
/// incomplete records are filtered later by the deduplicator rather than
/// failing the whole page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCity {
    #[serde(default, deserialize_with = "string_or_number")]
    pub geoname_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ascii_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cou_name_en: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub population: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
}

impl From<RawCity> for CityRecord {
    fn from(raw: RawCity) -> Self {
        let coordinates = raw.coordinates.unwrap_or_default();
        Self {
            id: raw.geoname_id.unwrap_or_default(),
            name: raw.ascii_name.unwrap_or_default(),
            country: raw.cou_name_en.unwrap_or_default(),
            timezone: raw.timezone.unwrap_or_default(),
            population: raw.population.unwrap_or(0).max(0) as u64,
            lat: coordinates.lat,
            lon: coordinates.lon,
        }
    }
}

/// One page from the records endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordsPage {
    #[serde(default)]
    pub total_count: Option<u64>,
    /// One entry per record the catalog returned, malformed ones included, so
    /// the page length stays the raw length.
    #[serde(default, deserialize_with = "lenient_records")]
    pub results: Vec<RawCity>,
}

/// Response of the facet search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FacetResponse {
    #[serde(default)]
    pub facet_groups: Vec<FacetGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacetGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub facets: Vec<Facet>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Facet {
    pub name: String,
}

/// geoname ids show up as strings in v2.1 and as numbers in older exports.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Read a field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Decode each record on its own; one that is not an object becomes an empty
/// (and therefore invalid) record.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<RawCity>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(|v| {
            serde_json::from_value(v).unwrap_or_else(|e| {
                tracing::trace!("Unreadable catalog record: {}", e);
                RawCity::default()
            })
        })
        .collect())
}
