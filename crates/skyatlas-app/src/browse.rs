//! Browse-table state.
//!
//! Holds what the user has selected (search text, filters, sort column,
//! display units) and answers every read from the aggregator's current
//! collection, so changing a filter never triggers a fetch.

use std::sync::Arc;

use skyatlas_catalog::{
    CatalogError, CityAggregator, CityRecord, FilterSortSpec, PageOutcome, SortKey,
};
use skyatlas_core::{DisplayConfig, TemperatureUnit, WindSpeedUnit};

use crate::routes::detail_path;

pub struct BrowseState {
    catalog: Arc<CityAggregator>,
    filter: FilterSortSpec,
    units: DisplayConfig,
    show_suggestions: bool,
}

impl BrowseState {
    pub fn new(catalog: Arc<CityAggregator>, units: DisplayConfig) -> Self {
        Self {
            catalog,
            filter: FilterSortSpec::default(),
            units,
            show_suggestions: false,
        }
    }

    /// The list scrolled to its end: ask for the next page.
    pub async fn load_more(&self) -> Result<PageOutcome, CatalogError> {
        self.catalog.request_next_page().await
    }

    /// A search keystroke. Opens the suggestion list.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filter.search_text = text.into();
        self.show_suggestions = true;
    }

    /// A suggestion was picked: it becomes the search text and the list closes.
    pub fn choose_suggestion(&mut self, city: &CityRecord) {
        self.filter.search_text = city.name.clone();
        self.show_suggestions = false;
    }

    /// Empty string clears the filter.
    pub fn set_country(&mut self, country: impl Into<String>) {
        self.filter.country = country.into();
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.filter.timezone = timezone.into();
    }

    /// Column header clicked.
    pub fn sort_by(&mut self, key: SortKey) {
        self.filter.toggle_sort(key);
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.units.temperature_unit = unit;
    }

    pub fn set_wind_unit(&mut self, unit: WindSpeedUnit) {
        self.units.wind_unit = unit;
    }

    pub fn filter(&self) -> &FilterSortSpec {
        &self.filter
    }

    pub fn units(&self) -> DisplayConfig {
        self.units
    }

    /// Table rows for the current selection.
    pub fn rows(&self) -> Vec<CityRecord> {
        self.catalog.query(&self.filter)
    }

    pub fn suggestions(&self) -> Vec<CityRecord> {
        if !self.show_suggestions {
            return Vec::new();
        }
        self.catalog.suggest(&self.filter.search_text)
    }

    /// Options for the country dropdown, from the catalog's facet list.
    pub fn country_options(&self) -> Vec<String> {
        self.catalog.countries()
    }

    /// Options for the timezone dropdown, from the loaded cities.
    pub fn timezone_options(&self) -> Vec<String> {
        self.catalog.timezones()
    }

    /// Whether the "loading more" indicator belongs under the table.
    ///
    /// Hidden while searching, and before anything is on screen.
    pub fn show_loading_indicator(&self) -> bool {
        !self.filter.is_searching() && self.catalog.snapshot().in_flight && !self.rows().is_empty()
    }

    /// Route to open when a row is selected.
    pub fn select(&self, city: &CityRecord) -> String {
        detail_path(&city.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skyatlas_catalog::{CatalogSource, RawCity, RecordsPage, SortOrder};

    struct FixedSource {
        cities: Vec<(&'static str, &'static str, &'static str, i64)>,
    }

    #[async_trait]
    impl CatalogSource for FixedSource {
        async fn fetch_page(&self, offset: usize, limit: usize) -> Result<RecordsPage, CatalogError> {
            let results = self
                .cities
                .iter()
                .skip(offset)
                .take(limit)
                .enumerate()
                .map(|(i, (name, country, timezone, population))| RawCity {
                    geoname_id: Some((offset + i).to_string()),
                    ascii_name: Some(name.to_string()),
                    cou_name_en: Some(country.to_string()),
                    timezone: Some(timezone.to_string()),
                    population: Some(*population),
                    coordinates: None,
                })
                .collect();
            Ok(RecordsPage {
                total_count: Some(self.cities.len() as u64),
                results,
            })
        }

        async fn fetch_countries(&self) -> Result<Vec<String>, CatalogError> {
            Ok(vec!["Germany".into(), "Austria".into()])
        }
    }

    fn browse() -> BrowseState {
        let source = FixedSource {
            cities: vec![
                ("Berlin", "Germany", "Europe/Berlin", 3_600_000),
                ("Bern", "Switzerland", "Europe/Zurich", 134_000),
                ("Vienna", "Austria", "Europe/Vienna", 1_900_000),
                ("Bremen", "Germany", "Europe/Berlin", 560_000),
                ("Graz", "Austria", "Europe/Vienna", 290_000),
            ],
        };
        BrowseState::new(
            Arc::new(CityAggregator::new(Arc::new(source), 10)),
            DisplayConfig::default(),
        )
    }

    fn names(rows: Vec<CityRecord>) -> Vec<String> {
        rows.into_iter().map(|c| c.name).collect()
    }

    #[tokio::test]
    async fn test_filters_and_sort_apply_to_loaded_rows() {
        let mut state = browse();
        state.load_more().await.unwrap();

        state.set_country("Germany");
        assert_eq!(names(state.rows()), vec!["Berlin", "Bremen"]);

        state.set_country("");
        state.set_timezone("Europe/Vienna");
        state.sort_by(SortKey::Population);
        assert_eq!(names(state.rows()), vec!["Graz", "Vienna"]);

        state.sort_by(SortKey::Population);
        assert_eq!(state.filter().sort_order, SortOrder::Desc);
        assert_eq!(names(state.rows()), vec!["Vienna", "Graz"]);
    }

    #[tokio::test]
    async fn test_suggestions_open_on_typing_and_close_on_choice() {
        let mut state = browse();
        state.load_more().await.unwrap();
        assert!(state.suggestions().is_empty());

        state.set_search("br");
        let suggested = state.suggestions();
        assert_eq!(names(suggested.clone()), vec!["Bremen"]);

        state.choose_suggestion(&suggested[0]);
        assert!(state.suggestions().is_empty());
        assert_eq!(state.filter().search_text, "Bremen");
        assert_eq!(names(state.rows()), vec!["Bremen"]);
    }

    #[tokio::test]
    async fn test_dropdown_options() {
        let state = browse();
        state.load_more().await.unwrap();
        state.catalog.load_countries().await.unwrap();

        assert_eq!(state.country_options(), vec!["Germany", "Austria"]);
        assert_eq!(
            state.timezone_options(),
            vec!["Europe/Berlin", "Europe/Vienna", "Europe/Zurich"]
        );
    }

    #[test]
    fn test_units_start_from_config_and_toggle() {
        let mut state = browse();
        assert_eq!(state.units().temperature_unit, TemperatureUnit::Celsius);

        state.set_temperature_unit(TemperatureUnit::Fahrenheit);
        state.set_wind_unit(WindSpeedUnit::MilesPerHour);

        assert_eq!(state.units().temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(state.units().wind_unit, WindSpeedUnit::MilesPerHour);
    }

    #[tokio::test]
    async fn test_select_routes_to_detail() {
        let state = browse();
        state.load_more().await.unwrap();
        let rows = state.rows();

        assert_eq!(state.select(&rows[0]), "/weather/Berlin");
        assert!(!state.show_loading_indicator());
    }
}
