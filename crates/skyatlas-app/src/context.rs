//! Explicitly constructed application context.

use std::sync::Arc;

use skyatlas_catalog::{CatalogClient, CatalogSource, CityAggregator};
use skyatlas_core::{AppError, Config, ConfigError};
use skyatlas_weather::{WeatherProvider, WeatherSnapshotStore, WeatherSource};

use crate::browse::BrowseState;
use crate::routes::DetailView;

/// Shared handles for one running application.
///
/// Cheap to clone; every clone points at the same aggregator and store.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<Config>,
    catalog: Arc<CityAggregator>,
    weather: Arc<WeatherSnapshotStore>,
}

impl AppContext {
    /// Validate `config`, then build HTTP clients from it and wire them into
    /// the core components.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        let catalog = CatalogClient::from_config(&config.catalog)
            .map_err(|e| AppError::Service(format!("catalog client: {}", e)))?;
        let weather = WeatherProvider::from_config(&config.weather)
            .map_err(|e| AppError::Service(format!("weather client: {}", e)))?;

        Ok(Self::with_sources(config, Arc::new(catalog), Arc::new(weather)))
    }

    /// Wire arbitrary sources, e.g. in-memory ones for tests.
    pub fn with_sources(
        config: Config,
        catalog: Arc<dyn CatalogSource>,
        weather: Arc<dyn WeatherSource>,
    ) -> Self {
        let aggregator = CityAggregator::new(catalog, config.catalog.page_size);
        let store = WeatherSnapshotStore::new(weather, config.weather.discard_stale_responses);

        tracing::info!(
            "Application context ready (page size {}, discard stale weather: {})",
            config.catalog.page_size,
            config.weather.discard_stale_responses
        );

        Self {
            config: Arc::new(config),
            catalog: Arc::new(aggregator),
            weather: Arc::new(store),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> Arc<CityAggregator> {
        self.catalog.clone()
    }

    pub fn weather(&self) -> Arc<WeatherSnapshotStore> {
        self.weather.clone()
    }

    /// Fresh browse state using the configured display units.
    pub fn browse(&self) -> BrowseState {
        BrowseState::new(self.catalog.clone(), self.config.display)
    }

    pub fn detail_view(&self) -> DetailView {
        DetailView::new(self.weather.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyatlas_core::{CatalogConfig, WeatherConfig};

    #[test]
    fn test_new_builds_from_config() {
        let config = Config {
            catalog: CatalogConfig {
                page_size: 7,
                ..Default::default()
            },
            weather: WeatherConfig {
                discard_stale_responses: false,
                ..Default::default()
            },
            ..Default::default()
        };

        let ctx = AppContext::new(config).unwrap();

        assert_eq!(ctx.catalog().cursor().page_size, 7);
        assert!(!ctx.weather().discards_stale_responses());
        assert!(ctx.catalog().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            catalog: CatalogConfig {
                page_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let err = AppContext::new(config).err().unwrap();

        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
        assert!(err.to_string().contains("catalog.page_size"));
    }

    #[test]
    fn test_clones_share_components() {
        let ctx = AppContext::new(Config::default()).unwrap();
        let other = ctx.clone();

        assert!(Arc::ptr_eq(&ctx.catalog(), &other.catalog()));
        assert!(Arc::ptr_eq(&ctx.weather(), &other.weather()));
    }
}
