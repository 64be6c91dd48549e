pub mod config;
pub mod error;
pub mod events;

pub use config::{
    CatalogConfig, Config, DisplayConfig, TemperatureUnit, ValidationResult, WeatherConfig,
    WindSpeedUnit,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};
pub use events::EventBus;

use anyhow::Result;

/// Initialize logging for the SkyAtlas binaries.
///
/// Safe to call more than once; later calls leave the installed subscriber alone.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("SkyAtlas core initialized");
    }
    Ok(())
}
