use std::path::PathBuf;

use clap::{Parser, Subcommand};
use skyatlas_catalog::SortKey;
use skyatlas_core::{TemperatureUnit, WindSpeedUnit};

/// CLI arguments for skyatlas
#[derive(Debug, Parser)]
#[command(
    name = "skyatlas",
    version,
    about = "Browse a paginated world-city catalog and inspect live weather"
)]
pub struct CliArgs {
    /// Path to a config.toml (default: <config dir>/skyatlas/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load catalog pages and print the filtered, sorted table
    Browse {
        /// Number of pages to load before printing
        #[arg(short = 'p', long = "pages", default_value_t = 1)]
        pages: usize,

        /// Case-insensitive substring of the city name
        #[arg(short = 's', long = "search")]
        search: Option<String>,

        /// Exact country name (e.g. "Germany")
        #[arg(long = "country")]
        country: Option<String>,

        /// Exact timezone (e.g. Europe/Berlin)
        #[arg(long = "timezone")]
        timezone: Option<String>,

        /// Column to sort by: id, name, country, timezone, population, lat, lon
        #[arg(long = "sort")]
        sort: Option<SortKey>,

        /// Sort descending instead of ascending
        #[arg(long = "desc", requires = "sort")]
        desc: bool,
    },

    /// Autocomplete city names from the loaded pages
    Suggest {
        /// Start of the city name
        prefix: String,

        /// Number of pages to load before suggesting
        #[arg(short = 'p', long = "pages", default_value_t = 1)]
        pages: usize,
    },

    /// List the catalog's countries
    Countries,

    /// Show current weather for a city
    Weather {
        /// City name (e.g. "New York")
        city: String,

        /// Temperature unit: C, F or K (default from config)
        #[arg(short = 't', long = "temp-unit")]
        temp_unit: Option<TemperatureUnit>,

        /// Wind unit: m/s, km/h or mph (default from config)
        #[arg(short = 'w', long = "wind-unit")]
        wind_unit: Option<WindSpeedUnit>,
    },
}
