//! skyatlas: terminal front end for the SkyAtlas city catalog and weather
//!
//! Usage examples
//! --------------
//!
//! - Load three pages and list German cities by population
//!   $ skyatlas browse --pages 3 --country Germany --sort population --desc
//!
//! - Autocomplete against the first page
//!   $ skyatlas suggest ber
//!
//! - Current weather in Fahrenheit and mph
//!   $ skyatlas weather "New York" -t F -w mph
//!
//! The OpenWeatherMap key comes from `weather.api_key` in the config file or
//! the `OPENWEATHER_API_KEY` environment variable.
mod args;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use skyatlas_app::{detail_path, AppContext, BrowseState};
use skyatlas_catalog::{CityRecord, PageOutcome, SortOrder};
use skyatlas_core::Config;
use skyatlas_weather::{DisplayField, FetchStatus};

use crate::args::{CliArgs, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    skyatlas_core::init()?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_validated()?.0,
    };
    let ctx = AppContext::new(config).context("Failed to set up SkyAtlas")?;

    tracing::info!("SkyAtlas started");

    match args.command {
        Commands::Browse {
            pages,
            search,
            country,
            timezone,
            sort,
            desc,
        } => {
            let mut browse = ctx.browse();
            load_pages(&browse, pages).await?;

            if let Some(text) = search {
                browse.set_search(text);
            }
            if let Some(country) = country {
                browse.set_country(country);
            }
            if let Some(timezone) = timezone {
                browse.set_timezone(timezone);
            }
            if let Some(key) = sort {
                browse.sort_by(key);
                if desc {
                    browse.sort_by(key);
                }
            }

            let rows = browse.rows();
            print_table(&rows);
            let snapshot = ctx.catalog().snapshot();
            println!(
                "\n{} of {} loaded cities shown (sorted {}){}",
                rows.len(),
                snapshot.loaded,
                match browse.filter().sort_order {
                    SortOrder::Asc => "ascending",
                    SortOrder::Desc => "descending",
                },
                if snapshot.cursor.exhausted {
                    ", catalog exhausted"
                } else {
                    ""
                }
            );
        }

        Commands::Suggest { prefix, pages } => {
            let mut browse = ctx.browse();
            load_pages(&browse, pages).await?;
            browse.set_search(prefix.clone());

            let suggestions = browse.suggestions();
            if suggestions.is_empty() {
                println!("No cities start with: {prefix}");
            }
            for city in suggestions {
                println!("{} – {}  ({})", city.name, city.country, detail_path(&city.name));
            }
        }

        Commands::Countries => {
            let countries = ctx
                .catalog()
                .load_countries()
                .await
                .map_err(|e| anyhow!(e.user_message()))
                .context("Failed to load countries")?;
            for country in countries {
                println!("{country}");
            }
        }

        Commands::Weather {
            city,
            temp_unit,
            wind_unit,
        } => {
            let mut units = ctx.config().display;
            if let Some(unit) = temp_unit {
                units.temperature_unit = unit;
            }
            if let Some(unit) = wind_unit {
                units.wind_unit = unit;
            }

            let mut detail = ctx.detail_view();
            if let Err(e) = detail.show(&detail_path(&city)).await {
                tracing::debug!("Weather fetch failed: {:?}", e);
            }
            if let FetchStatus::Failed(reason) = detail.status() {
                return Err(anyhow!("Weather unavailable for {city}: {reason}"));
            }

            let (view, readout) = detail
                .card(units)
                .ok_or_else(|| anyhow!("No weather data for {city}"))?;

            println!("{}, {}", view.name, view.country);
            println!("  {} ({})", view.description, view.condition.label());
            println!(
                "  Temperature: {:.1}{}  feels like {:.1}{}",
                readout.temperature,
                readout.temperature_symbol(),
                readout.feels_like,
                readout.temperature_symbol()
            );
            println!(
                "  High / low:  {:.1}{} / {:.1}{}",
                readout.high,
                readout.temperature_symbol(),
                readout.low,
                readout.temperature_symbol()
            );
            println!(
                "  Wind:        {:.1} {} from {:.0}°",
                readout.wind_speed,
                readout.wind_symbol(),
                view.wind_deg
            );
            println!("  Humidity:    {:.0}%", view.humidity);
            println!("  Pressure:    {:.0} hPa", view.pressure);
            println!("  Clouds:      {:.0}%", view.cloud_cover);
            if !view.is_placeholder(DisplayField::Visibility) {
                println!("  Visibility:  {:.1} km", view.visibility / 1000.0);
            }
            println!(
                "  Sunrise:     {}",
                view.sunrise_local().unwrap_or_else(|| "--:--".into())
            );
            println!(
                "  Sunset:      {}",
                view.sunset_local().unwrap_or_else(|| "--:--".into())
            );
            if let Some(observed) = view.observed_local() {
                println!("  Observed at {observed} local time");
            }
        }
    }

    Ok(())
}

/// Request `pages` pages, stopping early once the catalog runs out.
async fn load_pages(browse: &BrowseState, pages: usize) -> Result<()> {
    for _ in 0..pages {
        let outcome = browse
            .load_more()
            .await
            .map_err(|e| anyhow!(e.user_message()))
            .context("Failed to load catalog page")?;

        match outcome {
            PageOutcome::Merged { exhausted: true, .. } | PageOutcome::Skipped(_) => break,
            PageOutcome::Merged { .. } => {}
        }
    }
    Ok(())
}

fn print_table(rows: &[CityRecord]) {
    println!(
        "{:<28} {:<24} {:<24} {:>12} {:>9} {:>10}",
        "Name", "Country", "Timezone", "Population", "Lat", "Lon"
    );
    for city in rows {
        println!(
            "{:<28} {:<24} {:<24} {:>12} {:>9.4} {:>10.4}",
            city.name, city.country, city.timezone, city.population, city.lat, city.lon
        );
    }
}
