//! # Florida Tides Application Entry Point
//!
//! Resolves the location to show (command line, or the one saved last time), runs
//! the fetch → classify → interpolate/window pipeline through a [`TideSession`] and
//! prints the focused chart to the terminal.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use clap::Parser;
use florida_tides_lib::config::{Config, CONFIG_FILE};
use florida_tides_lib::debounce::LocationSearch;
use florida_tides_lib::renderer::draw_ascii;
use florida_tides_lib::session::{Outcome, TideSession};
use florida_tides_lib::station::{florida_catalog, Station};
use florida_tides_lib::store::LocationStore;
use florida_tides_lib::tide_data::NoaaClient;
use florida_tides_lib::Location;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "florida-tides",
    version,
    about = "Tide predictions for Florida coastal locations"
)]
struct Cli {
    /// NOAA station id to show directly
    #[arg(long)]
    station: Option<String>,

    /// Latitude of a place to show; resolved to the nearest station
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of a place to show
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Display name for --lat/--lon
    #[arg(long)]
    name: Option<String>,

    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Hours of predictions to fetch after now (overrides config)
    #[arg(long)]
    hours: Option<i64>,

    /// Extra attempts after a failed fetch
    #[arg(long, default_value_t = 1)]
    retries: u32,

    /// List catalog stations whose name contains this text, then exit
    #[arg(long, conflicts_with_all = ["station", "lat", "lon"])]
    search: Option<String>,
}

impl Cli {
    /// Location named on the command line, if any.
    fn location(&self, catalog: &[Station]) -> anyhow::Result<Option<Location>> {
        if let Some(id) = &self.station {
            let location = match (catalog.iter().find(|s| &s.id == id), self.lat, self.lon) {
                (_, Some(lat), Some(lon)) => {
                    let name = self.name.clone().unwrap_or_else(|| format!("Station {id}"));
                    Location::new(name, lat, lon)
                }
                (Some(station), _, _) => {
                    Location::new(station.name.clone(), station.latitude, station.longitude)
                }
                (None, _, _) => bail!("station {id} is not in the catalog; pass --lat/--lon too"),
            };
            return Ok(Some(location.anchored_to(id.clone())));
        }

        Ok(match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let name = self
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{lat:.4}, {lon:.4}"));
                Some(Location::new(name, lat, lon))
            }
            _ => None,
        })
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load_from_path(&cli.config);
    if let Some(hours) = cli.hours {
        config.session.lookahead_hours = hours;
    }

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let catalog = florida_catalog();
    if let Some(query) = &cli.search {
        let search = LocationSearch::with_config(catalog, &config.session);
        // search() spawns onto the runtime, so it must be called inside it
        let stations = rt
            .block_on(async { search.search(query).await })?
            .unwrap_or_default();
        if stations.is_empty() {
            println!("No stations match \"{query}\"");
        }
        for station in stations {
            println!(
                "{:<8} {:<20} {:>9.4} {:>9.4}",
                station.id, station.name, station.latitude, station.longitude
            );
        }
        return Ok(());
    }

    let store = LocationStore::new(&config.storage.location_path);
    let location = match cli.location(&catalog)? {
        Some(location) => location,
        None => store
            .load()
            .context("reading saved location")?
            .context("no location given and none saved; use --lat/--lon or --station")?,
    };
    info!("Showing tides for {}", location.name);

    let client = NoaaClient::new(config.service.clone()).context("building HTTP client")?;
    let session = TideSession::new(client, config.session.clone())
        .with_catalog(catalog)
        .with_store(store);

    let mut result = rt.block_on(session.load(&location, chrono::Utc::now()));
    for attempt in 1..=cli.retries {
        let Err(e) = &result else { break };
        warn!("Attempt {attempt}: {e}; retrying");
        result = rt.block_on(session.retry());
    }

    match result {
        Ok(Outcome::Updated(snapshot)) => {
            draw_ascii(&snapshot);
            Ok(())
        }
        Ok(Outcome::Superseded) => Ok(()),
        Err(e) => {
            let message = session.error_message().unwrap_or_else(|| e.to_string());
            eprintln!("{message}");
            eprintln!("Run the same command again to retry.");
            Err(e.into())
        }
    }
}
