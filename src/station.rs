//! # Tide Station Catalog and Nearest-Station Resolution
//!
//! A fixed catalog of Florida NOAA prediction stations. Locations picked by the
//! user carry only a coordinate; they are anchored to the catalog station with
//! the smallest great-circle distance.

use crate::{Coordinate, Location};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used for haversine distances, in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    /// The catalog has no stations to choose from (configuration error)
    #[error("station catalog is empty")]
    EmptyCatalog,
}

/// A NOAA prediction station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn new(id: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Station {
            id: id.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// The built-in Florida stations.
///
/// Miami and Tampa share station id 8729108.
pub fn florida_catalog() -> Vec<Station> {
    vec![
        Station::new("8724580", "Key West, FL", 24.5551, -81.8066),
        Station::new("8729108", "Miami, FL", 25.7617, -80.1918),
        Station::new("8729108", "Tampa, FL", 27.9506, -82.4572),
        Station::new("8720218", "Jacksonville, FL", 30.3322, -81.6557),
        Station::new("8729840", "Pensacola, FL", 30.4213, -87.2169),
        Station::new("8726520", "St. Petersburg, FL", 27.7676, -82.6403),
    ]
}

/// Great-circle distance between two coordinates in metres (haversine).
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(b.latitude - a.latitude);
    let dlon = to_rad(b.longitude - a.longitude);
    let h = (dlat / 2.0).sin().powi(2)
        + to_rad(a.latitude).cos() * to_rad(b.latitude).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Catalog stations paired with their distance from `coord`, nearest first.
///
/// Stations at equal distance keep catalog order.
pub fn rank_by_distance(catalog: &[Station], coord: Coordinate) -> Vec<(&Station, f64)> {
    let mut ranked: Vec<(&Station, f64)> = catalog
        .iter()
        .map(|station| (station, haversine_distance(coord, station.coordinate())))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// Nearest catalog station to `coord` and its distance in metres.
///
/// # Example
/// ```
/// use florida_tides_lib::station::{florida_catalog, resolve_nearest};
/// use florida_tides_lib::Coordinate;
///
/// let catalog = florida_catalog();
/// let (station, _) = resolve_nearest(&catalog, Coordinate::new(24.56, -81.78)).unwrap();
/// assert_eq!(station.name, "Key West, FL");
/// ```
pub fn resolve_nearest(
    catalog: &[Station],
    coord: Coordinate,
) -> Result<(Station, f64), StationError> {
    rank_by_distance(catalog, coord)
        .into_iter()
        .next()
        .map(|(station, distance)| (station.clone(), distance))
        .ok_or(StationError::EmptyCatalog)
}

/// Return `location` anchored to a station.
///
/// Already-anchored locations are returned as they are.
pub fn anchor_location(catalog: &[Station], location: &Location) -> Result<Location, StationError> {
    if location.is_anchored() {
        return Ok(location.clone());
    }
    let (station, distance) = resolve_nearest(catalog, location.coordinate())?;
    log::info!(
        "Anchored {} to station {} ({}, {:.1} km)",
        location.name,
        station.id,
        station.name,
        distance / 1000.0
    );
    Ok(location.anchored_to(station.id))
}

/// Catalog stations whose name contains `query`, ignoring case.
///
/// Blank queries match nothing.
pub fn search_catalog<'a>(catalog: &'a [Station], query: &str) -> Vec<&'a Station> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    catalog
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}
