//! # Pipeline Test Suite for Florida Tides
//!
//! These tests run the library end to end the way the binary does: a raw NOAA
//! payload is parsed, classified, interpolated and windowed, and a saved location
//! is reloaded. Tests are independent and use no network.

use chrono::{DateTime, Duration, TimeZone, Utc};
use florida_tides_lib::classify::classify;
use florida_tides_lib::interpolate::current_height;
use florida_tides_lib::station::{florida_catalog, resolve_nearest};
use florida_tides_lib::store::LocationStore;
use florida_tides_lib::tide_data::parse_predictions;
use florida_tides_lib::window::window_for;
use florida_tides_lib::{Coordinate, Location, TideSeries, TideType};
use tempfile::TempDir;

/// A day of hourly Key West predictions in NOAA's wire format, with one
/// corrupted point.
const KEY_WEST_PAYLOAD: &str = r#"{"predictions":[
    {"t":"2025-10-08 00:00","v":"0.912"},
    {"t":"2025-10-08 01:00","v":"1.301"},
    {"t":"2025-10-08 02:00","v":"1.688"},
    {"t":"2025-10-08 03:00","v":"1.902"},
    {"t":"2025-10-08 04:00","v":"1.844"},
    {"t":"2025-10-08 05:00","v":"1.521"},
    {"t":"2025-10-08 06:00","v":"1.067"},
    {"t":"2025-10-08 07:00","v":"0.644"},
    {"t":"2025-10-08 08:00","v":"0.402"},
    {"t":"2025-10-08 09:00","v":"0.455"},
    {"t":"2025-10-08 10:00","v":"0.761"},
    {"t":"2025-10-08 11:00","v":""},
    {"t":"2025-10-08 12:00","v":"1.522"},
    {"t":"2025-10-08 13:00","v":"1.783"},
    {"t":"2025-10-08 14:00","v":"1.801"},
    {"t":"2025-10-08 15:00","v":"1.598"},
    {"t":"2025-10-08 16:00","v":"1.214"},
    {"t":"2025-10-08 17:00","v":"0.803"},
    {"t":"2025-10-08 18:00","v":"0.498"},
    {"t":"2025-10-08 19:00","v":"0.377"},
    {"t":"2025-10-08 20:00","v":"0.516"},
    {"t":"2025-10-08 21:00","v":"0.866"},
    {"t":"2025-10-08 22:00","v":"1.290"},
    {"t":"2025-10-08 23:00","v":"1.657"}
]}"#;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 8, hour, minute, 0).unwrap()
}

fn key_west_series() -> TideSeries {
    let samples = parse_predictions(KEY_WEST_PAYLOAD).expect("Payload should parse");
    classify(&TideSeries::new("8724580", samples))
}

/// Test that a day of hourly data yields the expected highs and lows.
///
/// Key West is semidiurnal: two highs and two lows in 24 hours.
#[test]
fn classified_day_has_two_tidal_cycles() {
    let series = key_west_series();

    assert_eq!(
        series.len(),
        23,
        "The point with an empty value should be dropped"
    );

    let highs: Vec<DateTime<Utc>> = series.highs().map(|s| s.time).collect();
    let lows: Vec<DateTime<Utc>> = series.lows().map(|s| s.time).collect();
    assert_eq!(highs, vec![at(3, 0), at(14, 0)], "Highs at 03:00 and 14:00");
    assert_eq!(lows, vec![at(8, 0), at(19, 0)], "Lows at 08:00 and 19:00");

    // Boundary samples are never labelled
    assert_eq!(series.samples[0].tide_type, TideType::Unset);
    assert_eq!(series.samples[22].tide_type, TideType::Unset);
}

/// Test that the current height falls between the neighbouring predictions.
///
/// At 05:30 the tide is falling from 1.521 ft (05:00) to 1.067 ft (06:00).
#[test]
fn current_height_tracks_falling_tide() {
    let series = key_west_series();
    let height = current_height(&series, at(5, 30)).expect("Series is not empty");

    assert!(
        (height - 1.294).abs() < 1e-9,
        "Expected midpoint 1.294 ft, got {}",
        height
    );
}

/// Test that the gap left by a dropped point is bridged by interpolation.
#[test]
fn current_height_bridges_dropped_point() {
    let series = key_west_series();
    // 11:00 was dropped; 10:00 and 12:00 are the nearest samples
    let height = current_height(&series, at(11, 0)).expect("Series is not empty");

    assert!(
        (height - (0.761 + 1.522) / 2.0).abs() < 1e-9,
        "Expected the average of 10:00 and 12:00, got {}",
        height
    );
}

/// Test the focused chart window around mid-morning.
///
/// Previous high (03:00), previous low (08:00), next high (14:00), next low
/// (19:00), plus two samples either side of 10:00.
#[test]
fn chart_window_contains_surrounding_events() {
    let series = key_west_series();
    let window = window_for(&series, at(10, 5));

    let times: Vec<DateTime<Utc>> = window.samples.iter().map(|s| s.time).collect();
    assert_eq!(
        times,
        vec![
            at(3, 0),
            at(8, 0),
            at(9, 0),
            at(10, 0),
            at(12, 0),
            at(13, 0),
            at(14, 0),
            at(19, 0),
        ]
    );
    assert!(
        window.samples.windows(2).all(|w| w[0].time < w[1].time),
        "Window keeps chronological order"
    );
}

/// Test that stale data extrapolates from the last two samples.
///
/// When every sample is in the past the two nearest are the last two, and the
/// line through them is extended.
#[test]
fn stale_series_extrapolates() {
    let series = key_west_series();
    let later = at(23, 0) + Duration::hours(1);
    let height = current_height(&series, later).expect("Series is not empty");

    let slope = 1.657 - 1.290;
    assert!(
        (height - (1.657 + slope)).abs() < 1e-9,
        "Expected linear extension, got {}",
        height
    );
}

/// Test the location round trip used at startup.
///
/// A place picked by coordinate is anchored to its nearest station, saved, and
/// reloaded unchanged.
#[test]
fn anchored_location_survives_restart() {
    let dir = TempDir::new().expect("Should create temp dir");
    let store = LocationStore::new(dir.path().join("last_location.json"));

    let marathon = Location::new("Marathon, FL", 24.7136, -81.0904);
    let (station, distance) =
        resolve_nearest(&florida_catalog(), marathon.coordinate()).expect("Catalog is not empty");
    assert_eq!(station.id, "8724580", "Marathon is nearest Key West");
    assert!(distance > 50_000.0 && distance < 120_000.0);

    let anchored = marathon.anchored_to(station.id);
    store.save(&anchored).expect("Should save location");

    let reloaded = store
        .load()
        .expect("Should read location")
        .expect("Slot should be filled");
    assert_eq!(reloaded, anchored);
    assert!(reloaded.is_anchored());
}

/// Test that a coordinate exactly on a station resolves with zero distance.
#[test]
fn station_coordinate_resolves_to_itself() {
    let catalog = florida_catalog();
    let (station, distance) = resolve_nearest(&catalog, Coordinate::new(30.3322, -81.6557))
        .expect("Catalog is not empty");

    assert_eq!(station.name, "Jacksonville, FL");
    assert_eq!(distance, 0.0);
}
