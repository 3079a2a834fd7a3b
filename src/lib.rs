//! # Florida Tides Core Library
//!
//! This library holds the tide-data pipeline behind the Florida Tides application:
//! fetching hourly predictions from NOAA, labelling high and low tides, estimating the
//! height "right now", and reducing a day of data to the handful of points a chart needs.
//!
//! ## Data Flow
//! 1. **Resolve**: a [`Location`] without a station id is anchored to the nearest
//!    catalog station ([`station::resolve_nearest`])
//! 2. **Fetch**: hourly NOAA predictions for the station and window ([`tide_data`])
//! 3. **Classify**: interior local extrema become highs and lows ([`classify`])
//! 4. **Interpolate / Window**: current height ([`interpolate`]) and the focused chart
//!    subset ([`window`]) are computed independently from the same classified series
//!
//! Classification, interpolation and windowing are pure functions over an immutable
//! [`TideSeries`]; only the fetch suspends.
//!
//! ## Core Types
//! - [`Sample`]: one time/height prediction with its tide label
//! - [`TideSeries`]: the ordered samples returned for one station and window
//! - [`Location`] / [`Coordinate`]: a user-chosen place, optionally anchored to a station

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod classify;
pub mod config;
pub mod debounce;
pub mod interpolate;
pub mod renderer;
pub mod session;
pub mod station;
pub mod store;
pub mod tide_data;
pub mod window;

/// Tide event label attached to a sample.
///
/// Serialized with the single-letter codes NOAA uses (`"H"`, `"L"`); unlabeled
/// samples use `"U"`. Display code treats [`TideType::Unset`] as "no event marker".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideType {
    #[serde(rename = "H")]
    High,
    #[serde(rename = "L")]
    Low,
    #[default]
    #[serde(rename = "U")]
    Unset,
}

impl TideType {
    /// Parse an upstream label. Anything other than `H` or `L` is unlabeled.
    ///
    /// A missing label becomes `Unset`, not `High`: an unlabeled point shows no
    /// event marker until the classifier finds a real extremum there.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("H") => TideType::High,
            Some("L") => TideType::Low,
            _ => TideType::Unset,
        }
    }
}

/// A single tide prediction.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use florida_tides_lib::{Sample, TideType};
///
/// let sample = Sample::new(Utc.with_ymd_and_hms(2025, 10, 8, 12, 0, 0).unwrap(), 2.4);
/// assert_eq!(sample.tide_type, TideType::Unset);
/// assert!(!sample.source_labeled);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Prediction time (UTC)
    pub time: DateTime<Utc>,
    /// Height above MLLW in feet
    pub height_ft: f64,
    /// High/low label, `Unset` for points between events
    pub tide_type: TideType,
    /// True when the label came from the prediction service; such samples are
    /// never reclassified
    #[serde(default)]
    pub source_labeled: bool,
}

impl Sample {
    /// Unlabeled sample.
    pub fn new(time: DateTime<Utc>, height_ft: f64) -> Self {
        Sample {
            time,
            height_ft,
            tide_type: TideType::Unset,
            source_labeled: false,
        }
    }

    /// Sample carrying a label supplied by the prediction service.
    pub fn labeled(time: DateTime<Utc>, height_ft: f64, tide_type: TideType) -> Self {
        Sample {
            time,
            height_ft,
            tide_type,
            source_labeled: tide_type != TideType::Unset,
        }
    }

    /// Absolute distance from `at`, in milliseconds.
    pub(crate) fn distance_ms(&self, at: DateTime<Utc>) -> i64 {
        (self.time - at).num_milliseconds().abs()
    }
}

/// Ordered tide samples for one station.
///
/// Samples are strictly increasing in time. A series is produced fresh per fetch
/// and never mutated in place; classification returns a new series.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use florida_tides_lib::{Sample, TideSeries};
///
/// let t0 = Utc.with_ymd_and_hms(2025, 10, 8, 0, 0, 0).unwrap();
/// let series = TideSeries::new(
///     "8724580",
///     vec![Sample::new(t0, 1.0), Sample::new(t0 + Duration::hours(1), 1.4)],
/// );
///
/// assert_eq!(series.len(), 2);
/// assert!(series.highs().next().is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TideSeries {
    /// Station the predictions belong to
    pub station_id: String,
    /// Samples in ascending time order
    pub samples: Vec<Sample>,
}

impl TideSeries {
    pub fn new(station_id: impl Into<String>, samples: Vec<Sample>) -> Self {
        TideSeries {
            station_id: station_id.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples labelled high, in time order.
    pub fn highs(&self) -> impl Iterator<Item = &Sample> {
        self.samples
            .iter()
            .filter(|s| s.tide_type == TideType::High)
    }

    /// Samples labelled low, in time order.
    pub fn lows(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|s| s.tide_type == TideType::Low)
    }

    /// First sample of the given type strictly after `now`.
    pub fn next_event_after(&self, now: DateTime<Utc>, tide_type: TideType) -> Option<&Sample> {
        self.samples
            .iter()
            .find(|s| s.tide_type == tide_type && s.time > now)
    }
}

/// Geographic coordinate in decimal degrees (WGS84).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }
}

/// A user-chosen place.
///
/// `station_id` stays `None` until the location is resolved against the station
/// catalog. Once set the location is "anchored" and fetches use the id directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Location {
            name: name.into(),
            latitude,
            longitude,
            station_id: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn is_anchored(&self) -> bool {
        self.station_id.is_some()
    }

    /// Copy of this location bound to `station_id`.
    pub fn anchored_to(&self, station_id: impl Into<String>) -> Self {
        Location {
            station_id: Some(station_id.into()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_location_roundtrip_without_station() {
        let location = Location::new("Key Biscayne, FL", 25.69, -80.16);
        let json = serde_json::to_string(&location).unwrap();
        assert!(!json.contains("stationId"));

        let parsed: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, location);
        assert!(!parsed.is_anchored());
    }

    #[test]
    fn test_location_roundtrip_with_station() {
        let location = Location::new("Mayport, FL", 30.39, -81.43).anchored_to("8720218");
        let json = serde_json::to_string(&location).unwrap();
        assert!(json.contains("\"stationId\":\"8720218\""));

        let parsed: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, location);
        assert!(parsed.is_anchored());
    }

    #[test]
    fn test_sample_roundtrip() {
        let time = Utc.with_ymd_and_hms(2025, 10, 8, 6, 0, 0).unwrap();
        for sample in [
            Sample::new(time, 1.25),
            Sample::labeled(time, -0.4, TideType::Low),
            Sample::labeled(time, 2.9, TideType::High),
        ] {
            let json = serde_json::to_string(&sample).unwrap();
            let parsed: Sample = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, sample);
        }
    }

    #[test]
    fn test_sample_source_flag_defaults_when_missing() {
        let json = r#"{"time":"2025-10-08T06:00:00Z","height_ft":1.5,"tide_type":"H"}"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.tide_type, TideType::High);
        assert!(!sample.source_labeled);
    }

    #[test]
    fn test_tide_type_from_code() {
        assert_eq!(TideType::from_code(Some("H")), TideType::High);
        assert_eq!(TideType::from_code(Some("L")), TideType::Low);
        assert_eq!(TideType::from_code(Some("X")), TideType::Unset);
        assert_eq!(TideType::from_code(None), TideType::Unset);
    }
}
