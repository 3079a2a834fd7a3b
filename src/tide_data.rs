//! # NOAA Tide Prediction Fetching
//!
//! This module handles all network operations for fetching tide predictions from
//! NOAA's CO-OPS data getter and turning the response into a classified [`TideSeries`].
//!
//! ## Data Source
//!
//! ### NOAA Tides and Currents API
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Product**: `predictions`, hourly (`interval=h`), MLLW datum, feet, GMT
//! - **Format**: JSON `{"predictions": [{"t": "2025-10-08 00:00", "v": "1.234"}, ...]}`
//!   (older payloads use `data` as the list key; hi/lo points also carry `type`)
//!
//! ### Data Processing Pipeline
//! 1. **Fetch**: HTTP GET with the station and `begin_date`/`end_date` window
//! 2. **Parse**: decode the point list, dropping points with a bad `t` or `v`
//! 3. **Classify**: label unlabeled interior extrema ([`crate::classify`])
//!
//! ## Error Handling
//!
//! - **Transport failures / non-2xx**: [`TideError::ServiceUnavailable`]
//! - **Unparseable payload or NOAA error object**: [`TideError::InvalidResponse`]
//! - **Malformed individual points**: dropped, never fatal

use crate::classify::classify;
use crate::config::ServiceConfig;
use crate::{Sample, TideSeries, TideType};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use reqwest::Url;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// NOAA `begin_date` / `end_date` format
pub const NOAA_DATE_FORMAT: &str = "%Y%m%d %H:%M";

/// Timestamp layouts accepted for a point's `t` field, after RFC 3339
const POINT_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Errors that can occur while fetching or querying tide data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TideError {
    /// Transport failure or non-success HTTP status
    #[error("tide service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Payload could not be decoded into a list of predictions
    #[error("invalid response from tide service: {0}")]
    InvalidResponse(String),

    /// Requested window is empty or reversed
    #[error("invalid time window: {start} is not before {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Window offset cannot be represented as a date
    #[error("time window of {0} hours is out of range")]
    WindowOutOfRange(i64),

    /// Height query against a series with no samples
    #[error("no tide data available")]
    EmptySeries,
}

impl From<reqwest::Error> for TideError {
    fn from(err: reqwest::Error) -> Self {
        TideError::ServiceUnavailable(err.to_string())
    }
}

/// Anything that can produce a classified tide series for a station and window.
///
/// [`NoaaClient`] is the production source; sessions are generic over this so
/// they can run against canned data.
pub trait PredictionSource {
    fn fetch_series(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<TideSeries, TideError>> + Send;
}

/// Query parameters for one predictions request.
#[derive(Clone, Debug)]
pub struct PredictionQuery<'a> {
    pub station_id: &'a str,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PredictionQuery<'_> {
    /// Full request URL for this query against `service`.
    pub fn url(&self, service: &ServiceConfig) -> Result<Url, TideError> {
        let begin = self.start.format(NOAA_DATE_FORMAT).to_string();
        let end = self.end.format(NOAA_DATE_FORMAT).to_string();
        Url::parse_with_params(
            &service.base_url,
            &[
                ("product", "predictions"),
                ("application", service.application.as_str()),
                ("begin_date", begin.as_str()),
                ("end_date", end.as_str()),
                ("datum", service.datum.as_str()),
                ("station", self.station_id),
                ("time_zone", service.time_zone.as_str()),
                ("units", service.units.as_str()),
                ("interval", service.interval.as_str()),
                ("format", "json"),
            ],
        )
        .map_err(|e| TideError::ServiceUnavailable(format!("bad service URL: {e}")))
    }
}

/// HTTP client for the NOAA predictions endpoint.
#[derive(Clone, Debug)]
pub struct NoaaClient {
    http: reqwest::Client,
    service: ServiceConfig,
}

impl NoaaClient {
    pub fn new(service: ServiceConfig) -> Result<Self, TideError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;
        Ok(NoaaClient { http, service })
    }

    /// Fetch and classify predictions for `station_id` between `start` and `end`.
    ///
    /// # Example
    /// ```no_run
    /// use chrono::{Duration, Utc};
    /// use florida_tides_lib::config::ServiceConfig;
    /// use florida_tides_lib::tide_data::NoaaClient;
    ///
    /// # async fn run() -> Result<(), florida_tides_lib::tide_data::TideError> {
    /// let client = NoaaClient::new(ServiceConfig::default())?;
    /// let now = Utc::now();
    /// let series = client.fetch(
    ///     "8724580",
    ///     now,
    ///     now + Duration::days(1),
    /// ).await?;
    /// println!("{} samples", series.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TideSeries, TideError> {
        if start >= end {
            return Err(TideError::InvalidWindow { start, end });
        }

        let url = PredictionQuery {
            station_id,
            start,
            end,
        }
        .url(&self.service)?;
        info!("Fetching predictions for station {station_id}");
        debug!("GET {url}");

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!("Prediction request for {station_id} failed: {e}");
            TideError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Prediction request for {station_id} returned {status}");
            return Err(TideError::ServiceUnavailable(format!("HTTP {status}")));
        }

        let body = response.text().await?;
        let samples = parse_predictions(&body)?;
        info!(
            "Station {station_id}: {} predictions between {} and {}",
            samples.len(),
            start.format(NOAA_DATE_FORMAT),
            end.format(NOAA_DATE_FORMAT)
        );

        Ok(classify(&TideSeries::new(station_id, samples)))
    }
}

impl PredictionSource for NoaaClient {
    async fn fetch_series(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TideSeries, TideError> {
        self.fetch(station_id, start, end).await
    }
}

// -- Response decoding --

#[derive(Deserialize)]
struct PredictionResponse {
    #[serde(alias = "data")]
    predictions: Option<Vec<serde_json::Value>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct PredictionPoint {
    t: String,
    v: String,
    /// Non-string labels are treated as missing
    #[serde(rename = "type")]
    kind: Option<serde_json::Value>,
}

impl PredictionPoint {
    fn into_sample(self) -> Option<Sample> {
        let time = parse_point_time(&self.t)?;
        let height_ft = self.v.trim().parse::<f64>().ok().filter(|h| h.is_finite())?;
        let code = self.kind.as_ref().and_then(serde_json::Value::as_str);
        Some(match TideType::from_code(code) {
            TideType::Unset => Sample::new(time, height_ft),
            label => Sample::labeled(time, height_ft, label),
        })
    }
}

/// Decode a predictions payload into unclassified samples.
///
/// Points whose `t` is not a timestamp or whose `v` is not a decimal are dropped.
/// A payload without a point list fails with [`TideError::InvalidResponse`].
pub fn parse_predictions(body: &str) -> Result<Vec<Sample>, TideError> {
    let response: PredictionResponse =
        serde_json::from_str(body).map_err(|e| TideError::InvalidResponse(e.to_string()))?;

    let points = match (response.predictions, response.error) {
        (Some(points), _) => points,
        (None, Some(err)) => return Err(TideError::InvalidResponse(err.message)),
        (None, None) => {
            return Err(TideError::InvalidResponse(
                "missing predictions list".to_string(),
            ))
        }
    };

    let total = points.len();
    let samples: Vec<Sample> = points
        .into_iter()
        .filter_map(|value| serde_json::from_value::<PredictionPoint>(value).ok())
        .filter_map(PredictionPoint::into_sample)
        .collect();

    if samples.len() < total {
        debug!("Dropped {} malformed prediction points", total - samples.len());
    }

    Ok(samples)
}

/// Parse a point timestamp. NOAA sends GMT wall-clock times without an offset.
pub fn parse_point_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    POINT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
