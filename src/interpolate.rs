//! # Current Tide Height Estimation
//!
//! Estimates the tide height at an arbitrary instant by linear interpolation
//! between the two samples nearest in time.
//!
//! The two nearest samples are taken straight from a distance ranking, so `p1`
//! is not necessarily the earlier one. Between two samples this makes no
//! difference. Past either end of the series the line through the two nearest
//! samples is extended (`ratio` outside `[0, 1]`), which is what stale or sparse
//! data produces.

use crate::tide_data::TideError;
use crate::{Sample, TideSeries};
use chrono::{DateTime, Utc};

/// Estimated tide height at `at`, in feet.
///
/// # Errors
/// [`TideError::EmptySeries`] when the series has no samples.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use florida_tides_lib::{interpolate::current_height, Sample, TideSeries};
///
/// let t0 = Utc.with_ymd_and_hms(2025, 10, 8, 0, 0, 0).unwrap();
/// let series = TideSeries::new(
///     "8724580",
///     vec![Sample::new(t0, 2.0), Sample::new(t0 + Duration::hours(1), 4.0)],
/// );
///
/// let height = current_height(&series, t0 + Duration::minutes(30)).unwrap();
/// assert_eq!(height, 3.0);
/// ```
pub fn current_height(series: &TideSeries, at: DateTime<Utc>) -> Result<f64, TideError> {
    interpolate_samples(&series.samples, at)
}

/// Slice form of [`current_height`].
pub fn interpolate_samples(samples: &[Sample], at: DateTime<Utc>) -> Result<f64, TideError> {
    let (p1, p2) = match nearest_two(samples, at) {
        (None, _) => return Err(TideError::EmptySeries),
        (Some(only), None) => return Ok(only.height_ft),
        (Some(p1), Some(p2)) => (p1, p2),
    };

    let span_ms = (p2.time - p1.time).num_milliseconds();
    if span_ms == 0 {
        return Ok(p1.height_ft);
    }

    let ratio = (at - p1.time).num_milliseconds() as f64 / span_ms as f64;
    Ok(p1.height_ft + ratio * (p2.height_ft - p1.height_ft))
}

/// The two samples closest to `at`; equal distances keep series order.
fn nearest_two(samples: &[Sample], at: DateTime<Utc>) -> (Option<&Sample>, Option<&Sample>) {
    let mut ranked: Vec<&Sample> = samples.iter().collect();
    ranked.sort_by_key(|s| s.distance_ms(at));
    let mut ranked = ranked.into_iter();
    (ranked.next(), ranked.next())
}
