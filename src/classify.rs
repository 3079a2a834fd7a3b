//! # High/Low Tide Classification
//!
//! Labels interior samples of a series as high or low tide using a strict
//! local-extremum test against the immediate neighbours.
//!
//! ## Rules
//! - Interior sample `i` is **High** when `h[i] > h[i-1] && h[i] > h[i+1]`
//! - Interior sample `i` is **Low** when `h[i] < h[i-1] && h[i] < h[i+1]`
//! - Anything else keeps the label it came in with (normally `Unset`)
//! - The first and last samples are never reclassified
//! - Samples labelled by the prediction service are never overwritten
//!
//! The test is not plateau-aware: a flat top such as `[1, 3, 3, 1]` produces no
//! high at all. Keep the strict comparison; changing it moves event markers.

use crate::{Sample, TideSeries, TideType};

/// Return a classified copy of `series`.
///
/// Same length, same order, heights untouched. Series shorter than three samples
/// are returned unchanged.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use florida_tides_lib::{classify::classify, Sample, TideSeries, TideType};
///
/// let t0 = Utc.with_ymd_and_hms(2025, 10, 8, 0, 0, 0).unwrap();
/// let samples = [1.0, 3.0, 1.0]
///     .iter()
///     .enumerate()
///     .map(|(i, h)| Sample::new(t0 + Duration::hours(i as i64), *h))
///     .collect();
///
/// let classified = classify(&TideSeries::new("8724580", samples));
/// assert_eq!(classified.samples[1].tide_type, TideType::High);
/// ```
pub fn classify(series: &TideSeries) -> TideSeries {
    TideSeries {
        station_id: series.station_id.clone(),
        samples: classify_samples(&series.samples),
    }
}

/// Slice form of [`classify`].
pub fn classify_samples(samples: &[Sample]) -> Vec<Sample> {
    let mut result = samples.to_vec();
    if samples.len() < 3 {
        return result;
    }

    for (i, window) in samples.windows(3).enumerate() {
        let (prev, current, next) = (&window[0], &window[1], &window[2]);
        if current.source_labeled {
            continue;
        }

        if let Some(label) = extremum(prev.height_ft, current.height_ft, next.height_ft) {
            result[i + 1].tide_type = label;
        }
    }

    result
}

fn extremum(prev: f64, current: f64, next: f64) -> Option<TideType> {
    if current > prev && current > next {
        Some(TideType::High)
    } else if current < prev && current < next {
        Some(TideType::Low)
    } else {
        None
    }
}
