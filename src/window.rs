//! # Chart Viewport Windowing
//!
//! Reduces a day of classified predictions to the points a focused chart needs:
//! the most recent high and low at or before "now", the next high and low after
//! it, and a few samples either side of the sample closest to "now".

use crate::{TideSeries, TideType};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Samples kept on each side of the sample closest to "now"
pub const DEFAULT_CONTEXT_RADIUS: usize = 2;

/// Focused subsequence of `series` around `now`, with the default context radius.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use florida_tides_lib::{window::window_for, TideSeries};
///
/// let empty = TideSeries::new("8724580", vec![]);
/// assert!(window_for(&empty, Utc::now()).is_empty());
/// ```
pub fn window_for(series: &TideSeries, now: DateTime<Utc>) -> TideSeries {
    window_with_radius(series, now, DEFAULT_CONTEXT_RADIUS)
}

/// Focused subsequence of `series` around `now`.
///
/// Original order is preserved and no sample appears twice.
pub fn window_with_radius(series: &TideSeries, now: DateTime<Utc>, radius: usize) -> TideSeries {
    TideSeries {
        station_id: series.station_id.clone(),
        samples: window_indices(series, now, radius)
            .into_iter()
            .map(|i| series.samples[i].clone())
            .collect(),
    }
}

/// Sorted, deduplicated indices selected by [`window_with_radius`].
pub fn window_indices(series: &TideSeries, now: DateTime<Utc>, radius: usize) -> Vec<usize> {
    let Some(closest) = closest_index(series, now) else {
        return Vec::new();
    };

    let mut indices = BTreeSet::new();
    for tide_type in [TideType::High, TideType::Low] {
        indices.extend(last_at_or_before(series, now, tide_type));
        indices.extend(first_after(series, now, tide_type));
    }

    let last = series.len() - 1;
    indices.extend(closest.saturating_sub(radius)..=(closest + radius).min(last));

    indices.into_iter().collect()
}

/// Index of the sample nearest `now`; ties go to the earlier index.
pub fn closest_index(series: &TideSeries, now: DateTime<Utc>) -> Option<usize> {
    series
        .samples
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| s.distance_ms(now))
        .map(|(i, _)| i)
}

fn last_at_or_before(series: &TideSeries, now: DateTime<Utc>, tide_type: TideType) -> Option<usize> {
    series
        .samples
        .iter()
        .rposition(|s| s.tide_type == tide_type && s.time <= now)
}

fn first_after(series: &TideSeries, now: DateTime<Utc>, tide_type: TideType) -> Option<usize> {
    series
        .samples
        .iter()
        .position(|s| s.tide_type == tide_type && s.time > now)
}
