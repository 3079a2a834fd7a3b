//! # Tide Chart Text Rendering
//!
//! Renders the focused chart window of a [`TideSnapshot`] as a terminal chart.
//! One column per sample, with event markers:
//!
//! - `H` high tide, `L` low tide
//! - `•` an unlabeled sample
//! - `X` the sample closest to "now"
//!
//! Below the chart each column gets its hour (UTC) and a summary line gives the
//! estimated current height and the next high and low.

use crate::session::TideSnapshot;
use crate::window::closest_index;
use crate::{Sample, TideSeries, TideType};
use chrono::{DateTime, Utc};
use std::fmt::Write;

const ROWS: usize = 12;
const Y_AXIS_WIDTH: usize = 7;
/// Characters per sample column
const COLUMN_WIDTH: usize = 4;

/// Format a height in feet with one decimal, e.g. `"2.3 ft"`.
pub fn format_height(height_ft: f64) -> String {
    // Avoid printing "-0.0 ft" for tiny negatives
    let rounded = (height_ft * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.1} ft")
}

fn marker(sample: &Sample, is_now: bool) -> char {
    if is_now {
        return 'X';
    }
    match sample.tide_type {
        TideType::High => 'H',
        TideType::Low => 'L',
        TideType::Unset => '•',
    }
}

/// Chart of `window` as lines of text. Empty windows render a placeholder.
pub fn render_chart(window: &TideSeries, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    if window.is_empty() {
        out.push_str("No tide data available\n");
        return out;
    }

    let (min, max) = window
        .samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
            (min.min(s.height_ft), max.max(s.height_ft))
        });
    let range = max - min;
    let height_to_row = |h: f64| {
        if range == 0.0 {
            return ROWS / 2;
        }
        let normalized = (h - min) / range;
        ((1.0 - normalized) * (ROWS as f64 - 1.0)).round() as usize
    };

    let width = Y_AXIS_WIDTH + window.len() * COLUMN_WIDTH;
    let mut grid = vec![vec![' '; width]; ROWS];

    // Y-axis: max at top, min at bottom
    for (row, label) in [(0, max), (ROWS - 1, min)] {
        let text = format!("{label:>5.1}");
        for (i, ch) in text.chars().enumerate() {
            grid[row][i] = ch;
        }
    }
    for line in grid.iter_mut() {
        line[Y_AXIS_WIDTH - 1] = '│';
    }

    let now_index = closest_index(window, now);
    for (column, sample) in window.samples.iter().enumerate() {
        let row = height_to_row(sample.height_ft);
        let x = Y_AXIS_WIDTH + column * COLUMN_WIDTH + COLUMN_WIDTH / 2;
        grid[row][x] = marker(sample, now_index == Some(column));
    }

    for line in grid {
        let line: String = line.into_iter().collect();
        let _ = writeln!(out, "{}", line.trim_end());
    }

    // Hour labels under each column
    let mut labels = " ".repeat(Y_AXIS_WIDTH);
    for sample in &window.samples {
        let hour = sample.time.format("%H").to_string();
        let _ = write!(labels, "{hour:^COLUMN_WIDTH$}");
    }
    let _ = writeln!(out, "{}", labels.trim_end());
    out
}

/// Current height and next high/low, one line.
pub fn render_summary(snapshot: &TideSnapshot) -> String {
    let current = snapshot
        .current_height_ft
        .map(format_height)
        .unwrap_or_else(|| "--".to_string());
    let next = |tide_type: TideType| {
        snapshot
            .series
            .next_event_after(snapshot.as_of, tide_type)
            .map(|s| format!("{} at {}", format_height(s.height_ft), s.time.format("%H:%M UTC")))
            .unwrap_or_else(|| "--".to_string())
    };

    format!(
        "Now: {current}  Next high: {}  Next low: {}",
        next(TideType::High),
        next(TideType::Low)
    )
}

/// Full text view: heading, chart, summary.
pub fn render_snapshot(snapshot: &TideSnapshot) -> String {
    let station = snapshot.location.station_id.as_deref().unwrap_or("?");
    format!(
        "{} (station {station})\n\n{}\n{}\n",
        snapshot.location.name,
        render_chart(&snapshot.window, snapshot.as_of),
        render_summary(snapshot)
    )
}

/// Render tide data to ASCII terminal.
pub fn draw_ascii(snapshot: &TideSnapshot) {
    print!("{}", render_snapshot(snapshot));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::Location;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 8, 12, 0, 0).unwrap()
    }

    fn test_snapshot() -> TideSnapshot {
        let start = now() - Duration::hours(2);
        let samples = [1.0, 2.0, 3.0, 2.0, 1.0, 0.5, 1.0]
            .iter()
            .enumerate()
            .map(|(i, h)| Sample::new(start + Duration::hours(i as i64), *h))
            .collect();
        let series = classify(&TideSeries::new("8726520", samples));
        TideSnapshot {
            location: Location::new("Gulfport, FL", 27.74, -82.70).anchored_to("8726520"),
            window: series.clone(),
            series,
            current_height_ft: Some(3.0),
            as_of: now(),
        }
    }

    #[test]
    fn test_format_height() {
        assert_eq!(format_height(2.34), "2.3 ft");
        assert_eq!(format_height(-0.42), "-0.4 ft");
        assert_eq!(format_height(-0.01), "0.0 ft");
        assert_eq!(format_height(10.0), "10.0 ft");
    }

    #[test]
    fn test_chart_markers() {
        let snapshot = test_snapshot();
        let chart = render_chart(&snapshot.window, snapshot.as_of);

        // The high at index 2 coincides with now, so it is drawn as X
        assert!(chart.contains('X'));
        assert!(!chart.contains('H'));
        assert!(chart.contains('L'));
        assert_eq!(chart.matches('•').count(), 5);
        assert_eq!(chart.lines().count(), ROWS + 1);
    }

    #[test]
    fn test_empty_chart() {
        let empty = TideSeries::new("8726520", vec![]);
        assert_eq!(render_chart(&empty, now()), "No tide data available\n");
    }

    #[test]
    fn test_flat_chart_does_not_panic() {
        let samples = (0..3)
            .map(|i| Sample::new(now() + Duration::hours(i), 1.0))
            .collect();
        let chart = render_chart(&TideSeries::new("8726520", samples), now());
        assert_eq!(chart.lines().count(), ROWS + 1);
    }

    #[test]
    fn test_summary() {
        let summary = render_summary(&test_snapshot());
        assert_eq!(
            summary,
            "Now: 3.0 ft  Next high: --  Next low: 0.5 ft at 15:00 UTC"
        );
    }

    #[test]
    fn test_snapshot_heading() {
        let text = render_snapshot(&test_snapshot());
        assert!(text.starts_with("Gulfport, FL (station 8726520)"));
        draw_ascii(&test_snapshot());
    }
}
