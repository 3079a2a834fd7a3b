//! # Tide Session
//!
//! Drives one user's flow: pick a location → anchor it to a station → fetch →
//! classify → current height and chart window. The session keeps the last good
//! result so a failed fetch never replaces data that is already on screen.
//!
//! ## Superseding fetches
//! Each [`TideSession::load`] takes a new generation number before it starts its
//! fetch. When the fetch returns, the result is applied only if no newer load has
//! started in the meantime; otherwise it is discarded as [`Outcome::Superseded`].
//! Rapid location changes therefore never flash stale data.
//!
//! ## Retry
//! Every request is remembered. [`TideSession::retry`] re-runs the last one with
//! the same station and time window.

use crate::config::SessionConfig;
use crate::interpolate::current_height;
use crate::station::{anchor_location, florida_catalog, Station, StationError};
use crate::store::LocationStore;
use crate::tide_data::{PredictionSource, TideError};
use crate::window::window_with_radius;
use crate::{Location, TideSeries};
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Tide(#[from] TideError),

    #[error(transparent)]
    Station(#[from] StationError),

    /// `retry` was called before any request was made
    #[error("nothing to retry")]
    NothingToRetry,
}

/// Everything the display layer needs after a successful fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct TideSnapshot {
    /// The location, anchored to the station the data came from
    pub location: Location,
    /// Full classified series
    pub series: TideSeries,
    /// Focused subset for the chart
    pub window: TideSeries,
    /// Interpolated height at `as_of`; `None` when the series came back empty
    pub current_height_ft: Option<f64>,
    pub as_of: DateTime<Utc>,
}

/// Result of a load that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The fetch finished first and its data is now current
    Updated(TideSnapshot),
    /// A newer load started while this one was in flight; its data was dropped
    Superseded,
}

/// Parameters of one fetch, kept for retry.
#[derive(Clone, Debug, PartialEq)]
pub struct TideRequest {
    pub location: Location,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl TideRequest {
    fn station_id(&self) -> &str {
        self.location.station_id.as_deref().unwrap_or_default()
    }
}

#[derive(Default)]
struct SessionState {
    current: Option<TideSnapshot>,
    error_message: Option<String>,
    last_request: Option<TideRequest>,
    loading: bool,
}

/// One user's tide view, generic over where predictions come from.
pub struct TideSession<S> {
    source: S,
    catalog: Vec<Station>,
    config: SessionConfig,
    store: Option<LocationStore>,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl<S: PredictionSource> TideSession<S> {
    /// Session over the built-in Florida catalog with no persistence.
    pub fn new(source: S, config: SessionConfig) -> Self {
        TideSession {
            source,
            catalog: florida_catalog(),
            config,
            store: None,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<Station>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Persist each selected location into `store`.
    pub fn with_store(mut self, store: LocationStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Last successfully loaded data.
    pub fn current(&self) -> Option<TideSnapshot> {
        self.state().current.clone()
    }

    /// User-facing message for the most recent failure, cleared on success.
    pub fn error_message(&self) -> Option<String> {
        self.state().error_message.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn last_request(&self) -> Option<TideRequest> {
        self.state().last_request.clone()
    }

    /// Select `location` and load its predictions around `now`.
    pub async fn load(
        &self,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<Outcome, SessionError> {
        let generation = self.begin();

        let anchored = match anchor_location(&self.catalog, location) {
            Ok(anchored) => anchored,
            Err(e) => {
                let message = format!("Failed to find tide station: {e}");
                return Err(self.fail(generation, message, e.into()));
            }
        };
        self.persist(&anchored);

        let (start, end) = match fetch_window(now, &self.config) {
            Ok(window) => window,
            Err(e) => {
                let message = format!("Failed to fetch tide data: {e}");
                return Err(self.fail(generation, message, e.into()));
            }
        };
        let request = TideRequest {
            location: anchored,
            start,
            end,
            now,
        };
        self.run(generation, request).await
    }

    /// Re-run the last request with identical parameters.
    pub async fn retry(&self) -> Result<Outcome, SessionError> {
        let request = self.last_request().ok_or(SessionError::NothingToRetry)?;
        let generation = self.begin();
        self.run(generation, request).await
    }

    async fn run(&self, generation: u64, request: TideRequest) -> Result<Outcome, SessionError> {
        self.state().last_request = Some(request.clone());

        let fetched = self
            .source
            .fetch_series(request.station_id(), request.start, request.end)
            .await;

        if !self.is_current(generation) {
            info!(
                "Discarding superseded fetch for station {}",
                request.station_id()
            );
            return Ok(Outcome::Superseded);
        }

        match fetched {
            Ok(series) => {
                let snapshot = self.snapshot(request, series);
                let mut state = self.state();
                state.current = Some(snapshot.clone());
                state.error_message = None;
                state.loading = false;
                Ok(Outcome::Updated(snapshot))
            }
            Err(e) => {
                let message = format!("Failed to fetch tide data: {e}");
                Err(self.fail(generation, message, e.into()))
            }
        }
    }

    fn snapshot(&self, request: TideRequest, series: TideSeries) -> TideSnapshot {
        let current_height_ft = match current_height(&series, request.now) {
            Ok(height) => Some(height),
            Err(TideError::EmptySeries) => {
                warn!("Station {} returned no predictions", series.station_id);
                None
            }
            Err(e) => {
                warn!("Could not estimate current height: {e}");
                None
            }
        };
        let window = window_with_radius(&series, request.now, self.config.context_radius);

        TideSnapshot {
            location: request.location,
            series,
            window,
            current_height_ft,
            as_of: request.now,
        }
    }

    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state();
        state.loading = true;
        state.error_message = None;
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Record a failure for `generation`; the last good snapshot stays put.
    fn fail(&self, generation: u64, message: String, err: SessionError) -> SessionError {
        warn!("{message}");
        if self.is_current(generation) {
            let mut state = self.state();
            state.error_message = Some(message);
            state.loading = false;
        }
        err
    }

    fn persist(&self, location: &Location) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(location) {
                warn!("Could not save location {}: {e}", location.name);
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // Fields are only assigned whole; a poisoned guard is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `now - lookback_hours ..= now + lookahead_hours`, or an error when either
/// edge falls outside the representable date range.
fn fetch_window(
    now: DateTime<Utc>,
    config: &SessionConfig,
) -> Result<(DateTime<Utc>, DateTime<Utc>), TideError> {
    let offset = |hours: i64| Duration::try_hours(hours).ok_or(TideError::WindowOutOfRange(hours));

    let start = now
        .checked_sub_signed(offset(config.lookback_hours)?)
        .ok_or(TideError::WindowOutOfRange(config.lookback_hours))?;
    let end = now
        .checked_add_signed(offset(config.lookahead_hours)?)
        .ok_or(TideError::WindowOutOfRange(config.lookahead_hours))?;
    Ok((start, end))
}
