//! # Debounced Actions
//!
//! Runs an action only after input has been quiet for a fixed delay. Every call
//! to [`Debouncer::schedule`] bumps a generation counter; a pending action
//! captures the generation it was scheduled with and does nothing if a newer
//! schedule (or a [`Debouncer::cancel`]) has happened by the time it wakes or
//! finishes.
//!
//! [`LocationSearch`] wraps a debouncer around the station catalog search used
//! by the location text field.

use crate::config::SessionConfig;
use crate::station::{search_catalog, Station};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Invalidate any pending action.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Run `action` after the quiet period unless superseded.
    ///
    /// The handle resolves to `Some(output)` only for the action that is still
    /// current when it finishes, and `None` otherwise.
    pub fn schedule<F, Fut>(&self, action: F) -> JoinHandle<Option<Fut::Output>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let counter = Arc::clone(&self.generation);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if counter.load(Ordering::SeqCst) != generation {
                return None;
            }
            let output = action().await;
            (counter.load(Ordering::SeqCst) == generation).then_some(output)
        })
    }
}

/// Debounced, case-insensitive search over a station catalog.
#[derive(Clone, Debug)]
pub struct LocationSearch {
    catalog: Arc<Vec<Station>>,
    debouncer: Debouncer,
}

impl LocationSearch {
    pub fn new(catalog: Vec<Station>, delay: Duration) -> Self {
        LocationSearch {
            catalog: Arc::new(catalog),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Search with the configured quiet period.
    pub fn with_config(catalog: Vec<Station>, config: &SessionConfig) -> Self {
        Self::new(catalog, Duration::from_millis(config.search_debounce_ms))
    }

    /// Start a search for `query`, superseding any unresolved earlier one.
    ///
    /// A blank query cancels the pending search and resolves immediately to
    /// an empty result.
    pub fn search(&self, query: &str) -> JoinHandle<Option<Vec<Station>>> {
        if query.trim().is_empty() {
            self.debouncer.cancel();
            return tokio::spawn(async { Some(Vec::new()) });
        }

        let catalog = Arc::clone(&self.catalog);
        let query = query.to_string();
        self.debouncer.schedule(move || async move {
            search_catalog(&catalog, &query)
                .into_iter()
                .cloned()
                .collect::<Vec<Station>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::florida_catalog;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_schedule_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..3 {
            let runs = Arc::clone(&runs);
            handles.push(debouncer.schedule(move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                i
            }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(results, vec![None, None, Some(2)]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_schedules_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let first = debouncer.schedule(|| async { "first" });
        assert_eq!(first.await.unwrap(), Some("first"));

        let second = debouncer.schedule(|| async { "second" });
        assert_eq!(second.await.unwrap(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let handle = debouncer.schedule(|| async { 42 });
        debouncer.cancel();
        assert_eq!(handle.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_discarded_when_superseded_mid_action() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let slow = debouncer.schedule(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            "stale"
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = debouncer.schedule(|| async { "fresh" });

        assert_eq!(slow.await.unwrap(), None);
        assert_eq!(fresh.await.unwrap(), Some("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_search_keystrokes() {
        let search = LocationSearch::new(florida_catalog(), Duration::from_millis(300));

        let p = search.search("p");
        let pe = search.search("pe");
        let pen = search.search("pen");

        assert_eq!(p.await.unwrap(), None);
        assert_eq!(pe.await.unwrap(), None);
        let stations = pen.await.unwrap().unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Pensacola, FL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_search_cleared() {
        let search = LocationSearch::with_config(florida_catalog(), &SessionConfig::default());
        let pending = search.search("Key");
        let cleared = search.search("");

        assert_eq!(cleared.await.unwrap(), Some(Vec::new()));
        assert_eq!(pending.await.unwrap(), None);
    }
}
