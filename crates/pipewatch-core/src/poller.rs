//! Snapshot poller: the periodic ambient refresh loop.
//!
//! Each cycle fetches the four ambient sources concurrently, applies them to
//! the shared state in one update, refreshes the consistency result through
//! the orchestrator's read-only path and stamps the cycle time. A cycle that
//! is requested while another is running is dropped, not queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::endpoints::{Endpoints, EventWindow};
use crate::error::FetchResult;
use crate::fetch::Fetcher;
use crate::model::EventKind;
use crate::orchestrator::{ConsistencyOrchestrator, FetchOutcome};
use crate::snapshot::AmbientSnapshot;
use crate::state::SharedState;

/// What one cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    /// Sources whose fetch failed this cycle
    pub failed_sources: Vec<&'static str>,
    pub check: FetchOutcome,
    pub elapsed: Duration,
}

/// Result of asking for a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A cycle was already running; this request was dropped
    Skipped,
    Completed(CycleReport),
}

/// Resets the refreshing flag when a cycle ends, however it ends
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic multi-source refresher
pub struct SnapshotPoller<F: Fetcher> {
    fetcher: Arc<F>,
    endpoints: Endpoints,
    orchestrator: Arc<ConsistencyOrchestrator<F>>,
    state: SharedState,
    interval: Duration,
    window_days: u32,
    refreshing: AtomicBool,
    cycles: AtomicU64,
}

impl<F: Fetcher + 'static> SnapshotPoller<F> {
    pub fn new(
        fetcher: Arc<F>,
        endpoints: Endpoints,
        orchestrator: Arc<ConsistencyOrchestrator<F>>,
        polling: &PollingConfig,
    ) -> Self {
        let state = orchestrator.state().clone();
        Self {
            fetcher,
            endpoints,
            orchestrator,
            state,
            interval: polling.interval(),
            window_days: polling.event_window_days,
            refreshing: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    async fn fetch_events(&self, kind: EventKind, window: &EventWindow) -> FetchResult<Value> {
        self.fetcher.get_json(&self.endpoints.events(kind, window)).await
    }

    /// Run one refresh cycle unless one is already running.
    pub async fn poll_once(&self) -> PollOutcome {
        if self.refreshing.swap(true, Ordering::AcqRel) {
            debug!("Refresh already in progress, dropping tick");
            return PollOutcome::Skipped;
        }
        let _guard = RefreshGuard(&self.refreshing);

        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();
        let window = EventWindow::trailing(Utc::now(), self.window_days);
        let processing_url = self.endpoints.processing_stats();
        let analyzer_url = self.endpoints.analyzer_stats();

        let (processing, analyzer, motion, temperature) = tokio::join!(
            self.fetcher.get_json(&processing_url),
            self.fetcher.get_json(&analyzer_url),
            self.fetch_events(EventKind::Motion, &window),
            self.fetch_events(EventKind::Temperature, &window),
        );

        let failed_sources: Vec<&'static str> = [
            ("processing_stats", processing.as_ref().err()),
            ("analyzer_stats", analyzer.as_ref().err()),
            ("motion_events", motion.as_ref().err()),
            ("temperature_events", temperature.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(source, err)| {
            err.map(|e| {
                warn!(cycle, source, error = %e, "Ambient fetch failed");
                source
            })
        })
        .collect();

        let snapshot = AmbientSnapshot::from_fetches(processing, analyzer, motion, temperature);
        self.state.update(|s| s.ambient = snapshot);

        let check = self.orchestrator.fetch_result().await;

        self.state.update(|s| {
            s.last_updated = Some(Local::now());
            s.cycles_completed += 1;
        });

        let elapsed = started.elapsed();
        debug!(
            cycle,
            failed = failed_sources.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Poll cycle complete"
        );

        PollOutcome::Completed(CycleReport {
            cycle,
            failed_sources,
            check,
            elapsed,
        })
    }

    /// Run the timer loop until `shutdown` flips.
    ///
    /// The first tick fires immediately, giving the startup fetch. Cycles run
    /// on their own tasks so the timer keeps ticking; ticks that land on a
    /// running cycle are dropped. A cycle in progress at shutdown is awaited.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_ms = self.interval.as_millis() as u64,
            window_days = self.window_days,
            "Snapshot poller started"
        );

        let mut last: Option<JoinHandle<PollOutcome>> = None;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if last.as_ref().is_none_or(JoinHandle::is_finished) {
                        let poller = Arc::clone(&self);
                        last = Some(tokio::spawn(async move { poller.poll_once().await }));
                    } else {
                        debug!("Previous cycle still running, dropping tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Snapshot poller shutting down");
                        break;
                    }
                }
            }
        }

        if let Some(handle) = last {
            if let Err(e) = handle.await {
                warn!(error = %e, "Poll cycle task failed");
            }
        }
    }
}
