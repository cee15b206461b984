//! Consistency check orchestration: trigger a recompute, then read the
//! stored result back into the shared state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::endpoints::Endpoints;
use crate::fetch::{Fetcher, decode};
use crate::model::{ConsistencyCheckResult, TriggerResponse};
use crate::state::{CheckStatus, SharedState};

/// Outcome of a result fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(ConsistencyCheckResult),
    /// The audit service has never completed a check (HTTP 404)
    NotYetAvailable,
    Failed(String),
    /// A recompute settled while this fetch was in flight; nothing applied
    Superseded,
}

/// Outcome of a trigger request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Another trigger is outstanding; nothing was sent
    AlreadyRunning,
    Completed {
        processing_time_ms: u64,
        fetch: FetchOutcome,
    },
    /// The recompute request failed; the stored result is untouched
    Failed(String),
}

/// Clears the in-flight flag on every exit path, including cancellation
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a SharedState,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.update(|s| {
            s.check.in_flight = false;
            if s.check.status == CheckStatus::Running {
                s.check.status = CheckStatus::Idle;
            }
        });
        self.flag.store(false, Ordering::Release);
    }
}

/// Owns the trigger/result lifecycle of the consistency audit
pub struct ConsistencyOrchestrator<F: Fetcher> {
    fetcher: Arc<F>,
    endpoints: Endpoints,
    state: SharedState,
    in_flight: AtomicBool,
}

impl<F: Fetcher> ConsistencyOrchestrator<F> {
    pub fn new(fetcher: Arc<F>, endpoints: Endpoints, state: SharedState) -> Self {
        Self {
            fetcher,
            endpoints,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Ask the audit service to recompute, then fetch the new result.
    ///
    /// A call while another trigger is outstanding sends nothing and
    /// returns [`TriggerOutcome::AlreadyRunning`].
    pub async fn trigger(&self) -> TriggerOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Consistency check already running, ignoring trigger");
            return TriggerOutcome::AlreadyRunning;
        }
        let guard = InFlightGuard {
            flag: &self.in_flight,
            state: &self.state,
        };
        self.state.update(|s| {
            s.check.in_flight = true;
            s.check.status = CheckStatus::Running;
        });

        let url = self.endpoints.check_update();
        let started = Instant::now();
        let response = self
            .fetcher
            .post_json(&url)
            .await
            .and_then(decode::<TriggerResponse>);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let processing_time_ms = match response {
            Ok(TriggerResponse { processing_time_ms }) => {
                info!(processing_time_ms, elapsed_ms, "Consistency check completed");
                self.state.update(|s| {
                    s.check.last_run_ms = Some(processing_time_ms);
                    s.check.status = CheckStatus::Completed { processing_time_ms };
                    s.check.generation += 1;
                });
                processing_time_ms
            }
            Err(e) => {
                warn!(error = %e, elapsed_ms, "Consistency check trigger failed");
                let message = e.inline_message();
                self.state.update(|s| {
                    s.check.status = CheckStatus::TriggerFailed {
                        message: message.clone(),
                    };
                });
                return TriggerOutcome::Failed(message);
            }
        };
        drop(guard);

        let fetch = self.fetch_result().await;
        TriggerOutcome::Completed {
            processing_time_ms,
            fetch,
        }
    }

    /// Read the latest stored audit into the result slot.
    pub async fn fetch_result(&self) -> FetchOutcome {
        let url = self.endpoints.check_results();
        let issued = self.state.read(|s| s.check.generation);
        let fetched = self
            .fetcher
            .get_json(&url)
            .await
            .and_then(decode::<ConsistencyCheckResult>);

        let applied = self.state.update(|s| {
            if s.check.generation != issued {
                return false;
            }
            match &fetched {
                Ok(result) => s.check.apply_result(result.clone()),
                Err(e) => s.check.apply_fetch_error(e),
            }
            true
        });
        if !applied {
            debug!(issued, "Discarding result fetch issued before the latest recompute");
            return FetchOutcome::Superseded;
        }

        match fetched {
            Ok(result) => {
                debug!(
                    missing_in_db = result.missing_in_db.len(),
                    missing_in_queue = result.missing_in_queue.len(),
                    "Loaded consistency check result"
                );
                FetchOutcome::Loaded(result)
            }
            Err(e) if e.is_not_found() => {
                debug!("No consistency check has completed yet");
                FetchOutcome::NotYetAvailable
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch consistency check result");
                FetchOutcome::Failed(e.inline_message())
            }
        }
    }
}
