//! Dashboard state shared between the poller, the orchestrator and the
//! rendering adapters.
//!
//! Writers take the lock only to apply already-fetched results, never across
//! an await point, so readers always see either the previous or the next
//! complete cycle for a given panel.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::FetchError;
use crate::model::ConsistencyCheckResult;
use crate::reconcile::{ReconciliationView, reconciliation_panel};
use crate::snapshot::AmbientSnapshot;

/// Status line of the consistency check surface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    #[default]
    Idle,
    Running,
    Completed { processing_time_ms: u64 },
    /// Result endpoint answered 404
    NotYetRun,
    /// Result fetch failed; cleared by the next successful fetch
    Failed { message: String },
    /// Recompute request failed; held until the next trigger
    TriggerFailed { message: String },
}

impl CheckStatus {
    /// Human-readable status line; empty when idle
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::Running => "Running consistency check...".to_string(),
            Self::Completed { processing_time_ms } => {
                format!("Consistency check completed in {processing_time_ms}ms")
            }
            Self::NotYetRun => "No consistency checks have been run yet".to_string(),
            Self::Failed { message } | Self::TriggerFailed { message } => {
                format!("Error: {message}")
            }
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::TriggerFailed { .. })
    }
}

/// Consistency check surface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CheckState {
    /// Last successfully fetched audit; `None` hides the results panel
    pub result: Option<ConsistencyCheckResult>,
    pub status: CheckStatus,
    /// A trigger is outstanding; the trigger control is disabled while set
    pub in_flight: bool,
    /// Duration reported by the last successful trigger
    pub last_run_ms: Option<u64>,
    /// Bumped each time a recompute settles; result fetches issued under an
    /// older generation are discarded
    #[serde(skip)]
    pub generation: u64,
}

impl CheckState {
    #[must_use]
    pub const fn trigger_enabled(&self) -> bool {
        !self.in_flight
    }

    #[must_use]
    pub fn view(&self) -> Option<ReconciliationView> {
        reconciliation_panel(self.result.as_ref())
    }

    pub fn apply_result(&mut self, result: ConsistencyCheckResult) {
        self.result = Some(result);
        if matches!(self.status, CheckStatus::NotYetRun | CheckStatus::Failed { .. }) {
            self.status = CheckStatus::Idle;
        }
    }

    /// Absorb a failed result fetch.
    ///
    /// Any failure hides the results panel. The status line only changes
    /// when no trigger owns it, either running or failed.
    pub fn apply_fetch_error(&mut self, err: &FetchError) {
        self.result = None;
        if matches!(
            self.status,
            CheckStatus::Running | CheckStatus::TriggerFailed { .. }
        ) {
            return;
        }
        self.status = if err.is_not_found() {
            CheckStatus::NotYetRun
        } else {
            CheckStatus::Failed {
                message: err.inline_message(),
            }
        };
    }
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardState {
    pub ambient: AmbientSnapshot,
    pub check: CheckState,
    /// Local time the last poll cycle finished
    pub last_updated: Option<DateTime<Local>>,
    pub cycles_completed: u64,
}

impl DashboardState {
    /// Footer text, e.g. `Last updated: 14:03:07`
    #[must_use]
    pub fn last_updated_label(&self) -> String {
        self.last_updated.map_or_else(
            || "Last updated: never".to_string(),
            |ts| format!("Last updated: {}", ts.format("%H:%M:%S")),
        )
    }
}

/// Cloneable handle to the shared dashboard state
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<DashboardState>>,
}

impl SharedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Run `f` against the current state
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.lock())
    }

    /// Apply `f` as one atomic update
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Owned copy for renderers that outlive the lock
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }
}
