//! pipewatch-core: Core library for pipewatch
//!
//! This crate provides the refresh and reconciliation engine behind `pw`, a
//! live health dashboard for a motion/temperature event pipeline.
//!
//! # Architecture
//!
//! ```text
//! SnapshotPoller ──(timer)──▶ Fetcher ──▶ processing / analyzer / storage
//!       │                        ▲
//!       ├──▶ ConsistencyOrchestrator ──▶ consistency_check
//!       ▼
//! SharedState ──▶ reconcile ──▶ render (text / JSON) · tui
//! ```
//!
//! # Modules
//!
//! - `fetch`: HTTP fetch adapter and the `Fetcher` seam
//! - `endpoints`: endpoint URLs and the trailing event window
//! - `model`: wire types of the consistency-check service
//! - `snapshot`: ambient panels and most-recent event selection
//! - `reconcile`: pure count/diff and key/value table model
//! - `state`: shared dashboard state
//! - `orchestrator`: consistency check trigger and result fetch
//! - `poller`: periodic multi-source refresh loop
//! - `dashboard`: wiring of state, poller and orchestrator
//! - `view`: exclusive tab selection
//! - `render`: plain-text and JSON output
//! - `config`: configuration management
//! - `logging`: tracing subscriber setup
//! - `tui`: terminal UI (feature-gated: `tui`)
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod poller;
pub mod reconcile;
pub mod render;
pub mod snapshot;
pub mod state;
pub mod view;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{ConfigError, Error, FetchError, FetchResult, Result};
pub use fetch::{Fetcher, HttpFetcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
