//! Interactive terminal UI, behind the `tui` feature.
//!
//! The UI never performs I/O on the draw path:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            App (blocking loop)           │
//! │   keys ─▶ ViewState    SharedState ─▶ draw│
//! └──────────────────────────────────────────┘
//!        │ spawn on runtime handle
//!        ▼
//! ┌──────────────────────────────────────────┐
//! │  SnapshotPoller · ConsistencyOrchestrator│
//! └──────────────────────────────────────────┘
//! ```
//!
//! Refreshes and triggers are scheduled as tasks; their results land in the
//! shared state and show up on the next frame.

mod app;
mod views;

pub use app::{App, AppConfig, TuiError, TuiResult, run_tui};
