//! Headless rendering adapters: sectioned plain text and JSON.

use std::fmt::Write;

use serde::Serialize;

use crate::reconcile::{KeyValueTable, MissingList, NO_DATA, ReconciliationView, key_value_table};
use crate::snapshot::Panel;
use crate::state::{CheckState, DashboardState};

/// Machine-readable dashboard document
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub last_updated: Option<String>,
    pub cycles_completed: u64,
    pub processing_stats: &'a Panel,
    pub analyzer_stats: &'a Panel,
    pub latest_motion: &'a Panel,
    pub latest_temperature: &'a Panel,
    pub consistency: ConsistencyReport<'a>,
}

#[derive(Debug, Serialize)]
pub struct ConsistencyReport<'a> {
    #[serde(flatten)]
    pub check: &'a CheckState,
    pub status_message: String,
    /// Present only when a result has been fetched
    pub view: Option<ReconciliationView>,
}

impl<'a> Report<'a> {
    #[must_use]
    pub fn new(state: &'a DashboardState) -> Self {
        Self {
            last_updated: state.last_updated.map(|ts| ts.to_rfc3339()),
            cycles_completed: state.cycles_completed,
            processing_stats: &state.ambient.processing_stats,
            analyzer_stats: &state.ambient.analyzer_stats,
            latest_motion: &state.ambient.latest_motion,
            latest_temperature: &state.ambient.latest_temperature,
            consistency: ConsistencyReport::new(&state.check),
        }
    }
}

impl<'a> ConsistencyReport<'a> {
    #[must_use]
    pub fn new(check: &'a CheckState) -> Self {
        Self {
            check,
            status_message: check.status.message(),
            view: check.view(),
        }
    }
}

/// Pretty-printed JSON for the whole dashboard
pub fn render_json(state: &DashboardState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report::new(state))
}

/// Pretty-printed JSON for the consistency surface only
pub fn render_check_json(check: &CheckState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ConsistencyReport::new(check))
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "== {title} ==");
}

fn write_table(out: &mut String, table: &KeyValueTable) {
    match table {
        KeyValueTable::NoData => {
            let _ = writeln!(out, "  {NO_DATA}");
        }
        KeyValueTable::Rows(rows) => {
            let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
            for row in rows {
                let _ = writeln!(out, "  {:<width$}  {}", row.key, row.value);
            }
        }
    }
}

fn write_panel(out: &mut String, title: &str, panel: &Panel) {
    section(out, title);
    match panel {
        Panel::Loading => {
            let _ = writeln!(out, "  Loading...");
        }
        Panel::Ready { data } => write_table(out, &key_value_table(Some(data))),
        Panel::Failed { message } => {
            let _ = writeln!(out, "  {message}");
        }
    }
    out.push('\n');
}

fn write_missing(out: &mut String, title: &str, list: &MissingList) {
    section(out, title);
    let _ = writeln!(out, "  {}", list.summary);
    for row in &list.rows {
        let _ = writeln!(
            out,
            "  {:<12} event_id={} trace_id={}",
            row.kind.as_str(),
            row.event_id,
            row.trace_id
        );
    }
    out.push('\n');
}

/// Consistency status, counts and both missing lists
#[must_use]
pub fn render_check_text(check: &CheckState) -> String {
    let mut out = String::new();
    section(&mut out, "Consistency Check");
    let status = check.status.message();
    let _ = writeln!(
        out,
        "  {}",
        if status.is_empty() { "Idle" } else { status.as_str() }
    );
    if let Some(ms) = check.last_run_ms {
        let _ = writeln!(out, "  Last run took {ms}ms");
    }
    out.push('\n');

    // Never audited: the results panel is hidden, not zeroed.
    let Some(view) = check.view() else {
        return out;
    };

    section(&mut out, "Consistency Results");
    if let Some(ts) = &view.last_updated {
        let _ = writeln!(out, "  Audited at {ts}");
    }
    let _ = writeln!(out, "  {:<12} {:>8} {:>12}", "subsystem", "motion", "temperature");
    for subsystem in crate::model::Subsystem::ALL {
        let cell = |kind| view.count(subsystem, kind).unwrap_or(0);
        let _ = writeln!(
            out,
            "  {:<12} {:>8} {:>12}",
            subsystem.as_str(),
            cell(crate::model::EventKind::Motion),
            cell(crate::model::EventKind::Temperature)
        );
    }
    out.push('\n');

    write_missing(&mut out, "Missing in DB", &view.missing_in_db);
    write_missing(&mut out, "Missing in Queue", &view.missing_in_queue);
    out
}

/// Full sectioned report, one section per display region
#[must_use]
pub fn render_text(state: &DashboardState) -> String {
    let mut out = String::new();
    write_panel(&mut out, "Processing Stats", &state.ambient.processing_stats);
    write_panel(&mut out, "Analyzer Stats", &state.ambient.analyzer_stats);
    write_panel(&mut out, "Latest Motion Event", &state.ambient.latest_motion);
    write_panel(
        &mut out,
        "Latest Temperature Event",
        &state.ambient.latest_temperature,
    );
    out.push_str(&render_check_text(&state.check));
    let _ = writeln!(out, "{}", state.last_updated_label());
    out
}
