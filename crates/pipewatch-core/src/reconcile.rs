//! Reconciliation model: pure transforms from fetched documents to
//! display-ready rows.
//!
//! Nothing here performs I/O or touches shared state, so every rendering
//! adapter (text report, JSON, TUI) consumes the same shapes.

use serde::Serialize;
use serde_json::Value;

use crate::model::{ConsistencyCheckResult, EventKind, EventRecord, Subsystem};

/// Notice shown instead of an empty table
pub const NO_DATA: &str = "No data available";

// =============================================================================
// Key/value snapshots
// =============================================================================

/// One property row of a key/value panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

/// Rendered form of an opaque JSON mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum KeyValueTable {
    /// Input was absent, empty, or had no keys
    NoData,
    Rows(Vec<KeyValueRow>),
}

impl KeyValueTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }

    #[must_use]
    pub fn rows(&self) -> &[KeyValueRow] {
        match self {
            Self::NoData => &[],
            Self::Rows(rows) => rows,
        }
    }
}

/// Scalars render bare (strings unquoted), structured values as compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Build a property table from any JSON document.
///
/// Objects produce one row per key in document order, arrays one row per
/// index. Null, empty containers and bare scalars have no keys and render
/// the [`NO_DATA`] notice.
#[must_use]
pub fn key_value_table(value: Option<&Value>) -> KeyValueTable {
    let rows: Vec<KeyValueRow> = match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| KeyValueRow {
                key: key.clone(),
                value: render_value(value),
            })
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, value)| KeyValueRow {
                key: idx.to_string(),
                value: render_value(value),
            })
            .collect(),
        _ => Vec::new(),
    };

    if rows.is_empty() {
        KeyValueTable::NoData
    } else {
        KeyValueTable::Rows(rows)
    }
}

// =============================================================================
// Consistency check
// =============================================================================

/// One cell of the count matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountCell {
    pub subsystem: Subsystem,
    pub kind: EventKind,
    pub count: u64,
}

/// One missing-event row: (kind, event id, trace id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub kind: EventKind,
    pub event_id: String,
    pub trace_id: String,
}

impl From<&EventRecord> for DiffRow {
    fn from(record: &EventRecord) -> Self {
        Self {
            kind: record.kind,
            event_id: record.event_id.clone(),
            trace_id: record.trace_id.clone(),
        }
    }
}

/// Events present upstream but absent from `subsystem`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingList {
    pub subsystem: Subsystem,
    pub summary: String,
    pub rows: Vec<DiffRow>,
}

impl MissingList {
    fn new(subsystem: Subsystem, records: &[EventRecord]) -> Self {
        Self {
            subsystem,
            summary: missing_summary(records.len()),
            rows: records.iter().map(DiffRow::from).collect(),
        }
    }
}

#[must_use]
pub fn missing_summary(count: usize) -> String {
    format!("{count} events missing")
}

/// Display-ready consistency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationView {
    /// Six cells, subsystem-major in [`Subsystem::ALL`] order
    pub counts: Vec<CountCell>,
    pub missing_in_db: MissingList,
    pub missing_in_queue: MissingList,
    pub last_updated: Option<String>,
}

impl ReconciliationView {
    #[must_use]
    pub fn from_result(result: &ConsistencyCheckResult) -> Self {
        let counts = Subsystem::ALL
            .iter()
            .flat_map(|&subsystem| {
                EventKind::ALL.iter().map(move |&kind| CountCell {
                    subsystem,
                    kind,
                    count: result.counts.get(subsystem, kind),
                })
            })
            .collect();

        Self {
            counts,
            missing_in_db: MissingList::new(Subsystem::Db, &result.missing_in_db),
            missing_in_queue: MissingList::new(Subsystem::Queue, &result.missing_in_queue),
            last_updated: result.last_updated.clone(),
        }
    }

    #[must_use]
    pub fn count(&self, subsystem: Subsystem, kind: EventKind) -> Option<u64> {
        self.counts
            .iter()
            .find(|cell| cell.subsystem == subsystem && cell.kind == kind)
            .map(|cell| cell.count)
    }
}

/// Results panel contents; `None` hides the panel.
///
/// An absent result means "never audited", which is deliberately not the
/// same as a zeroed table.
#[must_use]
pub fn reconciliation_panel(result: Option<&ConsistencyCheckResult>) -> Option<ReconciliationView> {
    result.map(ReconciliationView::from_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConsistencyCounts, KindCounts};
    use serde_json::json;

    fn sample_result() -> ConsistencyCheckResult {
        ConsistencyCheckResult {
            counts: ConsistencyCounts {
                db: KindCounts {
                    motion: 5,
                    temperature: 3,
                },
                queue: KindCounts {
                    motion: 5,
                    temperature: 2,
                },
                processing: KindCounts {
                    motion: 5,
                    temperature: 3,
                },
            },
            missing_in_db: Vec::new(),
            missing_in_queue: vec![EventRecord {
                kind: EventKind::Temperature,
                event_id: "e1".to_string(),
                trace_id: "t1".to_string(),
                timestamp: None,
            }],
            last_updated: None,
            processing_time_ms: None,
        }
    }

    #[test]
    fn queue_gap_renders_one_diff_row() {
        let view = ReconciliationView::from_result(&sample_result());

        assert_eq!(view.missing_in_queue.summary, "1 events missing");
        assert_eq!(view.missing_in_queue.rows.len(), 1);
        let row = &view.missing_in_queue.rows[0];
        assert_eq!(row.kind, EventKind::Temperature);
        assert_eq!(row.event_id, "e1");
        assert_eq!(row.trace_id, "t1");

        assert_eq!(view.missing_in_db.summary, "0 events missing");
        assert!(view.missing_in_db.rows.is_empty());
    }

    #[test]
    fn count_matrix_has_six_cells() {
        let view = ReconciliationView::from_result(&sample_result());
        assert_eq!(view.counts.len(), 6);
        assert_eq!(view.count(Subsystem::Db, EventKind::Motion), Some(5));
        assert_eq!(view.count(Subsystem::Db, EventKind::Temperature), Some(3));
        assert_eq!(view.count(Subsystem::Queue, EventKind::Temperature), Some(2));
        assert_eq!(view.count(Subsystem::Processing, EventKind::Temperature), Some(3));
        assert_eq!(view.counts[0].subsystem, Subsystem::Db);
        assert_eq!(view.counts[5].subsystem, Subsystem::Processing);
    }

    #[test]
    fn absent_result_hides_panel() {
        assert!(reconciliation_panel(None).is_none());
    }

    #[test]
    fn consistent_result_still_shows_panel() {
        let mut result = sample_result();
        result.missing_in_queue.clear();
        result.counts = ConsistencyCounts::default();
        let view = reconciliation_panel(Some(&result)).unwrap();
        assert_eq!(view.count(Subsystem::Queue, EventKind::Motion), Some(0));
        assert_eq!(view.missing_in_queue.summary, "0 events missing");
    }

    #[test]
    fn empty_and_absent_snapshots_render_notice() {
        assert_eq!(key_value_table(None), KeyValueTable::NoData);
        assert_eq!(key_value_table(Some(&json!({}))), KeyValueTable::NoData);
        assert_eq!(key_value_table(Some(&json!(null))), KeyValueTable::NoData);
        assert_eq!(key_value_table(Some(&json!([]))), KeyValueTable::NoData);
        assert_eq!(key_value_table(Some(&json!(17))), KeyValueTable::NoData);
    }

    #[test]
    fn snapshot_rows_render_scalars_and_nested_values() {
        let stats = json!({
            "num_motion_events": 12,
            "last_updated": "2025-03-01T10:00:00Z",
            "healthy": true,
            "max_reading": {"value": 31.5, "unit": "C"},
            "missing": null
        });
        let table = key_value_table(Some(&stats));
        let rows = table.rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].key, "num_motion_events");
        assert_eq!(rows[0].value, "12");
        assert_eq!(rows[1].value, "2025-03-01T10:00:00Z");
        assert_eq!(rows[2].value, "true");
        assert_eq!(rows[3].value, r#"{"value":31.5,"unit":"C"}"#);
        assert_eq!(rows[4].value, "null");
    }

    #[test]
    fn object_rows_keep_service_key_order() {
        let stats: Value =
            serde_json::from_str(r#"{"num_motion_events":1,"max_temp":2,"avg":3}"#).unwrap();
        let table = key_value_table(Some(&stats));
        let keys: Vec<&str> = table
            .rows()
            .iter()
            .map(|row| row.key.as_str())
            .collect();
        assert_eq!(keys, ["num_motion_events", "max_temp", "avg"]);
    }

    #[test]
    fn placeholder_record_renders_message_row() {
        let table = key_value_table(Some(&json!({"message": "No motion events found"})));
        assert_eq!(
            table.rows(),
            &[KeyValueRow {
                key: "message".to_string(),
                value: "No motion events found".to_string(),
            }]
        );
    }
}
