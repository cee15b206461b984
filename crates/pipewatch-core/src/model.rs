//! Wire types shared with the pipeline services.
//!
//! Only the consistency-check types have a fixed schema. Stats and event
//! payloads are kept as raw JSON because the dashboard renders whatever keys
//! the services send.

use serde::{Deserialize, Serialize};

/// Event kinds tracked by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Motion,
    Temperature,
}

impl EventKind {
    /// Both kinds in display order
    pub const ALL: [Self; 2] = [Self::Motion, Self::Temperature];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Temperature => "temperature",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystems reconciled by the consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Persistent store
    Db,
    /// Message queue
    Queue,
    /// Processing stage
    Processing,
}

impl Subsystem {
    /// All subsystems in display order
    pub const ALL: [Self; 3] = [Self::Db, Self::Queue, Self::Processing];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Db => "db",
            Self::Queue => "queue",
            Self::Processing => "processing",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored pipeline event.
///
/// Audit diffs carry only kind and ids, so `timestamp` is optional here even
/// though storage always sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub event_id: String,
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Per-kind counts for one subsystem. Both cells are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KindCounts {
    pub motion: u64,
    pub temperature: u64,
}

impl KindCounts {
    #[must_use]
    pub const fn get(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::Motion => self.motion,
            EventKind::Temperature => self.temperature,
        }
    }
}

/// Subsystem × kind count matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsistencyCounts {
    pub db: KindCounts,
    pub queue: KindCounts,
    pub processing: KindCounts,
}

impl ConsistencyCounts {
    #[must_use]
    pub const fn subsystem(&self, subsystem: Subsystem) -> KindCounts {
        match subsystem {
            Subsystem::Db => self.db,
            Subsystem::Queue => self.queue,
            Subsystem::Processing => self.processing,
        }
    }

    #[must_use]
    pub const fn get(&self, subsystem: Subsystem, kind: EventKind) -> u64 {
        self.subsystem(subsystem).get(kind)
    }
}

/// Latest stored audit result from the consistency-check service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyCheckResult {
    pub counts: ConsistencyCounts,
    #[serde(default)]
    pub missing_in_db: Vec<EventRecord>,
    #[serde(default)]
    pub missing_in_queue: Vec<EventRecord>,
    /// UTC completion time stamped by the audit service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

/// Response to a recompute request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub processing_time_ms: u64,
}
