//! Ambient snapshot: the four read-only panels refreshed every cycle.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::FetchResult;
use crate::model::EventKind;

/// One panel's last outcome
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Panel {
    /// No cycle has completed yet
    #[default]
    Loading,
    Ready { data: Value },
    Failed { message: String },
}

impl Panel {
    /// Fold a fetch outcome into a panel, rendering errors inline
    #[must_use]
    pub fn from_fetch(outcome: FetchResult<Value>) -> Self {
        match outcome {
            Ok(data) => Self::Ready { data },
            Err(e) => Self::Failed {
                message: e.inline_message(),
            },
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Ready { data } => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Processing stats, analyzer stats and the latest event of each kind
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AmbientSnapshot {
    pub processing_stats: Panel,
    pub analyzer_stats: Panel,
    pub latest_motion: Panel,
    pub latest_temperature: Panel,
}

impl AmbientSnapshot {
    /// Each input lands in its own panel; one failure never blanks another.
    #[must_use]
    pub fn from_fetches(
        processing_stats: FetchResult<Value>,
        analyzer_stats: FetchResult<Value>,
        motion_events: FetchResult<Value>,
        temperature_events: FetchResult<Value>,
    ) -> Self {
        Self {
            processing_stats: Panel::from_fetch(processing_stats),
            analyzer_stats: Panel::from_fetch(analyzer_stats),
            latest_motion: Panel::from_fetch(
                motion_events.map(|events| most_recent_event(&events, EventKind::Motion)),
            ),
            latest_temperature: Panel::from_fetch(
                temperature_events
                    .map(|events| most_recent_event(&events, EventKind::Temperature)),
            ),
        }
    }

    #[must_use]
    pub fn latest(&self, kind: EventKind) -> &Panel {
        match kind {
            EventKind::Motion => &self.latest_motion,
            EventKind::Temperature => &self.latest_temperature,
        }
    }
}

/// Placeholder record shown when a window holds no events of `kind`
#[must_use]
pub fn no_events_placeholder(kind: EventKind) -> Value {
    json!({ "message": format!("No {kind} events found") })
}

fn parsed_timestamp(event: &Value) -> Option<DateTime<FixedOffset>> {
    event
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
}

/// Pick the most recent event from a storage query result.
///
/// The event with the latest parseable `timestamp` wins. When no timestamp
/// parses, or several tie, the later array position wins. A non-array or
/// empty result yields the placeholder record.
#[must_use]
pub fn most_recent_event(events: &Value, kind: EventKind) -> Value {
    let Some(items) = events.as_array().filter(|items| !items.is_empty()) else {
        return no_events_placeholder(kind);
    };

    let mut best: Option<(usize, Option<DateTime<FixedOffset>>)> = None;
    for (idx, event) in items.iter().enumerate() {
        let ts = parsed_timestamp(event);
        let replace = match &best {
            None => true,
            Some((_, best_ts)) => match (ts, best_ts) {
                (Some(ts), Some(best_ts)) => ts >= *best_ts,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => true,
            },
        };
        if replace {
            best = Some((idx, ts));
        }
    }

    best.map_or_else(|| no_events_placeholder(kind), |(idx, _)| items[idx].clone())
}
