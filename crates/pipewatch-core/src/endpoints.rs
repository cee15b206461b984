//! Endpoint URL construction.

use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use url::Url;

use crate::config::EndpointsConfig;
use crate::error::ConfigError;
use crate::model::EventKind;

/// Closed time range used for event queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventWindow {
    /// `[now - days, now]`
    #[must_use]
    pub fn trailing(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - ChronoDuration::days(i64::from(days)),
            end: now,
        }
    }

    /// ISO-8601 bounds with millisecond precision and a `Z` suffix
    #[must_use]
    pub fn bounds(&self) -> (String, String) {
        (
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }
}

/// Resolved endpoint URLs
#[derive(Debug, Clone)]
pub struct Endpoints {
    processing_stats: Url,
    analyzer_stats: Url,
    motion_events: Url,
    temperature_events: Url,
    check_update: Url,
    check_results: Url,
}

fn join(base: &Url, path: &str) -> Result<Url, ConfigError> {
    base.join(path)
        .map_err(|e| ConfigError::ValidationError(format!("invalid endpoint path {path:?}: {e}")))
}

impl Endpoints {
    pub fn from_config(config: &EndpointsConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "endpoints.base_url {:?} is not a valid URL: {e}",
                config.base_url
            ))
        })?;
        Ok(Self {
            processing_stats: join(&base, &config.processing_stats)?,
            analyzer_stats: join(&base, &config.analyzer_stats)?,
            motion_events: join(&base, &config.motion_events)?,
            temperature_events: join(&base, &config.temperature_events)?,
            check_update: join(&base, &config.check_update)?,
            check_results: join(&base, &config.check_results)?,
        })
    }

    #[must_use]
    pub fn processing_stats(&self) -> String {
        self.processing_stats.to_string()
    }

    #[must_use]
    pub fn analyzer_stats(&self) -> String {
        self.analyzer_stats.to_string()
    }

    /// Event query for one kind, window bounds URL-escaped
    #[must_use]
    pub fn events(&self, kind: EventKind, window: &EventWindow) -> String {
        let mut url = match kind {
            EventKind::Motion => self.motion_events.clone(),
            EventKind::Temperature => self.temperature_events.clone(),
        };
        let (start, end) = window.bounds();
        url.query_pairs_mut()
            .clear()
            .append_pair("start_timestamp", &start)
            .append_pair("end_timestamp", &end);
        url.to_string()
    }

    #[must_use]
    pub fn check_update(&self) -> String {
        self.check_update.to_string()
    }

    #[must_use]
    pub fn check_results(&self) -> String {
        self.check_results.to_string()
    }
}
