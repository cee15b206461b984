//! Error types for pipewatch-core

use std::fmt::Write;
use thiserror::Error;

/// Remediation command for resolving an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemediationCommand {
    /// Short label describing the command purpose
    pub label: String,
    /// Command to run
    pub command: String,
}

/// Actionable remediation guidance for an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Remediation {
    /// One-line summary of how to fix the issue
    pub summary: String,
    /// Suggested commands to resolve or diagnose the issue
    pub commands: Vec<RemediationCommand>,
    /// Additional alternative guidance
    pub alternatives: Vec<String>,
}

impl Remediation {
    /// Create a new remediation with a summary
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            commands: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Add a suggested command
    #[must_use]
    pub fn command(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.push(RemediationCommand {
            label: label.into(),
            command: command.into(),
        });
        self
    }

    /// Add an alternative suggestion
    #[must_use]
    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Render remediation text for human-readable output
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "To fix:");
        let _ = writeln!(output, "  {}", self.summary);

        if !self.commands.is_empty() {
            let _ = writeln!(output, "  Commands:");
            for cmd in &self.commands {
                let _ = writeln!(output, "    - {}: {}", cmd.label, cmd.command);
            }
        }

        if !self.alternatives.is_empty() {
            let _ = writeln!(output, "  Alternatives:");
            for alt in &self.alternatives {
                let _ = writeln!(output, "    - {alt}");
            }
        }

        output
    }
}

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipewatch-core
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint fetch errors that escaped to a caller wanting a hard failure
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Logging setup errors
    #[error("Logging error: {0}")]
    Log(#[from] crate::logging::LogError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Return remediation guidance when available.
    #[must_use]
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::Fetch(err) => Some(err.remediation()),
            Self::Config(err) => Some(err.remediation()),
            Self::Log(_) => Some(
                Remediation::new("Check the log file path and log level, then retry.")
                    .command("Override level", "RUST_LOG=info pw watch")
                    .alternative("Drop the log file setting to log to stderr only."),
            ),
            Self::Io(_) => Some(
                Remediation::new("Check filesystem permissions and paths, then retry.")
                    .alternative("Verify the config directory exists and is readable."),
            ),
            Self::Json(_) => None,
        }
    }
}

/// Result of a single endpoint call
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Uniform error value produced by the fetch adapter.
///
/// Every failure mode of an HTTP call collapses into one of these two
/// variants; nothing else leaves the adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network, DNS or body-decoding failure
    #[error("{message}")]
    Transport { message: String },

    /// Non-2xx HTTP response
    #[error("HTTP error! Status: {status}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    Status {
        status: u16,
        /// `message` field of the response body, when the server sent one
        message: Option<String>,
    },
}

impl FetchError {
    /// Build a transport error from any displayable failure
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }

    /// HTTP status code, when the failure was a status error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// Whether the server answered 404
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Inline message shown in a degraded panel or status area
    #[must_use]
    pub fn inline_message(&self) -> String {
        format!("Failed to fetch data: {self}")
    }

    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::Transport { .. } => Remediation::new(
                "Could not reach the pipeline gateway. Check the base URL and that the services are up.",
            )
            .command("Show effective config", "pw config show")
            .alternative("Override the gateway with --base-url or PIPEWATCH_BASE_URL."),
            Self::Status { status, .. } if *status >= 500 => Remediation::new(format!(
                "The upstream service failed with HTTP {status}. Check its logs and retry."
            ))
            .command("Retry a single cycle", "pw snapshot"),
            Self::Status { status, .. } => Remediation::new(format!(
                "The gateway rejected the request with HTTP {status}. Verify the endpoint paths."
            ))
            .command("Show effective config", "pw config show")
            .alternative("Adjust the [endpoints] section of pipewatch.toml."),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file {0}: {1}")]
    ReadFailed(String, String),

    #[error("Failed to parse config: {0}")]
    ParseFailed(String),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ConfigError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::FileNotFound(path) => Remediation::new(format!(
                "Config file not found: {path}. Verify the path and retry."
            ))
            .command("Check path", format!("ls -l \"{path}\""))
            .alternative("Pass --config with the correct path."),
            Self::ReadFailed(path, _) => Remediation::new(format!(
                "Failed to read config file: {path}. Check permissions."
            ))
            .command("Check permissions", format!("ls -l \"{path}\""))
            .alternative("Ensure the file is readable by the current user."),
            Self::ParseFailed(_) => Remediation::new("Config parse failed. Fix the syntax and retry.")
                .command("Show defaults", "pw config show")
                .alternative("Validate the file as TOML."),
            Self::SerializeFailed(_) => {
                Remediation::new("Failed to serialize configuration. Check config values.")
                    .alternative("Recreate the config from known-good defaults.")
            }
            Self::ValidationError(_) => {
                Remediation::new("Config validation failed. Fix the invalid fields and retry.")
                    .command("Show effective config", "pw config show")
                    .alternative("Review validation errors and adjust pipewatch.toml.")
            }
        }
    }
}

/// Format an error with remediation guidance for display.
#[must_use]
pub fn format_error_with_remediation(error: &Error) -> String {
    let mut output = format!("Error: {error}");
    if let Some(remediation) = error.remediation() {
        output.push('\n');
        output.push('\n');
        output.push_str(&remediation.render_plain());
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_matches_inline_format() {
        let err = FetchError::Status {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP error! Status: 503");
        assert_eq!(
            err.inline_message(),
            "Failed to fetch data: HTTP error! Status: 503"
        );
    }

    #[test]
    fn status_error_includes_server_message() {
        let err = FetchError::Status {
            status: 400,
            message: Some("Error running consistency check: boom".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error! Status: 400 (Error running consistency check: boom)"
        );
        assert_eq!(err.status_code(), Some(400));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_detected() {
        let err = FetchError::Status {
            status: 404,
            message: Some("No consistency checks have been run yet".to_string()),
        };
        assert!(err.is_not_found());
        assert!(!FetchError::transport("connection refused").is_not_found());
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = FetchError::transport("dns failure");
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "dns failure");
    }

    #[test]
    fn remediation_available_for_error_variants() {
        let errors = vec![
            Error::Fetch(FetchError::transport("refused")),
            Error::Fetch(FetchError::Status {
                status: 502,
                message: None,
            }),
            Error::Fetch(FetchError::Status {
                status: 403,
                message: None,
            }),
            Error::Config(ConfigError::FileNotFound("pipewatch.toml".to_string())),
            Error::Config(ConfigError::ReadFailed(
                "pipewatch.toml".to_string(),
                "denied".to_string(),
            )),
            Error::Config(ConfigError::ParseFailed("bad".to_string())),
            Error::Config(ConfigError::SerializeFailed("bad".to_string())),
            Error::Config(ConfigError::ValidationError("bad".to_string())),
            Error::Io(std::io::Error::other("io")),
        ];

        for err in errors {
            let remediation = err.remediation();
            assert!(remediation.is_some(), "missing remediation for {err}");
            assert!(!remediation.unwrap().summary.is_empty());
        }
    }

    #[test]
    fn format_error_includes_remediation_block() {
        let err = Error::Config(ConfigError::FileNotFound("/nope.toml".to_string()));
        let rendered = format_error_with_remediation(&err);
        assert!(rendered.starts_with("Error: Config error: Config file not found: /nope.toml"));
        assert!(rendered.contains("To fix:"));
        assert!(rendered.contains("--config"));
    }
}
