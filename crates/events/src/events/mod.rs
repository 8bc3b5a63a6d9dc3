use serde::{Deserialize, Serialize};

use tawata_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod remediation;
pub mod scan;

pub use remediation::*;
pub use scan::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Dependency discovery, evaluation and upstream checks
    Scan(ScanEvent),

    /// Issue filing and deduplication
    Remediation(RemediationEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Scan(ScanEvent::RemoteFetchFailed { .. })
            | Self::Remediation(RemediationEvent::Failed { .. }) => Level::ERROR,

            Self::Scan(
                ScanEvent::DependencySkipped { .. } | ScanEvent::ManifestUnparsable { .. },
            )
            | Self::Remediation(
                RemediationEvent::LedgerUnavailable { .. }
                | RemediationEvent::DuplicateCheckFailed { .. },
            ) => Level::WARN,

            Self::Scan(
                ScanEvent::LocalEvaluated { .. } | ScanEvent::RemoteFetchStarted { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::Scan(_) => "tawata::events::scan",
            Self::Remediation(_) => "tawata::events::remediation",
        }
    }
}
