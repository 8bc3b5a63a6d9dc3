//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields. The
//! level comes from `AppEvent::log_level`, so the subscriber's filter decides
//! what is shown.

use tawata_events::{AppEvent, RemediationEvent, ScanEvent};
use tracing::Level;

/// Emit a tracing event at a runtime-selected level
macro_rules! log_at {
    ($level:expr, target: $target:literal, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!(target: $target, $($rest)+),
            Level::WARN => tracing::warn!(target: $target, $($rest)+),
            Level::INFO => tracing::info!(target: $target, $($rest)+),
            Level::DEBUG => tracing::debug!(target: $target, $($rest)+),
            Level::TRACE => tracing::trace!(target: $target, $($rest)+),
        }
    };
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let level = event.log_level();

    match event {
        AppEvent::Scan(scan) => match scan {
            ScanEvent::Started { root, entries } => {
                log_at!(level, target: "tawata::events::scan",
                    root = %root.display(), entries = entries, "Scan started");
            }
            ScanEvent::RootMissing { root } => {
                log_at!(level, target: "tawata::events::scan",
                    root = %root.display(), "Dependency root not found, nothing to scan");
            }
            ScanEvent::DependencySkipped { path, failure } => {
                log_at!(level, target: "tawata::events::scan",
                    path = %path.display(),
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Dependency skipped");
            }
            ScanEvent::ManifestUnparsable { source, failure } => {
                log_at!(level, target: "tawata::events::scan",
                    source = %source,
                    code = ?failure.code,
                    message = %failure.message,
                    "Manifest is not valid JSON");
            }
            ScanEvent::IdentityUnresolved { package, failure } => {
                log_at!(level, target: "tawata::events::scan",
                    package = %package,
                    code = ?failure.code,
                    "No GitHub repository in manifest");
            }
            ScanEvent::LocalEvaluated { package, compliance } => {
                log_at!(level, target: "tawata::events::scan",
                    package = %package, compliance = %compliance, "Local manifest evaluated");
            }
            ScanEvent::RemoteFetchStarted { identity, file } => {
                log_at!(level, target: "tawata::events::scan",
                    identity = %identity, file = %file, "Fetching upstream file");
            }
            ScanEvent::RemoteFetchFailed {
                identity,
                file,
                failure,
            } => {
                log_at!(level, target: "tawata::events::scan",
                    identity = %identity,
                    file = %file,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Upstream fetch failed");
            }
            ScanEvent::DependencySettled { package, status } => {
                log_at!(level, target: "tawata::events::scan",
                    package = %package, status = status.as_str(), "Dependency settled");
            }
            ScanEvent::Completed {
                dependencies,
                skipped,
                issues_filed,
                duration_ms,
            } => {
                log_at!(level, target: "tawata::events::scan",
                    dependencies = dependencies,
                    skipped = skipped,
                    issues_filed = issues_filed,
                    duration_ms = duration_ms,
                    "Scan completed");
            }
        },

        AppEvent::Remediation(remediation) => match remediation {
            RemediationEvent::NotFiled { identity, reason } => {
                log_at!(level, target: "tawata::events::remediation",
                    identity = %identity, reason = %reason, "No issue needed");
            }
            RemediationEvent::Duplicate { identity, reason } => {
                log_at!(level, target: "tawata::events::remediation",
                    identity = %identity, reason = %reason, "Already reported");
            }
            RemediationEvent::DuplicateCheckFailed { identity, failure } => {
                log_at!(level, target: "tawata::events::remediation",
                    identity = %identity,
                    code = ?failure.code,
                    message = %failure.message,
                    "Could not list existing issues, filing anyway");
            }
            RemediationEvent::WouldFile { identity } => {
                log_at!(level, target: "tawata::events::remediation",
                    identity = %identity, "Dry run: would open issue");
            }
            RemediationEvent::Filed {
                identity,
                number,
                url,
            } => {
                log_at!(level, target: "tawata::events::remediation",
                    identity = %identity, number = number, url = %url, "Issue opened");
            }
            RemediationEvent::Failed { identity, failure } => {
                log_at!(level, target: "tawata::events::remediation",
                    identity = %identity,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Opening issue failed");
            }
            RemediationEvent::LedgerUnavailable { path, failure } => {
                log_at!(level, target: "tawata::events::remediation",
                    path = %path.display(),
                    message = %failure.message,
                    "Remediation ledger unavailable");
            }
        },
    }
}
