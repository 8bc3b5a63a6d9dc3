//! Scan report type definitions

use crate::{Compliance, RemoteState, RepoIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tawata_errors::{NetworkError, ScanError};

/// Why filing was skipped for an otherwise eligible repository
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DuplicateSource {
    /// An open issue with the same title already exists upstream
    OpenIssue { number: u64, url: String },
    /// The local ledger recorded an attempt within the cooldown window
    Ledger { last_attempt: DateTime<Utc> },
    /// Another dependency in this run already filed for the same repository
    SameRun,
}

/// Outcome of the remediation stage for one dependency
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemediationOutcome {
    /// A whitelist or ignore-list exists somewhere
    NotRequired,
    /// Compliance could not be established either way
    Undetermined { reason: String },
    /// Remediation is switched off
    Disabled,
    /// Would have filed, but running in dry-run mode
    DryRun,
    /// Already reported
    Duplicate { source: DuplicateSource },
    /// Issue created upstream
    Filed { number: u64, url: String },
    /// The create-issue request failed
    Failed { error: NetworkError },
}

/// Overall classification of a settled dependency
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    Compliant,
    NonCompliant,
    Remediated,
    Unresolved,
    Failed,
}

impl DependencyStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non-compliant",
            Self::Remediated => "remediated",
            Self::Unresolved => "unresolved",
            Self::Failed => "failed",
        }
    }
}

/// Settled record for one dependency directory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Dependency directory
    pub path: PathBuf,
    /// `name` from the local manifest
    pub name: Option<String>,
    /// `version` from the local manifest
    pub version: Option<String>,
    /// Resolved upstream repository
    pub identity: Option<RepoIdentity>,
    /// Whitelist state of the installed manifest
    pub local: Compliance,
    /// Upstream state; `None` when no identity could be resolved
    pub remote: Option<RemoteState>,
    /// Remediation stage result
    pub remediation: RemediationOutcome,
}

impl DependencyReport {
    /// Name used in output: manifest name, else directory name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    #[must_use]
    pub fn local_compliant(&self) -> bool {
        self.local.is_whitelist()
    }

    /// Upstream compliance, `None` when upstream was not checked.
    #[must_use]
    pub fn remote_compliant(&self) -> Option<bool> {
        self.remote.as_ref().map(RemoteState::is_compliant)
    }

    /// Whether any stage ended in an error or an unknown state.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.local.is_unknown()
            || self
                .remote
                .as_ref()
                .is_some_and(|remote| !remote.fetch_errors().is_empty())
            || matches!(self.remediation, RemediationOutcome::Failed { .. })
    }

    #[must_use]
    pub fn status(&self) -> DependencyStatus {
        if self.has_errors() {
            DependencyStatus::Failed
        } else if self.local_compliant() || self.remote_compliant() == Some(true) {
            DependencyStatus::Compliant
        } else if self.identity.is_none() {
            DependencyStatus::Unresolved
        } else if matches!(self.remediation, RemediationOutcome::Filed { .. }) {
            DependencyStatus::Remediated
        } else {
            DependencyStatus::NonCompliant
        }
    }
}

/// Directory entry that never produced a report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkippedDependency {
    pub path: PathBuf,
    pub reason: ScanError,
}

/// Per-status tallies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub compliant: usize,
    pub non_compliant: usize,
    pub remediated: usize,
    pub unresolved: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Result of a full scan, in discovery order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Dependency root that was scanned
    pub root: PathBuf,
    /// Whether the root existed at all
    pub root_present: bool,
    pub dependencies: Vec<DependencyReport>,
    pub skipped: Vec<SkippedDependency>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanSummary {
    /// Summary for a missing dependency root.
    #[must_use]
    pub fn empty(root: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            root,
            root_present: false,
            dependencies: Vec::new(),
            skipped: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            skipped: self.skipped.len(),
            ..StatusCounts::default()
        };
        for dependency in &self.dependencies {
            match dependency.status() {
                DependencyStatus::Compliant => counts.compliant += 1,
                DependencyStatus::NonCompliant => counts.non_compliant += 1,
                DependencyStatus::Remediated => counts.remediated += 1,
                DependencyStatus::Unresolved => counts.unresolved += 1,
                DependencyStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Whether any dependency failed or was skipped.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.skipped.is_empty() || self.dependencies.iter().any(DependencyReport::has_errors)
    }

    /// Issues created during this run.
    #[must_use]
    pub fn issues_filed(&self) -> usize {
        self.dependencies
            .iter()
            .filter(|d| matches!(d.remediation, RemediationOutcome::Filed { .. }))
            .count()
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from((self.finished_at - self.started_at).num_milliseconds()).unwrap_or(0)
    }
}
