use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tawata_types::DependencyStatus;

use super::FailureContext;

/// Dependency scan events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// Dependency root listed
    Started { root: PathBuf, entries: usize },

    /// Dependency root does not exist; nothing to do
    RootMissing { root: PathBuf },

    /// Directory dropped before a report could be produced
    DependencySkipped {
        path: PathBuf,
        failure: FailureContext,
    },

    /// A manifest (local or upstream) is not valid JSON
    ManifestUnparsable {
        source: String,
        failure: FailureContext,
    },

    /// No repository identity in the local manifest
    IdentityUnresolved {
        package: String,
        failure: FailureContext,
    },

    /// Local whitelist evaluated
    LocalEvaluated { package: String, compliance: String },

    /// Upstream contents request issued
    RemoteFetchStarted { identity: String, file: String },

    /// Upstream contents request failed for infrastructure reasons
    RemoteFetchFailed {
        identity: String,
        file: String,
        failure: FailureContext,
    },

    /// All stages finished for one dependency
    DependencySettled {
        package: String,
        status: DependencyStatus,
    },

    /// Every dependency settled
    Completed {
        dependencies: usize,
        skipped: usize,
        issues_filed: usize,
        duration_ms: u64,
    },
}
