use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Issue filing events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RemediationEvent {
    /// Upstream already complies or compliance is unknown
    NotFiled { identity: String, reason: String },

    /// Already reported upstream, in the ledger, or earlier in this run
    Duplicate { identity: String, reason: String },

    /// Looking up existing issues failed; filing proceeds anyway
    DuplicateCheckFailed {
        identity: String,
        failure: FailureContext,
    },

    /// Dry run: the issue would have been filed
    WouldFile { identity: String },

    /// Issue created
    Filed {
        identity: String,
        number: u64,
        url: String,
    },

    /// Issue creation failed; not retried
    Failed {
        identity: String,
        failure: FailureContext,
    },

    /// Ledger could not be read or written
    LedgerUnavailable {
        path: PathBuf,
        failure: FailureContext,
    },
}
