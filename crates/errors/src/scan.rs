//! Dependency scan error types

use std::borrow::Cow;

use crate::{NetworkError, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ScanError {
    #[error("dependency root {path} could not be listed: {message}")]
    RootUnreadable { path: String, message: String },

    #[error("manifest {path} could not be read: {message}")]
    ManifestUnreadable { path: String, message: String },

    #[error("manifest {source_name} could not be parsed: {message}")]
    ManifestUnparsable {
        source_name: String,
        message: String,
    },

    #[error("no repository identity could be resolved for {package}")]
    IdentityUnresolvable { package: String },

    #[error("fetching {file} from {identity} failed: {error}")]
    RemoteFetchFailed {
        identity: String,
        file: String,
        error: NetworkError,
    },

    #[error("filing remediation issue on {identity} failed: {error}")]
    RemediationFailed {
        identity: String,
        error: NetworkError,
    },

    #[error("remediation ledger {path} is unusable: {message}")]
    LedgerUnavailable { path: String, message: String },
}

impl UserFacingError for ScanError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RootUnreadable { .. } => {
                Some("Run tawata from a project directory with a readable node_modules folder.")
            }
            Self::ManifestUnreadable { .. } | Self::ManifestUnparsable { .. } => {
                Some("Reinstall the dependency to restore a valid package.json.")
            }
            Self::RemoteFetchFailed { error, .. } | Self::RemediationFailed { error, .. } => {
                error.user_hint()
            }
            Self::LedgerUnavailable { .. } => {
                Some("Check remediation.ledger_path points to a writable JSON file.")
            }
            Self::IdentityUnresolvable { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteFetchFailed { error, .. } | Self::RemediationFailed { error, .. } => {
                error.is_retryable()
            }
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::RootUnreadable { .. } => "scan.root_unreadable",
            Self::ManifestUnreadable { .. } => "scan.manifest_unreadable",
            Self::ManifestUnparsable { .. } => "scan.manifest_unparsable",
            Self::IdentityUnresolvable { .. } => "scan.identity_unresolvable",
            Self::RemoteFetchFailed { .. } => "scan.remote_fetch_failed",
            Self::RemediationFailed { .. } => "scan.remediation_failed",
            Self::LedgerUnavailable { .. } => "scan.ledger_unavailable",
        })
    }
}
