//! Upstream repository content states

use crate::Compliance;
use serde::{Deserialize, Serialize};
use tawata_errors::NetworkError;

/// Result of a successful contents lookup.
///
/// `NotFound` is a valid answer ("the file does not exist"), not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteContent {
    Found(String),
    NotFound,
}

/// Upstream `package.json` state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RemoteManifest {
    Present(Compliance),
    Absent,
    FetchFailed(NetworkError),
}

impl RemoteManifest {
    #[must_use]
    pub fn is_whitelist(&self) -> bool {
        matches!(self, Self::Present(compliance) if compliance.is_whitelist())
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Present(compliance) => compliance.label(),
            Self::Absent => "no package.json".to_string(),
            Self::FetchFailed(_) => "fetch failed".to_string(),
        }
    }
}

/// Upstream `.npmignore` state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RemoteIgnore {
    Present,
    Absent,
    FetchFailed(NetworkError),
}

impl RemoteIgnore {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::FetchFailed(_) => "fetch failed",
        }
    }
}

/// Both upstream checks for one dependency, gathered before any decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteState {
    pub manifest: RemoteManifest,
    pub ignore: RemoteIgnore,
}

impl RemoteState {
    /// True when upstream declares a whitelist or ships an ignore-list.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.manifest.is_whitelist() || matches!(self.ignore, RemoteIgnore::Present)
    }

    /// Errors hit while fetching either file.
    #[must_use]
    pub fn fetch_errors(&self) -> Vec<&NetworkError> {
        let mut errors = Vec::new();
        if let RemoteManifest::FetchFailed(error) = &self.manifest {
            errors.push(error);
        }
        if let RemoteIgnore::FetchFailed(error) = &self.ignore {
            errors.push(error);
        }
        errors
    }
}
