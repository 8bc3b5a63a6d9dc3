#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for tawata
//!
//! This crate provides the data model shared by the scanner, the network
//! layer and the CLI: repository identities, compliance results, remote
//! content states and the per-dependency scan reports.

pub mod compliance;
pub mod identity;
pub mod remote;
pub mod reports;

// Re-export commonly used types
pub use compliance::{Compliance, Manifest, ManifestParse};
pub use identity::RepoIdentity;
pub use remote::{RemoteContent, RemoteIgnore, RemoteManifest, RemoteState};
pub use reports::{
    DependencyReport, DependencyStatus, DuplicateSource, RemediationOutcome, ScanSummary,
    SkippedDependency, StatusCounts,
};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tty,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Tty
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
