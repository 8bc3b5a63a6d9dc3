#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency whitelist audit for tawata
//!
//! Walks the installed dependency tree, checks whether each package limits
//! its published files (a `files` whitelist in `package.json`, or a
//! `.npmignore` upstream) and files an issue on upstream repositories that
//! do neither.

mod compliance;
mod discovery;
mod identity;
mod ledger;
mod remediation;
mod scanner;

pub use compliance::{evaluate, evaluate_parse};
pub use discovery::{discover_dependencies, read_local_manifest};
pub use identity::{normalize_repository_url, resolve_identity};
pub use ledger::RemediationLedger;
pub use remediation::{
    decide_remediation, RemediationDecision, Remediator, ISSUE_BODY, ISSUE_TITLE,
};
pub use scanner::DependencyScanner;

use tawata_config::Config;
use tawata_errors::Error;
use tawata_events::{EventEmitter, EventSender, ScanEvent};
use tawata_net::GitHubClient;
use tawata_types::ScanSummary;

/// Scan the dependency root of the current directory
///
/// The root is checked before credentials: a project without installed
/// dependencies completes without a token and without any request.
///
/// # Errors
///
/// Returns an error if the working directory is unavailable, no token is
/// configured, the HTTP client cannot be built, or the root cannot be listed.
pub async fn run_scan(config: &Config, events: Option<EventSender>) -> Result<ScanSummary, Error> {
    let root = Config::dependency_root()?;
    if !root.is_dir() {
        events.emit_scan(ScanEvent::RootMissing { root: root.clone() });
        return Ok(ScanSummary::empty(root));
    }

    let github = GitHubClient::from_config(config)?;
    let scanner = match events {
        Some(sender) => DependencyScanner::with_events(github, config, sender).await,
        None => DependencyScanner::new(github, config).await,
    };
    scanner.scan(&root).await
}
