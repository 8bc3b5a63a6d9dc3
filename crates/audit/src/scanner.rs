//! Dependency scanning engine

use crate::compliance::evaluate_parse;
use crate::discovery::{discover_dependencies, read_local_manifest};
use crate::identity::resolve_identity;
use crate::ledger::RemediationLedger;
use crate::remediation::{decide_remediation, RemediationDecision, Remediator};
use chrono::Utc;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tawata_config::constants::{IGNORE_FILE, MANIFEST_FILE};
use tawata_config::resources_semaphore::{acquire_semaphore_permit, create_semaphore};
use tawata_config::Config;
use tawata_errors::{Error, NetworkError, ScanError};
use tawata_events::{EventEmitter, EventSender, FailureContext, RemediationEvent, ScanEvent};
use tawata_net::GitHubClient;
use tawata_types::{
    DependencyReport, ManifestParse, RemediationOutcome, RemoteContent, RemoteIgnore,
    RemoteManifest, RemoteState, RepoIdentity, ScanSummary, SkippedDependency,
};
use tokio::sync::Semaphore;

/// Scans every installed dependency and files remediation issues upstream
pub struct DependencyScanner {
    github: GitHubClient,
    semaphore: Arc<Semaphore>,
    remediator: Remediator,
    remediation_enabled: bool,
    event_sender: Option<EventSender>,
}

impl EventEmitter for DependencyScanner {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl DependencyScanner {
    /// Create a scanner without event reporting
    pub async fn new(github: GitHubClient, config: &Config) -> Self {
        Self::build(github, config, None).await
    }

    /// Create a scanner that reports progress on `event_sender`
    pub async fn with_events(
        github: GitHubClient,
        config: &Config,
        event_sender: EventSender,
    ) -> Self {
        Self::build(github, config, Some(event_sender)).await
    }

    async fn build(github: GitHubClient, config: &Config, event_sender: Option<EventSender>) -> Self {
        let semaphore = create_semaphore(config.network.max_concurrent_requests);

        let ledger = match &config.remediation.ledger_path {
            Some(path) => match RemediationLedger::load(path.clone()).await {
                Ok(ledger) => Some(ledger),
                Err(e) => {
                    event_sender.emit_remediation(RemediationEvent::LedgerUnavailable {
                        path: path.clone(),
                        failure: FailureContext::from_error(&e),
                    });
                    None
                }
            },
            None => None,
        };

        let remediator = Remediator::new(
            github.clone(),
            semaphore.clone(),
            config.remediation.clone(),
            ledger,
            event_sender.clone(),
        );

        Self {
            github,
            semaphore,
            remediator,
            remediation_enabled: config.remediation.enabled,
            event_sender,
        }
    }

    /// Scan every dependency directory under `root`
    ///
    /// A missing root is not an error: the summary is empty and no request
    /// is made. Per-dependency failures are recorded in the summary and never
    /// abort the scan.
    ///
    /// # Errors
    ///
    /// Returns an error only if an existing root cannot be listed.
    pub async fn scan(&self, root: &Path) -> Result<ScanSummary, Error> {
        if !root.is_dir() {
            self.emit_scan(ScanEvent::RootMissing {
                root: root.to_path_buf(),
            });
            return Ok(ScanSummary::empty(root.to_path_buf()));
        }

        let started_at = Utc::now();
        let directories = discover_dependencies(root)?;
        self.emit_scan(ScanEvent::Started {
            root: root.to_path_buf(),
            entries: directories.len(),
        });

        // join_all keeps discovery order in the results
        let settled = join_all(directories.into_iter().map(|dir| self.check_dependency(dir))).await;

        let mut dependencies = Vec::new();
        let mut skipped = Vec::new();
        for result in settled {
            match result {
                Ok(report) => dependencies.push(report),
                Err(skip) => skipped.push(skip),
            }
        }

        if let Some(ledger) = self.remediator.ledger() {
            if let Err(e) = ledger.save().await {
                self.emit_remediation(RemediationEvent::LedgerUnavailable {
                    path: ledger.path().to_path_buf(),
                    failure: FailureContext::from_error(&e),
                });
            }
        }

        let summary = ScanSummary {
            root: root.to_path_buf(),
            root_present: true,
            dependencies,
            skipped,
            started_at,
            finished_at: Utc::now(),
        };

        self.emit_scan(ScanEvent::Completed {
            dependencies: summary.dependencies.len(),
            skipped: summary.skipped.len(),
            issues_filed: summary.issues_filed(),
            duration_ms: summary.duration_ms(),
        });

        Ok(summary)
    }

    /// Run every stage for one dependency directory
    async fn check_dependency(&self, dir: PathBuf) -> Result<DependencyReport, SkippedDependency> {
        let text = match read_local_manifest(&dir) {
            Ok(text) => text,
            Err(reason) => {
                self.emit_scan(ScanEvent::DependencySkipped {
                    path: dir.clone(),
                    failure: FailureContext::from_error(&reason),
                });
                return Err(SkippedDependency { path: dir, reason });
            }
        };

        let parse = ManifestParse::from_text(&text);
        self.report_unparsable(&parse, dir.join(MANIFEST_FILE).display().to_string());

        let local = evaluate_parse(&parse);
        let mut report = DependencyReport {
            name: parse.string_field("name"),
            version: parse.string_field("version"),
            identity: parse.manifest().and_then(resolve_identity),
            path: dir,
            local,
            remote: None,
            remediation: RemediationOutcome::NotRequired,
        };
        let package = report.display_name();

        self.emit_scan(ScanEvent::LocalEvaluated {
            package: package.clone(),
            compliance: report.local.label(),
        });

        match report.identity.clone() {
            None => {
                let reason = ScanError::IdentityUnresolvable {
                    package: package.clone(),
                };
                self.emit_scan(ScanEvent::IdentityUnresolved {
                    package: package.clone(),
                    failure: FailureContext::from_error(&reason),
                });
                if !report.local.is_whitelist() {
                    report.remediation = RemediationOutcome::Undetermined {
                        reason: "no repository identity".to_string(),
                    };
                }
            }
            Some(identity) => {
                let (manifest, ignore) = futures::join!(
                    self.fetch_remote_manifest(&identity),
                    self.fetch_remote_ignore(&identity)
                );

                report.remediation = match decide_remediation(&report.local, &manifest, &ignore) {
                    RemediationDecision::File if !self.remediation_enabled => {
                        self.emit_remediation(RemediationEvent::NotFiled {
                            identity: identity.to_string(),
                            reason: "remediation disabled".to_string(),
                        });
                        RemediationOutcome::Disabled
                    }
                    RemediationDecision::File => self.remediator.remediate(&identity).await,
                    RemediationDecision::NotRequired => {
                        self.emit_remediation(RemediationEvent::NotFiled {
                            identity: identity.to_string(),
                            reason: "whitelist or ignore-list present".to_string(),
                        });
                        RemediationOutcome::NotRequired
                    }
                    RemediationDecision::Undetermined(reason) => {
                        self.emit_remediation(RemediationEvent::NotFiled {
                            identity: identity.to_string(),
                            reason: reason.clone(),
                        });
                        RemediationOutcome::Undetermined { reason }
                    }
                };
                report.remote = Some(RemoteState { manifest, ignore });
            }
        }

        self.emit_scan(ScanEvent::DependencySettled {
            package,
            status: report.status(),
        });
        Ok(report)
    }

    async fn fetch_remote_manifest(&self, identity: &RepoIdentity) -> RemoteManifest {
        match self.fetch(identity, MANIFEST_FILE).await {
            Ok(RemoteContent::Found(text)) => {
                let parse = ManifestParse::from_text(&text);
                self.report_unparsable(&parse, format!("{identity}/{MANIFEST_FILE}"));
                RemoteManifest::Present(evaluate_parse(&parse))
            }
            Ok(RemoteContent::NotFound) => RemoteManifest::Absent,
            Err(e) => RemoteManifest::FetchFailed(e),
        }
    }

    fn report_unparsable(&self, parse: &ManifestParse, source: String) {
        if let ManifestParse::ParseFailed { reason } = parse {
            let error = ScanError::ManifestUnparsable {
                source_name: source.clone(),
                message: reason.clone(),
            };
            self.emit_scan(ScanEvent::ManifestUnparsable {
                source,
                failure: FailureContext::from_error(&error),
            });
        }
    }

    async fn fetch_remote_ignore(&self, identity: &RepoIdentity) -> RemoteIgnore {
        match self.fetch(identity, IGNORE_FILE).await {
            Ok(RemoteContent::Found(_)) => RemoteIgnore::Present,
            Ok(RemoteContent::NotFound) => RemoteIgnore::Absent,
            Err(e) => RemoteIgnore::FetchFailed(e),
        }
    }

    async fn fetch(
        &self,
        identity: &RepoIdentity,
        file: &str,
    ) -> Result<RemoteContent, NetworkError> {
        self.emit_scan(ScanEvent::RemoteFetchStarted {
            identity: identity.to_string(),
            file: file.to_string(),
        });

        let result = match acquire_semaphore_permit(self.semaphore.clone(), "contents fetch").await {
            Ok(_permit) => self.github.fetch_file(identity, file).await,
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            let error = match e {
                Error::Network(network) => network,
                other => NetworkError::RequestFailed(other.to_string()),
            };
            let scan_error = ScanError::RemoteFetchFailed {
                identity: identity.to_string(),
                file: file.to_string(),
                error: error.clone(),
            };
            self.emit_scan(ScanEvent::RemoteFetchFailed {
                identity: identity.to_string(),
                file: file.to_string(),
                failure: FailureContext::from_error(&scan_error),
            });
            error
        })
    }
}
