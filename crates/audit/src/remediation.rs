//! Remediation decision and issue filing

use crate::ledger::RemediationLedger;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tawata_config::resources_semaphore::acquire_semaphore_permit;
use tawata_config::RemediationConfig;
use tawata_errors::{Error, NetworkError, ScanError};
use tawata_events::{EventEmitter, EventSender, FailureContext, RemediationEvent};
use tawata_net::{GitHubClient, NewIssue};
use tawata_types::{
    Compliance, DuplicateSource, RemediationOutcome, RemoteIgnore, RemoteManifest, RepoIdentity,
};
use tokio::sync::{OnceCell, Semaphore};

/// Title of the filed issue; also used to find earlier reports.
pub const ISSUE_TITLE: &str = "Limit the included files in the package published to npm";

pub const ISSUE_BODY: &str = "\
Neither a `files` property in `package.json` nor a `.npmignore` file was found \
in this repository.

Without one of them every file in the package directory ends up in the \
published tarball, including tests, fixtures and tooling configuration. \
Listing the published paths in the `files` property of `package.json` keeps \
installs small.

See https://docs.npmjs.com/cli/configuring-npm/package-json#files";

/// What the gathered evidence says about filing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationDecision {
    /// Neither side whitelists and upstream has no ignore-list
    File,
    /// A whitelist or ignore-list exists somewhere
    NotRequired,
    /// Some input is unknown, so non-compliance is not established
    Undetermined(String),
}

/// Decide whether upstream needs an issue.
///
/// Positive evidence of compliance wins over unknowns; filing needs every
/// input to be known and negative.
#[must_use]
pub fn decide_remediation(
    local: &Compliance,
    remote_manifest: &RemoteManifest,
    remote_ignore: &RemoteIgnore,
) -> RemediationDecision {
    if local.is_whitelist()
        || remote_manifest.is_whitelist()
        || matches!(remote_ignore, RemoteIgnore::Present)
    {
        return RemediationDecision::NotRequired;
    }

    if let Compliance::Unknown(reason) = local {
        return RemediationDecision::Undetermined(format!("local manifest: {reason}"));
    }
    match remote_manifest {
        RemoteManifest::FetchFailed(error) => {
            return RemediationDecision::Undetermined(format!("upstream package.json: {error}"));
        }
        RemoteManifest::Present(Compliance::Unknown(reason)) => {
            return RemediationDecision::Undetermined(format!("upstream package.json: {reason}"));
        }
        _ => {}
    }
    if let RemoteIgnore::FetchFailed(error) = remote_ignore {
        return RemediationDecision::Undetermined(format!("upstream .npmignore: {error}"));
    }

    RemediationDecision::File
}

/// Files issues on non-compliant repositories, at most once per identity per run
pub struct Remediator {
    github: GitHubClient,
    semaphore: Arc<Semaphore>,
    settings: RemediationConfig,
    ledger: Option<RemediationLedger>,
    /// First attempt per identity; later dependencies share its outcome
    attempts: DashMap<RepoIdentity, Arc<OnceCell<RemediationOutcome>>>,
    event_sender: Option<EventSender>,
}

impl EventEmitter for Remediator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl Remediator {
    #[must_use]
    pub fn new(
        github: GitHubClient,
        semaphore: Arc<Semaphore>,
        settings: RemediationConfig,
        ledger: Option<RemediationLedger>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            github,
            semaphore,
            settings,
            ledger,
            attempts: DashMap::new(),
            event_sender,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> Option<&RemediationLedger> {
        self.ledger.as_ref()
    }

    /// File the remediation issue on `identity` unless already reported.
    ///
    /// Only the first dependency on an identity makes the attempt. Later
    /// ones wait for it and report `SameRun` if it filed, or its outcome
    /// otherwise.
    pub async fn remediate(&self, identity: &RepoIdentity) -> RemediationOutcome {
        let cell = Arc::clone(&self.attempts.entry(identity.clone()).or_default());

        let mut first = false;
        let outcome = cell
            .get_or_init(|| {
                first = true;
                self.attempt(identity)
            })
            .await;
        if first {
            return outcome.clone();
        }

        match outcome {
            RemediationOutcome::Filed { number, .. } => {
                self.emit_remediation(RemediationEvent::Duplicate {
                    identity: identity.to_string(),
                    reason: format!("issue #{number} filed earlier in this run"),
                });
                RemediationOutcome::Duplicate {
                    source: DuplicateSource::SameRun,
                }
            }
            other => other.clone(),
        }
    }

    async fn attempt(&self, identity: &RepoIdentity) -> RemediationOutcome {
        let name = identity.to_string();

        if let Some(last_attempt) = self.ledger.as_ref().and_then(|ledger| {
            ledger.within_cooldown(identity, self.settings.cooldown_days, Utc::now())
        }) {
            self.emit_remediation(RemediationEvent::Duplicate {
                identity: name,
                reason: format!("filed on {}", last_attempt.format("%Y-%m-%d")),
            });
            return RemediationOutcome::Duplicate {
                source: DuplicateSource::Ledger { last_attempt },
            };
        }

        if self.settings.check_existing_issues {
            match self.find_existing(identity).await {
                Ok(Some(issue)) => {
                    self.emit_remediation(RemediationEvent::Duplicate {
                        identity: name,
                        reason: format!("open issue #{}", issue.number),
                    });
                    return RemediationOutcome::Duplicate {
                        source: DuplicateSource::OpenIssue {
                            number: issue.number,
                            url: issue.html_url,
                        },
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    self.emit_remediation(RemediationEvent::DuplicateCheckFailed {
                        identity: name.clone(),
                        failure: FailureContext::from_error(&e),
                    });
                }
            }
        }

        if self.settings.dry_run {
            self.emit_remediation(RemediationEvent::WouldFile { identity: name });
            return RemediationOutcome::DryRun;
        }

        match self.file_issue(identity).await {
            Ok(issue) => {
                if let Some(ledger) = &self.ledger {
                    ledger.record(identity, Utc::now());
                }
                self.emit_remediation(RemediationEvent::Filed {
                    identity: name,
                    number: issue.number,
                    url: issue.html_url.clone(),
                });
                RemediationOutcome::Filed {
                    number: issue.number,
                    url: issue.html_url,
                }
            }
            Err(e) => {
                let error = into_network_error(e);
                let scan_error = ScanError::RemediationFailed {
                    identity: name.clone(),
                    error: error.clone(),
                };
                self.emit_remediation(RemediationEvent::Failed {
                    identity: name,
                    failure: FailureContext::from_error(&scan_error),
                });
                RemediationOutcome::Failed { error }
            }
        }
    }

    async fn find_existing(
        &self,
        identity: &RepoIdentity,
    ) -> Result<Option<tawata_net::IssueRef>, Error> {
        let _permit = acquire_semaphore_permit(self.semaphore.clone(), "issue lookup").await?;
        self.github.find_open_issue(identity, ISSUE_TITLE).await
    }

    async fn file_issue(&self, identity: &RepoIdentity) -> Result<tawata_net::IssueRef, Error> {
        let _permit = acquire_semaphore_permit(self.semaphore.clone(), "issue creation").await?;
        self.github
            .create_issue(
                identity,
                &NewIssue {
                    title: ISSUE_TITLE.to_string(),
                    body: ISSUE_BODY.to_string(),
                },
            )
            .await
    }
}

fn into_network_error(error: Error) -> NetworkError {
    match error {
        Error::Network(network) => network,
        other => NetworkError::RequestFailed(other.to_string()),
    }
}
