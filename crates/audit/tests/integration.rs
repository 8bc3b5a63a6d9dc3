//! Integration tests for the audit crate

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tawata_audit::{DependencyScanner, RemediationLedger, ISSUE_TITLE};
use tawata_config::Config;
use tawata_events::{AppEvent, RemediationEvent, ScanEvent};
use tawata_net::{GitHubClient, NetClient, NetConfig, RetryConfig};
use tawata_types::{
    DependencyStatus, DuplicateSource, RemediationOutcome, RepoIdentity, ScanSummary,
};
use tempfile::TempDir;

fn github(server: &MockServer) -> GitHubClient {
    let net = NetClient::new(NetConfig {
        retry: RetryConfig {
            max_retries: 1,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            ..RetryConfig::default()
        },
        ..NetConfig::default()
    })
    .unwrap();
    GitHubClient::new(net, &server.base_url(), "test-token").unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.remediation.check_existing_issues = false;
    config
}

fn install(root: &Path, dir: &str, manifest: &serde_json::Value) {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("package.json"), manifest.to_string()).unwrap();
}

fn mock_file<'a>(server: &'a MockServer, repo: &str, file: &str, body: Option<&str>) -> Mock<'a> {
    let path = format!("/repos/{repo}/contents/{file}");
    server.mock(|when, then| {
        when.method(GET).path(path);
        match body {
            Some(content) => {
                then.status(200).json_body(json!({
                    "name": file,
                    "encoding": "base64",
                    "content": STANDARD.encode(content),
                }));
            }
            None => {
                then.status(404).json_body(json!({ "message": "Not Found" }));
            }
        }
    })
}

fn mock_create<'a>(server: &'a MockServer, repo: &str) -> Mock<'a> {
    let path = format!("/repos/{repo}/issues");
    let url = format!("https://github.com/{repo}/issues/7");
    server.mock(|when, then| {
        when.method(POST).path(path).json_body_partial(
            json!({ "title": ISSUE_TITLE }).to_string(),
        );
        then.status(201).json_body(json!({
            "number": 7,
            "html_url": url,
            "title": ISSUE_TITLE,
        }));
    })
}

async fn scan(server: &MockServer, config: &Config, root: &Path) -> ScanSummary {
    DependencyScanner::new(github(server), config)
        .await
        .scan(root)
        .await
        .unwrap()
}

fn node_modules() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[tokio::test]
async fn test_non_compliant_dependency_gets_one_issue() {
    let server = MockServer::start();
    let temp = node_modules();
    install(
        temp.path(),
        "widget",
        &json!({ "name": "widget", "version": "1.0.0", "repository": "git+https://github.com/acme/widget.git" }),
    );
    mock_file(&server, "acme/widget", "package.json", Some(r#"{"name":"widget"}"#));
    mock_file(&server, "acme/widget", ".npmignore", None);
    let create = mock_create(&server, "acme/widget");

    let summary = scan(&server, &config(), temp.path()).await;

    create.assert_hits(1);
    assert_eq!(summary.dependencies.len(), 1);
    let report = &summary.dependencies[0];
    assert_eq!(report.identity, RepoIdentity::parse("acme/widget"));
    assert!(!report.local_compliant());
    assert_eq!(report.remote_compliant(), Some(false));
    assert_eq!(report.status(), DependencyStatus::Remediated);
    assert!(matches!(
        report.remediation,
        RemediationOutcome::Filed { number: 7, .. }
    ));
    assert_eq!(summary.issues_filed(), 1);
    assert!(!summary.has_failures());
}

#[tokio::test]
async fn test_whitelisted_dependency_is_left_alone() {
    let server = MockServer::start();
    let temp = node_modules();
    install(
        temp.path(),
        "gadget",
        &json!({ "name": "gadget", "files": ["lib"], "repository": { "type": "git", "url": "https://github.com/acme/gadget" } }),
    );
    mock_file(&server, "acme/gadget", "package.json", Some(r#"{"files":["lib"]}"#));
    mock_file(&server, "acme/gadget", ".npmignore", None);
    let create = mock_create(&server, "acme/gadget");

    let summary = scan(&server, &config(), temp.path()).await;

    create.assert_hits(0);
    assert_eq!(summary.dependencies[0].status(), DependencyStatus::Compliant);
    assert!(summary.dependencies[0].remote_compliant().unwrap());
}

#[tokio::test]
async fn test_upstream_ignore_file_counts_as_compliant() {
    let server = MockServer::start();
    let temp = node_modules();
    install(
        temp.path(),
        "widget",
        &json!({ "name": "widget", "repository": "github:acme/widget" }),
    );
    mock_file(&server, "acme/widget", "package.json", Some("{}"));
    mock_file(&server, "acme/widget", ".npmignore", Some("test/\n"));
    let create = mock_create(&server, "acme/widget");

    let summary = scan(&server, &config(), temp.path()).await;

    create.assert_hits(0);
    assert_eq!(summary.dependencies[0].status(), DependencyStatus::Compliant);
}

#[tokio::test]
async fn test_unreadable_manifest_is_skipped() {
    let server = MockServer::start();
    let temp = node_modules();
    fs::create_dir(temp.path().join("broken")).unwrap();
    install(temp.path(), "plain", &json!({ "name": "plain", "files": [] }));

    let summary = scan(&server, &config(), temp.path()).await;

    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].path.ends_with("broken"));
    assert_eq!(summary.dependencies.len(), 1);
    assert_eq!(summary.dependencies[0].display_name(), "plain");
    assert!(summary.has_failures());
}

#[tokio::test]
async fn test_unparsable_manifest_is_reported_unknown() {
    let server = MockServer::start();
    let temp = node_modules();
    fs::create_dir(temp.path().join("garbled")).unwrap();
    fs::write(temp.path().join("garbled/package.json"), "{ \"name\": ").unwrap();

    let summary = scan(&server, &config(), temp.path()).await;

    let report = &summary.dependencies[0];
    assert!(report.local.is_unknown());
    assert_eq!(report.display_name(), "garbled");
    assert_eq!(report.status(), DependencyStatus::Failed);
}

#[tokio::test]
async fn test_missing_identity_is_unresolved() {
    let server = MockServer::start();
    let temp = node_modules();
    install(temp.path(), "local-only", &json!({ "name": "local-only" }));

    let summary = scan(&server, &config(), temp.path()).await;

    let report = &summary.dependencies[0];
    assert!(report.identity.is_none());
    assert!(report.remote.is_none());
    assert_eq!(report.status(), DependencyStatus::Unresolved);
}

#[tokio::test]
async fn test_fetch_failure_stays_with_its_dependency() {
    let server = MockServer::start();
    let temp = node_modules();
    install(
        temp.path(),
        "a-locked",
        &json!({ "name": "a-locked", "repository": "acme/locked" }),
    );
    install(
        temp.path(),
        "b-widget",
        &json!({ "name": "b-widget", "repository": "acme/widget" }),
    );
    server.mock(|when, then| {
        when.method(GET).path_contains("/repos/acme/locked/");
        then.status(401).json_body(json!({ "message": "Bad credentials" }));
    });
    mock_file(&server, "acme/widget", "package.json", Some("{}"));
    mock_file(&server, "acme/widget", ".npmignore", None);
    let locked_create = mock_create(&server, "acme/locked");
    let widget_create = mock_create(&server, "acme/widget");

    let summary = scan(&server, &config(), temp.path()).await;

    locked_create.assert_hits(0);
    widget_create.assert_hits(1);
    assert_eq!(summary.dependencies[0].status(), DependencyStatus::Failed);
    assert!(matches!(
        summary.dependencies[0].remediation,
        RemediationOutcome::Undetermined { .. }
    ));
    assert_eq!(summary.dependencies[1].status(), DependencyStatus::Remediated);
}

#[tokio::test]
async fn test_dry_run_files_nothing() {
    let server = MockServer::start();
    let temp = node_modules();
    install(temp.path(), "widget", &json!({ "repository": "acme/widget" }));
    mock_file(&server, "acme/widget", "package.json", None);
    mock_file(&server, "acme/widget", ".npmignore", None);
    let create = mock_create(&server, "acme/widget");

    let mut config = config();
    config.remediation.dry_run = true;
    let summary = scan(&server, &config, temp.path()).await;

    create.assert_hits(0);
    assert!(matches!(
        summary.dependencies[0].remediation,
        RemediationOutcome::DryRun
    ));
    assert_eq!(summary.dependencies[0].status(), DependencyStatus::NonCompliant);
}

#[tokio::test]
async fn test_disabled_remediation_files_nothing() {
    let server = MockServer::start();
    let temp = node_modules();
    install(temp.path(), "widget", &json!({ "repository": "acme/widget" }));
    mock_file(&server, "acme/widget", "package.json", None);
    mock_file(&server, "acme/widget", ".npmignore", None);
    let create = mock_create(&server, "acme/widget");

    let mut config = config();
    config.remediation.enabled = false;
    let summary = scan(&server, &config, temp.path()).await;

    create.assert_hits(0);
    assert!(matches!(
        summary.dependencies[0].remediation,
        RemediationOutcome::Disabled
    ));
}

#[tokio::test]
async fn test_existing_open_issue_is_not_duplicated() {
    let server = MockServer::start();
    let temp = node_modules();
    install(temp.path(), "widget", &json!({ "repository": "acme/widget" }));
    mock_file(&server, "acme/widget", "package.json", Some("{}"));
    mock_file(&server, "acme/widget", ".npmignore", None);
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widget/issues");
        then.status(200).json_body(json!([
            { "number": 4, "html_url": "https://github.com/acme/widget/issues/4", "title": ISSUE_TITLE }
        ]));
    });
    let create = mock_create(&server, "acme/widget");

    let mut config = config();
    config.remediation.check_existing_issues = true;
    let summary = scan(&server, &config, temp.path()).await;

    create.assert_hits(0);
    assert!(matches!(
        summary.dependencies[0].remediation,
        RemediationOutcome::Duplicate {
            source: DuplicateSource::OpenIssue { number: 4, .. }
        }
    ));
}

#[tokio::test]
async fn test_shared_repository_is_filed_once() {
    let server = MockServer::start();
    let temp = node_modules();
    for dir in ["widget-core", "widget-cli"] {
        install(
            temp.path(),
            dir,
            &json!({ "name": dir, "repository": "https://github.com/acme/widget" }),
        );
    }
    mock_file(&server, "acme/widget", "package.json", Some("{}"));
    mock_file(&server, "acme/widget", ".npmignore", None);
    let create = mock_create(&server, "acme/widget");

    let summary = scan(&server, &config(), temp.path()).await;

    create.assert_hits(1);
    assert_eq!(summary.issues_filed(), 1);
    assert!(summary.dependencies.iter().any(|d| matches!(
        d.remediation,
        RemediationOutcome::Duplicate {
            source: DuplicateSource::SameRun
        }
    )));
}

#[tokio::test]
async fn test_shared_repository_inherits_failed_attempt() {
    let server = MockServer::start();
    let temp = node_modules();
    for dir in ["mono-a", "mono-b"] {
        install(temp.path(), dir, &json!({ "name": dir, "repository": "acme/mono" }));
    }
    mock_file(&server, "acme/mono", "package.json", Some("{}"));
    mock_file(&server, "acme/mono", ".npmignore", None);
    let create = server.mock(|when, then| {
        when.method(POST).path("/repos/acme/mono/issues");
        then.status(422).json_body(json!({ "message": "Validation Failed" }));
    });

    let summary = scan(&server, &config(), temp.path()).await;

    create.assert_hits(1);
    assert_eq!(summary.issues_filed(), 0);
    for report in &summary.dependencies {
        assert!(matches!(report.remediation, RemediationOutcome::Failed { .. }));
        assert_eq!(report.status(), DependencyStatus::Failed);
    }
    assert!(summary.has_failures());
}

#[tokio::test]
async fn test_shared_repository_dry_run_is_not_reported_as_filed() {
    let server = MockServer::start();
    let temp = node_modules();
    for dir in ["mono-a", "mono-b"] {
        install(temp.path(), dir, &json!({ "name": dir, "repository": "acme/mono" }));
    }
    mock_file(&server, "acme/mono", "package.json", None);
    mock_file(&server, "acme/mono", ".npmignore", None);
    let create = mock_create(&server, "acme/mono");

    let mut config = config();
    config.remediation.dry_run = true;
    let summary = scan(&server, &config, temp.path()).await;

    create.assert_hits(0);
    for report in &summary.dependencies {
        assert!(matches!(report.remediation, RemediationOutcome::DryRun));
    }
}

#[tokio::test]
async fn test_dot_directories_do_not_count_as_failures() {
    let server = MockServer::start();
    let temp = node_modules();
    fs::create_dir_all(temp.path().join(".bin")).unwrap();
    fs::create_dir_all(temp.path().join(".cache/some-tool")).unwrap();
    install(
        temp.path(),
        "left-pad",
        &json!({ "name": "left-pad", "files": ["index.js"] }),
    );

    let summary = scan(&server, &config(), temp.path()).await;

    assert_eq!(summary.dependencies.len(), 1);
    assert!(summary.skipped.is_empty());
    assert!(!summary.has_failures());
}

#[tokio::test]
async fn test_failure_events_carry_scan_error_codes() {
    let server = MockServer::start();
    let temp = node_modules();
    install(temp.path(), "orphan", &json!({ "name": "orphan" }));
    install(temp.path(), "widget", &json!({ "repository": "acme/widget" }));
    mock_file(&server, "acme/widget", "package.json", Some("{ not json"));
    mock_file(&server, "acme/widget", ".npmignore", None);

    let (sender, mut receiver) = tawata_events::channel();
    let scanner = DependencyScanner::with_events(github(&server), &config(), sender).await;
    scanner.scan(temp.path()).await.unwrap();
    drop(scanner);

    let mut codes = Vec::new();
    while let Some(event) = receiver.recv().await {
        match event {
            AppEvent::Scan(
                ScanEvent::IdentityUnresolved { failure, .. }
                | ScanEvent::ManifestUnparsable { failure, .. },
            ) => codes.extend(failure.code),
            _ => {}
        }
    }
    assert!(codes.iter().any(|c| c == "scan.identity_unresolvable"));
    assert!(codes.iter().any(|c| c == "scan.manifest_unparsable"));
}

#[tokio::test]
async fn test_failed_filing_event_carries_remediation_code() {
    let server = MockServer::start();
    let temp = node_modules();
    install(temp.path(), "widget", &json!({ "repository": "acme/widget" }));
    mock_file(&server, "acme/widget", "package.json", Some("{}"));
    mock_file(&server, "acme/widget", ".npmignore", None);
    server.mock(|when, then| {
        when.method(POST).path("/repos/acme/widget/issues");
        then.status(422).json_body(json!({ "message": "Validation Failed" }));
    });

    let (sender, mut receiver) = tawata_events::channel();
    let scanner = DependencyScanner::with_events(github(&server), &config(), sender).await;
    scanner.scan(temp.path()).await.unwrap();
    drop(scanner);

    let mut failure_code = None;
    while let Some(event) = receiver.recv().await {
        if let AppEvent::Remediation(RemediationEvent::Failed { failure, .. }) = event {
            failure_code = failure.code;
        }
    }
    assert_eq!(failure_code.as_deref(), Some("scan.remediation_failed"));
}

#[tokio::test]
async fn test_scoped_packages_are_scanned() {
    let server = MockServer::start();
    let temp = node_modules();
    install(
        temp.path(),
        "@acme/widget",
        &json!({ "name": "@acme/widget", "files": ["dist"] }),
    );
    fs::write(temp.path().join(".yarn-integrity"), "{}").unwrap();

    let summary = scan(&server, &config(), temp.path()).await;

    assert_eq!(summary.dependencies.len(), 1);
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.dependencies[0].display_name(), "@acme/widget");
}

#[tokio::test]
async fn test_ledger_cooldown_suppresses_refiling() {
    let server = MockServer::start();
    let temp = node_modules();
    let state = tempfile::tempdir().unwrap();
    let ledger_path = state.path().join("ledger.json");
    install(temp.path(), "widget", &json!({ "repository": "acme/widget" }));
    mock_file(&server, "acme/widget", "package.json", Some("{}"));
    mock_file(&server, "acme/widget", ".npmignore", None);
    let create = mock_create(&server, "acme/widget");

    let mut config = config();
    config.remediation.ledger_path = Some(ledger_path.clone());

    let first = scan(&server, &config, temp.path()).await;
    let second = scan(&server, &config, temp.path()).await;

    create.assert_hits(1);
    assert_eq!(first.issues_filed(), 1);
    assert!(matches!(
        second.dependencies[0].remediation,
        RemediationOutcome::Duplicate {
            source: DuplicateSource::Ledger { .. }
        }
    ));

    let ledger = RemediationLedger::load(&ledger_path).await.unwrap();
    assert!(ledger
        .last_attempt(&RepoIdentity::parse("acme/widget").unwrap())
        .is_some());
}

#[tokio::test]
async fn test_missing_root_makes_no_requests() {
    let server = MockServer::start();
    let temp = node_modules();
    let catch_all = server.mock(|when, then| {
        when.path_contains("/repos/");
        then.status(500);
    });

    let summary = scan(&server, &config(), &temp.path().join("node_modules")).await;

    catch_all.assert_hits(0);
    assert!(!summary.root_present);
    assert!(summary.dependencies.is_empty());
    assert!(!summary.has_failures());
}
