//! Integration tests for events

#[cfg(test)]
mod tests {
    use tawata_errors::{NetworkError, ScanError};
    use tawata_events::*;
    use tawata_types::DependencyStatus;

    #[tokio::test]
    async fn test_event_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_scan(ScanEvent::RemoteFetchStarted {
            identity: "acme/widget".into(),
            file: "package.json".into(),
        });
        tx.emit_remediation(RemediationEvent::WouldFile {
            identity: "acme/widget".into(),
        });

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::Scan(ScanEvent::RemoteFetchStarted { .. })
        ));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::Remediation(RemediationEvent::WouldFile { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_remediation(RemediationEvent::NotFiled {
            identity: "acme/widget".into(),
            reason: "ignored".into(),
        });
    }

    #[test]
    fn test_unset_sender_is_silent() {
        let sender: Option<EventSender> = None;
        let reason = ScanError::IdentityUnresolvable {
            package: "left-pad".into(),
        };
        sender.emit_scan(ScanEvent::IdentityUnresolved {
            package: "left-pad".into(),
            failure: FailureContext::from_error(&reason),
        });
    }

    #[test]
    fn test_unparsable_manifest_carries_error_code() {
        let error = ScanError::ManifestUnparsable {
            source_name: "acme/widget/package.json".into(),
            message: "EOF while parsing".into(),
        };
        let event = AppEvent::Scan(ScanEvent::ManifestUnparsable {
            source: "acme/widget/package.json".into(),
            failure: FailureContext::from_error(&error),
        });
        assert_eq!(event.log_level(), tracing::Level::WARN);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"]["failure"]["code"], "scan.manifest_unparsable");
    }

    #[test]
    fn test_log_levels() {
        let failure = FailureContext::from_error(&NetworkError::from_status(401, "Bad credentials"));
        assert_eq!(failure.code.as_deref(), Some("network.unauthorized"));
        assert!(!failure.retryable);

        let fetch_failed = AppEvent::Scan(ScanEvent::RemoteFetchFailed {
            identity: "acme/widget".into(),
            file: "package.json".into(),
            failure,
        });
        assert_eq!(fetch_failed.log_level(), tracing::Level::ERROR);
        assert_eq!(fetch_failed.log_target(), "tawata::events::scan");

        let settled = AppEvent::Scan(ScanEvent::DependencySettled {
            package: "widget".into(),
            status: DependencyStatus::Compliant,
        });
        assert_eq!(settled.log_level(), tracing::Level::INFO);

        let started = AppEvent::Scan(ScanEvent::RemoteFetchStarted {
            identity: "acme/widget".into(),
            file: ".npmignore".into(),
        });
        assert_eq!(started.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Remediation(RemediationEvent::Filed {
            identity: "acme/widget".into(),
            number: 12,
            url: "https://github.com/acme/widget/issues/12".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "remediation");
        assert_eq!(json["event"]["type"], "Filed");
        assert_eq!(json["event"]["number"], 12);
    }
}
