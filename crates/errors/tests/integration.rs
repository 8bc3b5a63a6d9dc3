//! Integration tests for error types

#[cfg(test)]
mod tests {
    use tawata_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://api.github.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::ManifestUnreadable {
            path: "node_modules/left-pad/package.json".into(),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "manifest node_modules/left-pad/package.json could not be read: No such file or directory"
        );
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            NetworkError::from_status(401, "Bad credentials"),
            NetworkError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            NetworkError::from_status(403, "Forbidden"),
            NetworkError::Unauthorized { status: 403, .. }
        ));
        assert!(matches!(
            NetworkError::from_status(502, "Bad Gateway"),
            NetworkError::HttpError { status: 502, .. }
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(NetworkError::from_status(503, "unavailable").is_retryable());
        assert!(!NetworkError::from_status(401, "Bad credentials").is_retryable());
        assert!(NetworkError::RateLimited { seconds: 60 }.is_retryable());

        let scan_err: Error = ScanError::RemoteFetchFailed {
            identity: "acme/widget".into(),
            file: ".npmignore".into(),
            error: NetworkError::Timeout {
                url: "https://api.github.com".into(),
            },
        }
        .into();
        assert!(scan_err.is_retryable());
        assert_eq!(scan_err.user_code(), Some("scan.remote_fetch_failed"));
    }

    #[test]
    fn test_missing_token_hint() {
        let err = ConfigError::MissingField {
            field: "github.token".into(),
        };
        assert!(err.user_hint().unwrap().contains("TAWATA_TOKEN"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
    }
}
