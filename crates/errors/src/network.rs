//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("authentication rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("rate limited: retry after {seconds} seconds")]
    RateLimited { seconds: u64 },

    #[error("unsupported content encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    #[error("failed to decode response body: {message}")]
    DecodeFailed { message: String },
}

impl NetworkError {
    /// Build an error from a non-success HTTP status.
    ///
    /// 401 and 403 map to [`NetworkError::Unauthorized`], everything else to
    /// [`NetworkError::HttpError`].
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            _ => Self::HttpError { status, message },
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused(_) => {
                Some("Check network connectivity to the GitHub API and retry.")
            }
            Self::Unauthorized { .. } => {
                Some("Verify that the GitHub token is valid and has the `repo` or `public_repo` scope.")
            }
            Self::RateLimited { .. } => Some("Wait for the rate limit window to reset and retry."),
            Self::InvalidUrl(_) => Some("Check the configured API URL."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::ConnectionRefused(_)
            | Self::RequestFailed(_)
            | Self::RateLimited { .. } => true,
            Self::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Timeout { .. } => "network.timeout",
            Self::RequestFailed(_) => "network.request_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::Unauthorized { .. } => "network.unauthorized",
            Self::RateLimited { .. } => "network.rate_limited",
            Self::UnsupportedEncoding { .. } => "network.unsupported_encoding",
            Self::DecodeFailed { .. } => "network.decode_failed",
        })
    }
}
