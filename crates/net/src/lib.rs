#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for tawata
//!
//! This crate handles all HTTP operations: a pooled client with retry and
//! backoff, and the narrow slice of the GitHub API the scanner needs
//! (repository contents and issues).

mod client;
mod content;
mod github;
mod retry;

pub use client::{NetClient, NetConfig};
pub use content::{decode_body, decode_content};
pub use github::{GitHubClient, IssueRef, NewIssue};
pub use retry::RetryConfig;

use tawata_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}
