//! GitHub REST API access: repository contents and issues

use crate::client::{NetClient, NetConfig};
use crate::content::decode_body;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tawata_config::constants::{GITHUB_ACCEPT, GITHUB_API_VERSION};
use tawata_config::Config;
use tawata_errors::{Error, NetworkError};
use tawata_types::{RemoteContent, RepoIdentity};

/// Body of a create-issue request
#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
}

/// The parts of an issue returned by the API that are used here
#[derive(Debug, Clone, Deserialize)]
pub struct IssueRef {
    pub number: u64,
    pub html_url: String,
    pub title: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

/// Authenticated client for the GitHub REST API
#[derive(Clone)]
pub struct GitHubClient {
    net: NetClient,
    api_url: String,
    token: String,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for the API rooted at `api_url`
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not a valid URL.
    pub fn new(net: NetClient, api_url: &str, token: impl Into<String>) -> Result<Self, Error> {
        crate::parse_url(api_url)?;
        Ok(Self {
            net,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Create a client from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured, the API URL is invalid or
    /// the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let token = config.require_token()?;
        let net = NetClient::new(NetConfig::from_settings(
            &config.network,
            config.github.user_agent.clone(),
        ))?;
        Self::new(net, &config.github.api_url, token)
    }

    fn endpoint(&self, identity: &RepoIdentity, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{tail}",
            self.api_url,
            identity.owner(),
            identity.name()
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    /// Fetch a file from the default branch of `identity`
    ///
    /// A 404 is a valid answer and yields [`RemoteContent::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, authorization failures, rate
    /// limiting, other non-success statuses, or an undecodable payload.
    pub async fn fetch_file(
        &self,
        identity: &RepoIdentity,
        path: &str,
    ) -> Result<RemoteContent, Error> {
        let url = self.endpoint(identity, &format!("contents/{path}"));
        let response = self
            .net
            .execute(|client| self.authorize(client.get(&url)))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(RemoteContent::NotFound),
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| NetworkError::DecodeFailed {
                        message: e.to_string(),
                    })?;
                Ok(RemoteContent::Found(decode_body(&body)?))
            }
            _ => Err(status_error(response).await.into()),
        }
    }

    /// Look for an open issue titled exactly `title`
    ///
    /// Only the first page (100 issues) is inspected.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing request fails or cannot be decoded.
    pub async fn find_open_issue(
        &self,
        identity: &RepoIdentity,
        title: &str,
    ) -> Result<Option<IssueRef>, Error> {
        let url = self.endpoint(identity, "issues");
        let response = self
            .net
            .execute(|client| {
                self.authorize(client.get(&url))
                    .query(&[("state", "open"), ("per_page", "100")])
            })
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await.into());
        }

        let issues: Vec<IssueRef> = response.json().await.map_err(|e| NetworkError::DecodeFailed {
            message: e.to_string(),
        })?;
        Ok(issues.into_iter().find(|issue| issue.title == title))
    }

    /// Create an issue on `identity`
    ///
    /// Sent once; a failed write is never retried.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport failure or non-2xx response.
    pub async fn create_issue(
        &self,
        identity: &RepoIdentity,
        issue: &NewIssue,
    ) -> Result<IssueRef, Error> {
        let url = self.endpoint(identity, "issues");
        let response = self
            .net
            .execute_once(|client| self.authorize(client.post(&url)).json(issue))
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await.into());
        }

        response
            .json()
            .await
            .map_err(|e| {
                NetworkError::DecodeFailed {
                    message: e.to_string(),
                }
                .into()
            })
    }
}

/// Map a non-success response to an error, keeping the API's message
async fn status_error(response: Response) -> NetworkError {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ApiMessage>(&body).ok())
        .map_or_else(|| status.to_string(), |m| m.message);
    NetworkError::from_status(status.as_u16(), message)
}
