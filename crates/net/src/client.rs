//! HTTP client with connection pooling and retry logic

use crate::retry::{calculate_backoff_delay, RetryConfig};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tawata_config::NetworkConfig;
use tawata_errors::{Error, NetworkError};

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry: RetryConfig,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            retry: RetryConfig::default(),
            user_agent: format!("tawata/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetConfig {
    /// Build from the `[network]` config section
    #[must_use]
    pub fn from_settings(settings: &NetworkConfig, user_agent: impl Into<String>) -> Self {
        Self {
            timeout: settings.timeout(),
            connect_timeout: settings.connect_timeout(),
            retry: RetryConfig {
                max_retries: settings.retries,
                initial_delay: settings.retry_delay(),
                max_delay: settings.max_retry_delay(),
                ..RetryConfig::default()
            },
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone, Debug)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created due to invalid configuration
    /// or if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Send an idempotent request, retrying transient failures with backoff
    ///
    /// The closure is called once per attempt to build a fresh request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts, or
    /// immediately when the API reports a rate limit.
    pub async fn execute<F>(&self, build: F) -> Result<Response, Error>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        self.retry_request(|| build(&self.client).send(), self.config.retry.max_retries)
            .await
    }

    /// Send a request exactly once (for non-idempotent writes)
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or rate limiting.
    pub async fn execute_once<F>(&self, build: F) -> Result<Response, Error>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        self.retry_request(|| build(&self.client).send(), 0).await
    }

    /// Execute a request with retries
    async fn retry_request<F, Fut>(&self, mut f: F, max_retries: u32) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                tokio::time::sleep(calculate_backoff_delay(&self.config.retry, attempt)).await;
            }

            match f().await {
                Ok(response) => {
                    if let Some(seconds) = rate_limit_wait(&response) {
                        return Err(NetworkError::RateLimited { seconds }.into());
                    }

                    // Server errors are retried while attempts remain; the final
                    // response is handed back for status mapping by the caller
                    if response.status().is_server_error() && attempt < max_retries {
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let retry = Self::should_retry(&e);
                    last_error = Some(e);

                    if !retry {
                        break;
                    }
                }
            }
        }

        // Convert the last error
        match last_error {
            Some(e) if e.is_timeout() => Err(NetworkError::Timeout {
                url: e
                    .url()
                    .map(std::string::ToString::to_string)
                    .unwrap_or_default(),
            }
            .into()),
            Some(e) if e.is_connect() => Err(NetworkError::ConnectionRefused(e.to_string()).into()),
            Some(e) => Err(NetworkError::RequestFailed(e.to_string()).into()),
            None => Err(NetworkError::RequestFailed("Unknown error".to_string()).into()),
        }
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        // Retry on timeout, connection errors, and server errors
        error.is_timeout()
            || error.is_connect()
            || error.status().is_none_or(|s| s.is_server_error())
    }
}

/// Seconds to wait when the response signals an exhausted rate limit
fn rate_limit_wait(response: &Response) -> Option<u64> {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
    };

    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => Some(
            header("retry-after")
                .and_then(|s| u64::try_from(s).ok())
                .unwrap_or(60),
        ),
        StatusCode::FORBIDDEN if header("x-ratelimit-remaining") == Some(0) => {
            let wait = header("x-ratelimit-reset")
                .map_or(60, |reset| reset - chrono::Utc::now().timestamp());
            Some(u64::try_from(wait).unwrap_or(0))
        }
        _ => None,
    }
}
