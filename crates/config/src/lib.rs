#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for tawata
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/tawata/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod resources_semaphore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tawata_errors::{ConfigError, Error};
use tawata_types::{ColorChoice, OutputFormat};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub remediation: RemediationConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// GitHub API access
#[derive(Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API access token, sent as a bearer token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

/// Remediation (issue filing) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dry_run: bool,
    /// Look for an open issue with the same title before filing
    #[serde(default = "default_true")]
    pub check_existing_issues: bool,
    /// JSON ledger of past remediation attempts
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: u32,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            connect_timeout: 10,
            retries: 3,
            retry_delay_ms: 500,
            max_retry_delay_ms: 10_000,
            max_concurrent_requests: 8,
        }
    }
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dry_run: false,
            check_existing_issues: true,
            ledger_path: None,
            cooldown_days: 30,
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_api_url() -> String {
    constants::GITHUB_API.to_string()
}

fn default_user_agent() -> String {
    format!("tawata/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_max_retry_delay_ms() -> u64 {
    10_000
}

fn default_max_concurrent_requests() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_cooldown_days() -> u32 {
    30
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("tawata").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        // No config directory (e.g. HOME unset) means no config file
        let Ok(config_path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // TAWATA_TOKEN wins over the generic GITHUB_TOKEN
        if let Some(token) = std::env::var("TAWATA_TOKEN")
            .ok()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
        {
            self.github.token = Some(token);
        }

        if let Ok(api_url) = std::env::var("TAWATA_API_URL") {
            self.github.api_url = api_url;
        }

        if let Ok(max) = std::env::var("TAWATA_MAX_CONCURRENT") {
            self.network.max_concurrent_requests =
                max.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "TAWATA_MAX_CONCURRENT".to_string(),
                    value: max,
                })?;
        }

        if let Ok(output) = std::env::var("TAWATA_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TAWATA_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        if let Ok(color) = std::env::var("TAWATA_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TAWATA_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Check values that serde cannot constrain
    ///
    /// # Errors
    ///
    /// Returns an error for a zero concurrency limit or a non-HTTP API URL.
    pub fn validate(&self) -> Result<(), Error> {
        if self.network.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.max_concurrent_requests".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if !self.github.api_url.starts_with("http://") && !self.github.api_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "github.api_url".to_string(),
                value: self.github.api_url.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// The API token, which every scan needs
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` when no non-empty token is set.
    pub fn require_token(&self) -> Result<&str, Error> {
        self.github
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingField {
                    field: "github.token".to_string(),
                }
                .into()
            })
    }

    /// The dependency root under the current working directory
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn dependency_root() -> Result<PathBuf, Error> {
        Ok(std::env::current_dir()?.join(constants::DEPENDENCY_DIR))
    }
}
