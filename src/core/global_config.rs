//! Global configuration management
//!
//! Reads settings from `config.toml` in the config directory: hosting
//! provider access, download behavior, and the static artifact source.
//! Every field is optional; accessors fall back to [`crate::config`] defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{defaults, urls};
use crate::core::fetch::{FetchOptions, ResultOrder};
use crate::core::strategy::RemoteTagSettings;
use crate::infra::dirs::VerlockDirs;

/// Environment variable holding a hosting provider token
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for verlock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Hosting provider settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Static catalog settings
    #[serde(default)]
    pub static_source: StaticSourceConfig,
}

/// Hosting provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL
    pub api_url: Option<String>,

    /// Access token (`GITHUB_TOKEN` takes precedence)
    pub token: Option<String>,

    /// Prefix stripped from tags before parsing
    pub tag_prefix: Option<String>,
}

/// Download configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Dependencies processed at once
    pub concurrency: Option<usize>,

    /// Fetch attempts per locator
    pub retries: Option<u32>,

    /// Whole-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Report results in manifest order (default) or completion order
    pub ordered: Option<bool>,
}

/// Static catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticSourceConfig {
    /// Base URL of static artifacts
    pub base_url: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    /// If the config file exists but is invalid, returns an error.
    pub fn load(dirs: &VerlockDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective hosting provider API URL
    #[must_use]
    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(urls::GITHUB_API)
    }

    /// Effective access token, environment first
    #[must_use]
    pub fn token(&self) -> Option<String> {
        std::env::var(ENV_GITHUB_TOKEN)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.github.token.clone())
    }

    /// Effective static artifact base URL
    #[must_use]
    pub fn static_base_url(&self) -> &str {
        self.static_source
            .base_url
            .as_deref()
            .unwrap_or(urls::STATIC_ARTIFACTS)
    }

    /// Effective fetch attempts
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.download
            .retries
            .unwrap_or(defaults::MAX_DOWNLOAD_RETRIES)
            .max(1)
    }

    /// Effective request timeout, at least one second
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.download
                .timeout_secs
                .unwrap_or(defaults::REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Settings for the remote tag strategy
    #[must_use]
    pub fn remote_tag_settings(&self) -> RemoteTagSettings {
        RemoteTagSettings {
            api_url: self.api_url().to_string(),
            tag_prefix: self
                .github
                .tag_prefix
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_TAG_PREFIX.to_string()),
            ..RemoteTagSettings::default()
        }
    }

    /// Orchestrator options from the download section
    #[must_use]
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            concurrency: self
                .download
                .concurrency
                .unwrap_or(defaults::DEFAULT_CONCURRENCY)
                .max(1),
            order: if self.download.ordered.unwrap_or(true) {
                ResultOrder::Input
            } else {
                ResultOrder::Completion
            },
        }
    }
}
