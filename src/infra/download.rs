//! HTTP fetching
//!
//! Fetches tag listings and artifacts over HTTP with retry and exponential
//! backoff, computes checksums, and stores artifacts atomically.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::core::global_config::GlobalConfig;
use crate::core::strategy::Fetcher;
use crate::core::version::DependencyVersion;
use crate::error::TransportError;

/// HTTP fetcher with retry and exponential backoff
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client
    client: reqwest::Client,
    /// Maximum attempts per URL
    max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
    /// Bearer token, sent only to URLs under its scope
    auth: Option<ScopedToken>,
}

/// A bearer token bound to the base URL it may be sent to
#[derive(Debug, Clone)]
struct ScopedToken {
    token: String,
    scope: String,
}

impl ScopedToken {
    fn new(token: String, scope: &str) -> Self {
        Self {
            token,
            scope: scope.trim_end_matches('/').to_string(),
        }
    }

    /// Whether `url` is the scope itself or a path below it
    fn covers(&self, url: &str) -> bool {
        url.strip_prefix(&self.scope)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']))
    }
}

impl HttpFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> Self {
        Self::with_config(defaults::MAX_DOWNLOAD_RETRIES, defaults::RETRY_BASE_DELAY_MS)
    }

    /// Create a fetcher with custom retry settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: build_client(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS)),
            max_retries: max_retries.max(1),
            base_delay_ms,
            auth: None,
        }
    }

    /// Create a fetcher from global configuration
    ///
    /// The access token is scoped to the hosting provider API, so artifact
    /// mirrors never see it.
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            client: build_client(config.timeout()),
            max_retries: config.retries(),
            base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            auth: config
                .token()
                .map(|token| ScopedToken::new(token, config.api_url())),
        }
    }

    /// Send `token` as a bearer token to URLs under `scope`
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, scope: &str) -> Self {
        self.auth = Some(ScopedToken::new(token.into(), scope));
        self
    }

    /// Get max retries
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Single fetch attempt without retry
    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let mut request = self.client.get(url);
        if let Some(auth) = self.auth.as_ref().filter(|auth| auth.covers(url)) {
            request = request.bearer_auth(&auth.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;
        Ok(body.to_vec())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TransportError> {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_retries {
            attempts += 1;
            tracing::debug!("Fetching {locator} (attempt {attempts}/{})", self.max_retries);

            match self.fetch_once(locator).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} bytes from {locator}", body.len());
                    return Ok(body);
                }
                Err(e) if !is_retryable(&e) => return Err(e),
                Err(e) => {
                    tracing::warn!("Fetch attempt {attempts} failed: {e}");
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        // Exponential backoff with cap
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(defaults::RETRY_MAX_DELAY_MS);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TransportError::MaxRetriesExceeded {
            url: locator.to_string(),
            retries: self.max_retries,
        }))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
        .user_agent(defaults::USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn transport_error(url: &str, error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Network {
            url: url.to_string(),
            error: error.to_string(),
        }
    }
}

/// Client errors other than rate limiting will not change on retry
fn is_retryable(error: &TransportError) -> bool {
    match error {
        TransportError::Status { status, .. } => *status >= 500 || *status == 429,
        _ => true,
    }
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// File name of a stored artifact
pub fn artifact_file_name(name: &str, version: &DependencyVersion) -> String {
    let safe_name: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe_name}-{version}.tar.gz")
}

/// Artifact bytes written next to their final location, not yet visible
/// under the final name
#[derive(Debug)]
pub struct StagedArtifact {
    temp: PathBuf,
    dest: PathBuf,
}

impl StagedArtifact {
    /// Final location of the artifact
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Rename into place, replacing any previous file atomically
    ///
    /// The temporary file is removed when the rename fails.
    pub async fn publish(self) -> std::io::Result<PathBuf> {
        if let Err(e) = tokio::fs::rename(&self.temp, &self.dest).await {
            let _ = tokio::fs::remove_file(&self.temp).await;
            return Err(e);
        }
        tracing::debug!("Stored artifact {}", self.dest.display());
        Ok(self.dest)
    }

    /// Drop the staged bytes, leaving any previous file untouched
    pub async fn discard(self) {
        let _ = tokio::fs::remove_file(&self.temp).await;
    }
}

/// Write artifact bytes to a temporary sibling of their final path under `dir`
pub async fn stage_artifact(
    dir: &Path,
    name: &str,
    version: &DependencyVersion,
    bytes: &[u8],
) -> std::io::Result<StagedArtifact> {
    tokio::fs::create_dir_all(dir).await?;

    let dest = dir.join(artifact_file_name(name, version));
    let temp = dest.with_extension("gz.part");

    if let Err(e) = write_file(&temp, bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }

    Ok(StagedArtifact { temp, dest })
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
