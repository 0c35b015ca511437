//! Error types for verlock
//!
//! Domain-specific error types using thiserror.
//!
//! Errors fall in two groups. Structural manifest defects ([`VersionError`],
//! [`BatchError`]) abort a batch before any I/O. Per-dependency failures
//! ([`ResolveError`], [`StrategyError`], [`DownloadError`]) are isolated by the
//! orchestrator and reported as error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Version text errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Text does not match `<major>.<minor>[.<patch>][-tag]`
    #[error("Invalid version '{text}': {reason}")]
    Format { text: String, reason: String },
}

/// Structural batch errors, raised during validation before any network activity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Exact version selector is not a valid version
    #[error("Dependency '{name}' has an invalid version selector: {source}")]
    InvalidVersion {
        name: String,
        #[source]
        source: VersionError,
    },

    /// No strategy is registered for the discriminator
    #[error("Dependency '{name}' uses unsupported strategy '{strategy}'")]
    UnsupportedStrategy { name: String, strategy: String },

    /// The same dependency name appears twice in one batch
    #[error("Dependency '{name}' is declared more than once")]
    DuplicateDependency { name: String },

    /// Strategy needs a source coordinate but none was given
    #[error("Dependency '{name}' uses strategy '{strategy}' which requires a source")]
    MissingSource { name: String, strategy: String },

    /// Source coordinate is malformed
    #[error("Dependency '{name}' has invalid source '{source_ref}': expected owner/repo")]
    InvalidSource { name: String, source_ref: String },
}

/// Resolution errors, scoped to a single dependency
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Exact version is not among the available versions
    #[error("Version {version} of '{name}' not found")]
    VersionNotFound { name: String, version: String },

    /// No version is available at all
    #[error("No matching version available for '{name}'")]
    NoMatchingVersion { name: String },
}

/// Fetch collaborator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection or body transfer failure
    #[error("Network error fetching '{url}': {error}")]
    Network { url: String, error: String },

    /// Non-success HTTP status
    #[error("HTTP {status} fetching '{url}'")]
    Status { url: String, status: u16 },

    /// Request timed out
    #[error("Timed out fetching '{url}'")]
    Timeout { url: String },

    /// Retries exhausted without a more specific error
    #[error("Fetch failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },

    /// Response body could not be decoded
    #[error("Invalid response from '{url}': {error}")]
    InvalidResponse { url: String, error: String },
}

/// Version listing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Listing could not be retrieved
    #[error("Failed to list versions for '{name}': {source}")]
    Transport {
        name: String,
        #[source]
        source: TransportError,
    },
}

/// Per-dependency download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Artifact could not be fetched
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Artifact does not match the expected checksum
    #[error("Checksum mismatch for '{name}': expected {expected}, got {actual}")]
    Integrity {
        name: String,
        expected: String,
        actual: String,
    },

    /// Artifact or lock could not be written
    #[error("Failed to store '{name}': {error}")]
    Storage { name: String, error: String },
}

/// Lock store errors
#[derive(Error, Debug)]
pub enum LockStoreError {
    /// Failed to read the lock file
    #[error("Failed to read lock file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Lock file content is malformed
    #[error("Failed to parse lock file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Lock file has a format version this build does not understand
    #[error("Lock file '{path}' has unsupported format version {version}")]
    UnsupportedFormat { path: PathBuf, version: u32 },

    /// Failed to serialize locks
    #[error("Failed to serialize lock file: {0}")]
    Serialize(String),

    /// Failed to write the lock file
    #[error("Failed to write lock file '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file does not exist
    #[error("Manifest not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Manifest could not be read
    #[error("Failed to read manifest '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Manifest is not valid TOML for the expected shape
    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level verlock error type
///
/// Failures that end a command, as opposed to the per-dependency errors a
/// batch reports as messages.
#[derive(Error, Debug)]
pub enum VerlockError {
    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Batch validation error
    #[error("Invalid batch: {0}")]
    Batch(#[from] BatchError),

    /// Lock store error
    #[error("Lock store error: {0}")]
    LockStore(#[from] LockStoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::global_config::GlobalConfigError),

    /// No lock is recorded under the name
    #[error("No lock recorded for '{name}'")]
    LockNotFound { name: String },
}
