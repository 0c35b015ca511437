//! Manifest (verlock.toml) parsing
//!
//! The manifest lists dependencies as an array of tables. Declaration order
//! is batch order, which keeps lock output reproducible.
//!
//! ```toml
//! [[dependency]]
//! name = "tokio"
//! strategy = "remote-tag"
//! source = "tokio-rs/tokio"
//! version = "latest"
//!
//! [[dependency]]
//! name = "fixtures"
//! strategy = "static"
//! version = "1.0"
//! sha256 = "e3b0c442..."
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::spec::LATEST;
use crate::error::ManifestError;

/// A dependency exactly as written, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Dependency name
    pub name: String,

    /// Strategy discriminator
    pub strategy: String,

    /// `latest` or an exact version
    #[serde(default = "default_selector")]
    pub version: String,

    /// Source coordinate (`owner/repo` for remote tags)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Expected SHA256 of the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

fn default_selector() -> String {
    LATEST.to_string()
}

impl ManifestEntry {
    /// Create an entry with no source or checksum
    pub fn new(
        name: impl Into<String>,
        strategy: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            strategy: strategy.into(),
            version: version.into(),
            source: None,
            sha256: None,
        }
    }

    /// Set the source coordinate
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the expected checksum
    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }
}

/// Project manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Dependencies in declaration order
    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load manifest from file path
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Ok(Self::from_toml(&content)?)
    }
}
