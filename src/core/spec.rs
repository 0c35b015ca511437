//! Validated dependency declarations
//!
//! A [`DependencySpec`] is the checked form of a manifest entry: its version
//! selector has been parsed and its strategy exists. Specs are built once per
//! batch by [`crate::core::fetch::Orchestrator::validate`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::version::DependencyVersion;
use crate::error::VersionError;

/// Selector keyword for the newest available version
pub const LATEST: &str = "latest";

/// Which version of a dependency to pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "version")]
pub enum VersionSelector {
    /// Exactly this version
    Exact(DependencyVersion),
    /// The greatest available version
    Latest,
}

impl VersionSelector {
    /// Parse a selector: `latest` or a version
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        if text.trim() == LATEST {
            Ok(Self::Latest)
        } else {
            DependencyVersion::parse(text.trim()).map(Self::Exact)
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(version) => write!(f, "{version}"),
            Self::Latest => f.write_str(LATEST),
        }
    }
}

/// `owner/repo` coordinate on the hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Parse `owner/repo`
    ///
    /// Returns `None` unless there are exactly two non-empty segments.
    pub fn parse(text: &str) -> Option<Self> {
        let (owner, repo) = text.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A validated dependency declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Dependency name, unique within a batch
    pub name: String,
    /// Strategy discriminator, e.g. `static` or `remote-tag`
    pub strategy: String,
    /// Version selector
    pub selector: VersionSelector,
    /// Source coordinate for strategies that query a remote
    pub source: Option<String>,
    /// Expected SHA256 of the artifact
    pub sha256: Option<String>,
}

impl DependencySpec {
    /// Create a spec without source or checksum
    pub fn new(
        name: impl Into<String>,
        strategy: impl Into<String>,
        selector: VersionSelector,
    ) -> Self {
        Self {
            name: name.into(),
            strategy: strategy.into(),
            selector,
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

    /// Set the expected artifact checksum
    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Parsed `owner/repo` source, if present and well formed
    pub fn repo(&self) -> Option<RepoRef> {
        self.source.as_deref().and_then(RepoRef::parse)
    }
}
