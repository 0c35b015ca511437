//! Version source strategies
//!
//! A strategy answers "which versions of this dependency exist" for one kind
//! of source. Strategies are looked up by the discriminator a
//! [`DependencySpec`] carries, through a [`StrategyRegistry`].
//!
//! - [`StaticStrategy`] (`static`) - fixed built-in catalog, no I/O
//! - [`RemoteTagStrategy`] (`remote-tag`) - tags of a hosted repository

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{defaults, urls};
use crate::core::global_config::GlobalConfig;
use crate::core::spec::{DependencySpec, RepoRef};
use crate::core::version::DependencyVersion;
use crate::error::{BatchError, StrategyError, TransportError};

/// Fetch collaborator: retrieves the bytes behind a locator
///
/// Used for tag listings and for artifacts. Implementations own timeouts and
/// retries; callers race the returned future against cancellation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the full body behind `locator`
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TransportError>;
}

/// A pluggable source of available versions
#[async_trait]
pub trait VersionStrategy: Send + Sync {
    /// Discriminator used in manifests
    fn kind(&self) -> &'static str;

    /// Structural checks on a spec, without I/O
    fn validate(&self, _spec: &DependencySpec) -> Result<(), BatchError> {
        Ok(())
    }

    /// List the available versions of a dependency
    async fn list_versions(
        &self,
        spec: &DependencySpec,
    ) -> Result<Vec<DependencyVersion>, StrategyError>;

    /// Locator of the artifact for a resolved version
    fn artifact_locator(&self, spec: &DependencySpec, version: &DependencyVersion) -> String;
}

/// Discriminator of [`StaticStrategy`]
pub const STATIC: &str = "static";

/// Discriminator of [`RemoteTagStrategy`]
pub const REMOTE_TAG: &str = "remote-tag";

/// Fixed catalog: every dependency has exactly version `1.0`
#[derive(Debug, Clone)]
pub struct StaticStrategy {
    base_url: String,
}

impl StaticStrategy {
    /// Create a static strategy serving artifacts under `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The built-in catalog
    pub fn catalog() -> Vec<DependencyVersion> {
        vec![DependencyVersion::new(1, 0)]
    }
}

impl Default for StaticStrategy {
    fn default() -> Self {
        Self::new(urls::STATIC_ARTIFACTS)
    }
}

#[async_trait]
impl VersionStrategy for StaticStrategy {
    fn kind(&self) -> &'static str {
        STATIC
    }

    async fn list_versions(
        &self,
        _spec: &DependencySpec,
    ) -> Result<Vec<DependencyVersion>, StrategyError> {
        Ok(Self::catalog())
    }

    fn artifact_locator(&self, spec: &DependencySpec, version: &DependencyVersion) -> String {
        format!("{}/{}/{version}.tar.gz", self.base_url, spec.name)
    }
}

/// Tag entry of the hosting provider's listing; other fields are ignored
#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Settings for [`RemoteTagStrategy`]
#[derive(Debug, Clone)]
pub struct RemoteTagSettings {
    /// REST API base URL
    pub api_url: String,
    /// Prefix stripped from tag names before parsing (e.g. `v`)
    pub tag_prefix: String,
    /// Tags requested per page
    pub page_size: usize,
    /// Maximum pages followed
    pub max_pages: u32,
}

impl Default for RemoteTagSettings {
    fn default() -> Self {
        Self {
            api_url: urls::GITHUB_API.to_string(),
            tag_prefix: defaults::DEFAULT_TAG_PREFIX.to_string(),
            page_size: defaults::TAG_PAGE_SIZE,
            max_pages: defaults::MAX_TAG_PAGES,
        }
    }
}

/// Versions from the tags of a GitHub-style repository
///
/// The strategy remembers the original tag name behind each listed version
/// so that artifact locators use the exact tag. Only the most recent listing
/// of each repository is kept: listing a repository again replaces what was
/// remembered for it, so memory grows with the number of distinct
/// repositories listed over the strategy's lifetime, not with the number of
/// listings.
pub struct RemoteTagStrategy {
    fetcher: Arc<dyn Fetcher>,
    settings: RemoteTagSettings,
    /// Tag name per version, from the latest listing of each repository
    tag_names: Mutex<HashMap<RepoRef, BTreeMap<DependencyVersion, String>>>,
}

impl RemoteTagStrategy {
    /// Create a remote tag strategy
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: RemoteTagSettings) -> Self {
        Self {
            fetcher,
            settings: RemoteTagSettings {
                api_url: settings.api_url.trim_end_matches('/').to_string(),
                ..settings
            },
            tag_names: Mutex::new(HashMap::new()),
        }
    }

    fn tags_url(&self, repo: &RepoRef, page: u32) -> String {
        format!(
            "{}/repos/{}/{}/tags?per_page={}&page={page}",
            self.settings.api_url, repo.owner, repo.repo, self.settings.page_size
        )
    }

    /// Map a tag name to a version; `None` for tags that are not versions
    fn parse_tag(&self, tag: &str) -> Option<DependencyVersion> {
        let text = tag.strip_prefix(&self.settings.tag_prefix).unwrap_or(tag);
        DependencyVersion::parse(text).ok()
    }

    async fn fetch_page(&self, repo: &RepoRef, page: u32) -> Result<Vec<TagEntry>, TransportError> {
        let url = self.tags_url(repo, page);
        let body = self.fetcher.fetch(&url).await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::InvalidResponse {
            url,
            error: e.to_string(),
        })
    }
}

#[async_trait]
impl VersionStrategy for RemoteTagStrategy {
    fn kind(&self) -> &'static str {
        REMOTE_TAG
    }

    fn validate(&self, spec: &DependencySpec) -> Result<(), BatchError> {
        match spec.source.as_deref() {
            None => Err(BatchError::MissingSource {
                name: spec.name.clone(),
                strategy: REMOTE_TAG.to_string(),
            }),
            Some(source) if RepoRef::parse(source).is_none() => Err(BatchError::InvalidSource {
                name: spec.name.clone(),
                source_ref: source.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    async fn list_versions(
        &self,
        spec: &DependencySpec,
    ) -> Result<Vec<DependencyVersion>, StrategyError> {
        // Unvalidated specs without a usable source have no candidates
        let Some(repo) = spec.repo() else {
            return Ok(Vec::new());
        };

        let mut found: BTreeMap<DependencyVersion, String> = BTreeMap::new();
        let mut complete = false;
        for page in 1..=self.settings.max_pages {
            let tags = self
                .fetch_page(&repo, page)
                .await
                .map_err(|source| StrategyError::Transport {
                    name: spec.name.clone(),
                    source,
                })?;
            let short_page = tags.len() < self.settings.page_size;

            for tag in tags {
                if let Some(version) = self.parse_tag(&tag.name) {
                    found.entry(version).or_insert(tag.name);
                }
            }

            if short_page {
                complete = true;
                break;
            }
        }

        if !complete {
            // Tags are not listed in version order, so the newest may be unseen
            tracing::warn!(
                "Tag listing of {}/{} stopped after {} pages; versions on later pages were not considered",
                repo.owner,
                repo.repo,
                self.settings.max_pages
            );
        }

        let versions = found.keys().cloned().collect();
        self.tag_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(repo, found);

        Ok(versions)
    }

    fn artifact_locator(&self, spec: &DependencySpec, version: &DependencyVersion) -> String {
        let repo = spec.repo().unwrap_or_else(|| RepoRef {
            owner: String::new(),
            repo: spec.name.clone(),
        });
        let tag = self
            .tag_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&repo)
            .and_then(|tags| tags.get(version))
            .cloned()
            .unwrap_or_else(|| format!("{}{version}", self.settings.tag_prefix));
        format!(
            "{}/repos/{}/{}/tarball/{tag}",
            self.settings.api_url, repo.owner, repo.repo
        )
    }
}

/// Lookup table from discriminator to strategy
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, Arc<dyn VersionStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the static and remote tag strategies configured from `config`
    pub fn with_defaults(fetcher: Arc<dyn Fetcher>, config: &GlobalConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StaticStrategy::new(config.static_base_url())));
        registry.register(Arc::new(RemoteTagStrategy::new(
            fetcher,
            config.remote_tag_settings(),
        )));
        registry
    }

    /// Register a strategy under its discriminator, replacing any previous one
    pub fn register(&mut self, strategy: Arc<dyn VersionStrategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    /// Strategy for a discriminator
    pub fn get(&self, kind: &str) -> Option<Arc<dyn VersionStrategy>> {
        self.strategies.get(kind).cloned()
    }

    /// Strategy for a spec, failing for unknown discriminators
    pub fn lookup(&self, spec: &DependencySpec) -> Result<Arc<dyn VersionStrategy>, BatchError> {
        self.get(&spec.strategy)
            .ok_or_else(|| BatchError::UnsupportedStrategy {
                name: spec.name.clone(),
                strategy: spec.strategy.clone(),
            })
    }

    /// Registered discriminators, sorted
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.strategies.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
