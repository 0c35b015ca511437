//! Batch resolve-and-download orchestration
//!
//! The [`Orchestrator`] drives one batch: it validates every declaration up
//! front, then for each dependency lists versions, resolves one, fetches the
//! artifact, verifies it, and commits a lock. Per-dependency failures become
//! error messages in the [`DownloadResult`]; they never stop the batch.
//!
//! A lock is committed only after the artifact was fully fetched and
//! verified. Cancellation abandons listing and fetching, omits items that
//! have not started, and never interrupts a commit in progress.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::config::defaults;
use crate::core::lock::{DependencyLock, LockStore};
use crate::core::manifest::ManifestEntry;
use crate::core::resolver::resolve;
use crate::core::result::{DownloadResult, Message, ResultSink};
use crate::core::spec::{DependencySpec, VersionSelector};
use crate::core::strategy::{Fetcher, StrategyRegistry, VersionStrategy};
use crate::core::version::DependencyVersion;
use crate::error::{BatchError, DownloadError, TransportError};
use crate::infra::download::{compute_checksum, stage_artifact};

/// Order of entries in a [`DownloadResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrder {
    /// Manifest order, reproducible across runs
    #[default]
    Input,
    /// Order in which dependencies finished
    Completion,
}

/// Options for a batch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Dependencies processed at once
    pub concurrency: usize,
    /// Result ordering
    pub order: ResultOrder,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: defaults::DEFAULT_CONCURRENCY,
            order: ResultOrder::Input,
        }
    }
}

/// Outcome of one dependency that ran to completion
enum Outcome {
    Locked(DependencyLock),
    Failed(Message),
}

/// Resolve-and-download driver for a batch of dependencies
pub struct Orchestrator {
    strategies: Arc<StrategyRegistry>,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn LockStore>,
    options: FetchOptions,
    sink: Option<Arc<dyn ResultSink>>,
    artifacts_dir: Option<PathBuf>,
}

impl Orchestrator {
    /// Compose an orchestrator from its collaborators
    pub fn new(
        strategies: Arc<StrategyRegistry>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn LockStore>,
    ) -> Self {
        Self {
            strategies,
            fetcher,
            store,
            options: FetchOptions::default(),
            sink: None,
            artifacts_dir: None,
        }
    }

    /// Set batch options
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Report each outcome to `sink` as it completes
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Keep fetched artifacts as files in `dir`
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Turn manifest entries into specs, rejecting structural defects
    ///
    /// Performs no I/O. The first defect aborts the whole batch.
    pub fn validate(&self, entries: &[ManifestEntry]) -> Result<Vec<DependencySpec>, BatchError> {
        let mut specs = Vec::with_capacity(entries.len());
        for entry in entries {
            let selector = VersionSelector::parse(&entry.version).map_err(|source| {
                BatchError::InvalidVersion {
                    name: entry.name.clone(),
                    source,
                }
            })?;
            specs.push(DependencySpec {
                name: entry.name.clone(),
                strategy: entry.strategy.clone(),
                selector,
                source: entry.source.clone(),
                sha256: entry.sha256.clone(),
            });
        }

        self.check_specs(&specs)?;
        Ok(specs)
    }

    /// Strategy, source and uniqueness checks on already-built specs
    pub fn check_specs(&self, specs: &[DependencySpec]) -> Result<(), BatchError> {
        let mut seen = HashSet::new();
        for spec in specs {
            self.strategies.lookup(spec)?.validate(spec)?;
            if !seen.insert(spec.name.as_str()) {
                return Err(BatchError::DuplicateDependency {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Validate, resolve and download a whole manifest batch
    pub async fn run(
        &self,
        entries: &[ManifestEntry],
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, BatchError> {
        let specs = self.validate(entries)?;
        let items = specs.into_iter().map(|spec| (spec, None)).collect();
        Ok(self.process(items, cancel).await)
    }

    /// Download already-resolved dependencies
    pub async fn download(
        &self,
        pairs: Vec<(DependencySpec, DependencyVersion)>,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, BatchError> {
        let specs: Vec<_> = pairs.iter().map(|(spec, _)| spec.clone()).collect();
        self.check_specs(&specs)?;
        let items = pairs
            .into_iter()
            .map(|(spec, version)| (spec, Some(version)))
            .collect();
        Ok(self.process(items, cancel).await)
    }

    async fn process(
        &self,
        items: Vec<(DependencySpec, Option<DependencyVersion>)>,
        cancel: &CancellationToken,
    ) -> DownloadResult {
        let limit = self.options.concurrency.max(1);
        let pending = futures::stream::iter(
            items
                .into_iter()
                .map(|(spec, version)| self.process_one(spec, version, cancel)),
        );

        let outcomes: Vec<Option<Outcome>> = match self.options.order {
            ResultOrder::Input => pending.buffered(limit).collect().await,
            ResultOrder::Completion => pending.buffer_unordered(limit).collect().await,
        };

        let mut result = DownloadResult::new();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Outcome::Locked(lock) => result.push_lock(lock),
                Outcome::Failed(message) => result.push_error(message),
            }
        }
        result
    }

    /// Run one dependency; `None` when cancelled before it completed
    async fn process_one(
        &self,
        spec: DependencySpec,
        version: Option<DependencyVersion>,
        cancel: &CancellationToken,
    ) -> Option<Outcome> {
        if cancel.is_cancelled() {
            return None;
        }

        let outcome = match self.strategies.lookup(&spec) {
            Ok(strategy) => self.resolve_and_fetch(&spec, strategy.as_ref(), version, cancel).await?,
            Err(e) => Outcome::Failed(Message::from_batch_error(&e)),
        };

        if let Some(sink) = &self.sink {
            match &outcome {
                Outcome::Locked(lock) => sink.emit(&locked_message(lock)),
                Outcome::Failed(message) => sink.emit(message),
            }
        }
        Some(outcome)
    }

    async fn resolve_and_fetch(
        &self,
        spec: &DependencySpec,
        strategy: &dyn VersionStrategy,
        version: Option<DependencyVersion>,
        cancel: &CancellationToken,
    ) -> Option<Outcome> {
        let version = match version {
            Some(version) => version,
            None => {
                let listed = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return None,
                    listed = strategy.list_versions(spec) => listed,
                };
                let versions = match listed {
                    Ok(versions) => versions,
                    Err(e) => return Some(Outcome::Failed(Message::from_strategy_error(&e))),
                };
                match resolve(spec, &versions) {
                    Ok(version) => version,
                    Err(e) => return Some(Outcome::Failed(Message::from_resolve_error(&e))),
                }
            }
        };

        let url = strategy.artifact_locator(spec, &version);
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return None,
            fetched = self.fetcher.fetch(&url) => fetched,
        };

        // Past this point the item always finishes, so a commit is never torn
        Some(
            match self.commit(spec, strategy.kind(), version, url, fetched).await {
                Ok(lock) => Outcome::Locked(lock),
                Err(e) => Outcome::Failed(Message::from_download_error(&spec.name, &e)),
            },
        )
    }

    /// Verify fetched bytes and write the lock
    async fn commit(
        &self,
        spec: &DependencySpec,
        strategy: &str,
        version: DependencyVersion,
        url: String,
        fetched: Result<Vec<u8>, TransportError>,
    ) -> Result<DependencyLock, DownloadError> {
        let bytes = fetched?;
        let sha256 = compute_checksum(&bytes);

        if let Some(expected) = &spec.sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                return Err(DownloadError::Integrity {
                    name: spec.name.clone(),
                    expected: expected.to_lowercase(),
                    actual: sha256,
                });
            }
        }

        let storage_error = |error: String| DownloadError::Storage {
            name: spec.name.clone(),
            error,
        };

        // Same version must mean same bytes as the existing lock
        let previous = self
            .store
            .get(&spec.name)
            .await
            .map_err(|e| storage_error(e.to_string()))?;
        if let Some(previous) = previous.as_ref().filter(|p| p.version == version) {
            if !previous.sha256.eq_ignore_ascii_case(&sha256) {
                return Err(DownloadError::Integrity {
                    name: spec.name.clone(),
                    expected: previous.sha256.clone(),
                    actual: sha256,
                });
            }
        }

        // Artifacts become visible only once the lock referring to them exists
        let staged = match &self.artifacts_dir {
            Some(dir) => Some(
                stage_artifact(dir, &spec.name, &version, &bytes)
                    .await
                    .map_err(|e| storage_error(e.to_string()))?,
            ),
            None => None,
        };

        let lock = DependencyLock {
            name: spec.name.clone(),
            version,
            strategy: strategy.to_string(),
            url,
            sha256,
            size: bytes.len() as u64,
        };
        if let Err(e) = self.store.write(&lock).await {
            if let Some(staged) = staged {
                staged.discard().await;
            }
            return Err(storage_error(e.to_string()));
        }

        if let Some(staged) = staged {
            if let Err(e) = staged.publish().await {
                self.restore(&spec.name, previous).await;
                return Err(storage_error(e.to_string()));
            }
        }
        Ok(lock)
    }

    /// Put back the lock that was current before a failed commit
    async fn restore(&self, name: &str, previous: Option<DependencyLock>) {
        let _ = match previous {
            Some(lock) => self.store.write(&lock).await,
            None => self.store.remove(name).await.map(|_| ()),
        };
    }
}

fn locked_message(lock: &DependencyLock) -> Message {
    Message::info("Locked {name} {version}")
        .arg("name", &lock.name)
        .arg("version", &lock.version)
}
