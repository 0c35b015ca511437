//! CLI implementation for `verlock fetch` command
//!
//! Composes the orchestrator from configuration, runs the manifest batch,
//! and reports the outcome.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::cli::commands::FetchArgs;
use crate::cli::output::{ConsoleSink, OutputConfig};
use crate::core::fetch::{Orchestrator, ResultOrder};
use crate::core::global_config::GlobalConfig;
use crate::core::manifest::Manifest;
use crate::core::strategy::{Fetcher, StrategyRegistry};
use crate::error::VerlockError;
use crate::infra::dirs::VerlockDirs;
use crate::infra::download::HttpFetcher;
use crate::infra::lock_store::FileLockStore;

/// Execute the fetch command
pub async fn execute(
    cwd: &Path,
    args: FetchArgs,
    output: &OutputConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let config = GlobalConfig::load(&VerlockDirs::new())
        .map_err(VerlockError::from)
        .with_context(|| "Failed to load global configuration")?;

    let manifest_path = args.paths.manifest_path(cwd);
    let manifest = Manifest::load(&manifest_path)
        .map_err(VerlockError::from)
        .with_context(|| format!("Failed to load {}", manifest_path.display()))?;
    let lock_path = args.paths.lock_path(cwd);

    let mut options = config.fetch_options();
    if let Some(concurrency) = args.concurrency {
        options.concurrency = concurrency.max(1);
    }
    if args.unordered {
        options.order = ResultOrder::Completion;
    }

    tracing::info!(
        "Fetching {} dependencies (concurrency {}, lock file {})",
        manifest.dependencies.len(),
        options.concurrency,
        lock_path.display()
    );

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config));
    let registry = StrategyRegistry::with_defaults(Arc::clone(&fetcher), &config);
    let sink = Arc::new(ConsoleSink::new(*output).with_spinner("Resolving dependencies..."));

    let mut orchestrator = Orchestrator::new(
        Arc::new(registry),
        fetcher,
        Arc::new(FileLockStore::new(&lock_path)),
    )
    .with_options(options)
    .with_sink(sink.clone());
    if let Some(dir) = args.artifacts_dir {
        orchestrator = orchestrator.with_artifacts_dir(dir);
    }

    let result = orchestrator
        .run(&manifest.dependencies, &cancel)
        .await
        .map_err(VerlockError::from)
        .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;

    sink.finish(&result)?;

    if cancel.is_cancelled() {
        tracing::warn!("Interrupted; unfinished dependencies were skipped");
    }
    if !result.is_success() {
        anyhow::bail!(
            "{} of {} dependencies failed",
            result.error_count(),
            result.locked_count() + result.error_count()
        );
    }
    if cancel.is_cancelled() {
        anyhow::bail!("Interrupted before all dependencies were locked");
    }

    Ok(())
}
