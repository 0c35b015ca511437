//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod fetch;
pub mod forget;
pub mod locks;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::cli::output::OutputConfig;
use crate::config::defaults;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and download every dependency in the manifest
    Fetch(FetchArgs),

    /// List recorded locks
    Locks {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Remove the lock recorded for a dependency
    Forget {
        /// Dependency name
        name: String,

        #[command(flatten)]
        paths: PathArgs,
    },
}

/// Manifest and lock file locations
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Manifest path (default: ./verlock.toml)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Lock file path (default: verlock.lock next to the manifest)
    #[arg(long)]
    pub lock_file: Option<PathBuf>,
}

impl PathArgs {
    /// Effective manifest path
    pub fn manifest_path(&self, cwd: &Path) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| cwd.join(defaults::MANIFEST_FILE))
    }

    /// Effective lock file path
    pub fn lock_path(&self, cwd: &Path) -> PathBuf {
        if let Some(path) = &self.lock_file {
            return path.clone();
        }
        let manifest = self.manifest_path(cwd);
        manifest
            .parent()
            .unwrap_or(cwd)
            .join(defaults::LOCK_FILE)
    }
}

/// Arguments of `verlock fetch`
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Dependencies processed at once (default from config, else 1)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Report results in completion order instead of manifest order
    #[arg(long)]
    pub unordered: bool,

    /// Keep downloaded artifacts in this directory
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    #[command(flatten)]
    pub paths: PathArgs,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, output: &OutputConfig, cancel: CancellationToken) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Fetch(args) => fetch::execute(&current_dir, args, output, cancel).await,
            Self::Locks { paths } => locks::execute(&paths.lock_path(&current_dir), output).await,
            Self::Forget { name, paths } => {
                forget::execute(&paths.lock_path(&current_dir), &name, output).await
            }
        }
    }
}
