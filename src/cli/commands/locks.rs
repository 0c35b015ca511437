//! CLI implementation for `verlock locks` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::OutputConfig;
use crate::core::lock::{DependencyLock, LockStore};
use crate::error::VerlockError;
use crate::infra::lock_store::FileLockStore;

/// Characters of the checksum shown in text output
const SHORT_CHECKSUM: usize = 12;

/// Execute the locks command
pub async fn execute(lock_path: &Path, output: &OutputConfig) -> Result<()> {
    let locks = FileLockStore::new(lock_path)
        .read_all()
        .await
        .map_err(VerlockError::from)
        .with_context(|| "Failed to read locks")?;

    if output.json {
        let list: Vec<&DependencyLock> = locks.values().collect();
        return output.print_json(&list);
    }

    if locks.is_empty() {
        if !output.quiet {
            println!("No locks recorded in {}", lock_path.display());
        }
        return Ok(());
    }

    for lock in locks.values() {
        println!("{}", format_lock(lock));
    }
    Ok(())
}

/// One-line rendering of a lock
pub fn format_lock(lock: &DependencyLock) -> String {
    let short = lock.sha256.get(..SHORT_CHECKSUM).unwrap_or(&lock.sha256);
    format!("{} {} ({}, sha256:{short})", lock.name, lock.version, lock.strategy)
}
