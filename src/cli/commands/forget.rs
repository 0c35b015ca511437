//! CLI implementation for `verlock forget` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::OutputConfig;
use crate::core::lock::LockStore;
use crate::error::VerlockError;
use crate::infra::lock_store::FileLockStore;

/// Execute the forget command
pub async fn execute(lock_path: &Path, name: &str, output: &OutputConfig) -> Result<()> {
    let removed = FileLockStore::new(lock_path)
        .remove(name)
        .await
        .map_err(VerlockError::from)
        .with_context(|| format!("Failed to remove lock for '{name}'"))?;

    if !removed {
        return Err(VerlockError::LockNotFound {
            name: name.to_string(),
        }
        .into());
    }

    if output.json {
        return output.print_json(&serde_json::json!({ "removed": name }));
    }
    output.success(&format!("Removed lock for {name}"));
    Ok(())
}
