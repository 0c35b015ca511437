//! Platform-specific directory management
//!
//! Provides the platform-specific config directory.
//! Follows XDG Base Directory Specification on Linux and standard locations on macOS.
//!
//! `VERLOCK_CONFIG_DIR` overrides the default location.

use std::env;
use std::path::PathBuf;

use crate::config::defaults;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "VERLOCK_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "verlock";

/// Platform-specific directory provider for verlock
#[derive(Debug, Clone)]
pub struct VerlockDirs {
    config_dir: PathBuf,
}

impl VerlockDirs {
    /// Create a new `VerlockDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/verlock` or `~/.config/verlock`
    /// - macOS: `~/Library/Application Support/verlock`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(defaults::CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir().map_or_else(
            || {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
                    .join(APP_NAME)
            },
            |p| p.join(APP_NAME),
        )
    }
}

impl Default for VerlockDirs {
    fn default() -> Self {
        Self::new()
    }
}
