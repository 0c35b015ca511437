//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Output;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding the manifest, the lock file and an
/// isolated global config directory.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write the global config pointing both sources at `base_url`
    pub fn write_config(&self, base_url: &str) {
        self.create_file(
            "config/config.toml",
            &format!(
                r#"
[github]
api_url = "{base_url}"

[download]
retries = 1
timeout_secs = 10

[static_source]
base_url = "{base_url}/static"
"#
            ),
        );
    }

    /// Write `verlock.toml`
    pub fn write_manifest(&self, content: &str) {
        self.create_file("verlock.toml", content);
    }

    /// Run the verlock binary inside the project
    pub async fn run(&self, args: &[&str]) -> Output {
        tokio::process::Command::new(env!("CARGO_BIN_EXE_verlock"))
            .current_dir(self.path())
            .env("VERLOCK_CONFIG_DIR", self.path().join("config"))
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .await
            .expect("Failed to execute verlock")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Manifest entry for a static dependency
pub fn static_dependency(name: &str, version: &str) -> String {
    format!(
        r#"
[[dependency]]
name = "{name}"
strategy = "static"
version = "{version}"
"#
    )
}

/// Manifest entry for a remote tag dependency
pub fn remote_dependency(name: &str, source: &str, version: &str) -> String {
    format!(
        r#"
[[dependency]]
name = "{name}"
strategy = "remote-tag"
source = "{source}"
version = "{version}"
"#
    )
}

/// Stdout as text
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as text
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
