//! Hosting provider and artifact URLs

/// GitHub REST API base URL
pub const GITHUB_API: &str = "https://api.github.com";

/// Base URL for artifacts of the static catalog
pub const STATIC_ARTIFACTS: &str =
    "https://raw.githubusercontent.com/verlock/static-artifacts/main";
