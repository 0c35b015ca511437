//! Default configuration values

/// Maximum number of fetch attempts per locator
pub const MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Base delay for exponential backoff between attempts (in milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Upper bound for a single backoff delay (in milliseconds)
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

/// Default number of dependencies processed at once (sequential)
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Whole-request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Connection timeout (in seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Tags requested per page from the hosting provider
pub const TAG_PAGE_SIZE: usize = 100;

/// Maximum number of tag pages followed per dependency
pub const MAX_TAG_PAGES: u32 = 10;

/// Prefix stripped from tag names before parsing them as versions
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// Manifest file name
pub const MANIFEST_FILE: &str = "verlock.toml";

/// Lock file name
pub const LOCK_FILE: &str = "verlock.lock";

/// Global configuration file name
pub const CONFIG_FILE: &str = "config.toml";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("verlock/", env!("CARGO_PKG_VERSION"));
