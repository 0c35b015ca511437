//! Structured results of a batch
//!
//! Every outcome the core reports is a [`Message`]: a template with ordered,
//! named arguments. Error messages also carry an [`ErrorKind`] so callers can
//! branch on retryable versus terminal failures without parsing text. The core
//! never prints messages itself; it hands them to a [`ResultSink`].

use serde::{Deserialize, Serialize};

use crate::core::lock::DependencyLock;
use crate::error::{BatchError, DownloadError, ResolveError, StrategyError, VersionError};

/// Stable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed version text
    Format,
    /// Unknown strategy discriminator
    UnsupportedStrategy,
    /// Other structural manifest defect
    InvalidManifest,
    /// Exact version not available
    VersionNotFound,
    /// No version available at all
    NoMatchingVersion,
    /// Network, listing or fetch failure
    Transport,
    /// Artifact failed verification
    Integrity,
    /// Artifact or lock could not be persisted
    Storage,
}

impl ErrorKind {
    /// Whether retrying the same batch may succeed without changes
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Stable tag string
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::UnsupportedStrategy => "unsupported_strategy",
            Self::InvalidManifest => "invalid_manifest",
            Self::VersionNotFound => "version_not_found",
            Self::NoMatchingVersion => "no_matching_version",
            Self::Transport => "transport",
            Self::Integrity => "integrity",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named template argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageArg {
    /// Placeholder name
    pub name: String,
    /// Substituted value
    pub value: String,
}

/// Informational or error message with a template and ordered arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum Message {
    /// Informational message
    Info {
        template: String,
        args: Vec<MessageArg>,
    },
    /// Error message
    Error {
        kind: ErrorKind,
        template: String,
        args: Vec<MessageArg>,
    },
}

impl Message {
    /// Start an informational message
    pub fn info(template: impl Into<String>) -> Self {
        Self::Info {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Start an error message
    pub fn error(kind: ErrorKind, template: impl Into<String>) -> Self {
        Self::Error {
            kind,
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Append a named argument
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let arg = MessageArg {
            name: name.into(),
            value: value.to_string(),
        };
        match &mut self {
            Self::Info { args, .. } | Self::Error { args, .. } => args.push(arg),
        }
        self
    }

    /// Template string
    pub fn template(&self) -> &str {
        match self {
            Self::Info { template, .. } | Self::Error { template, .. } => template,
        }
    }

    /// Arguments in insertion order
    pub fn args(&self) -> &[MessageArg] {
        match self {
            Self::Info { args, .. } | Self::Error { args, .. } => args,
        }
    }

    /// Value of a named argument
    pub fn arg_value(&self, name: &str) -> Option<&str> {
        self.args()
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| arg.value.as_str())
    }

    /// Error kind, `None` for informational messages
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Info { .. } => None,
            Self::Error { kind, .. } => Some(*kind),
        }
    }

    /// Whether this is an error message
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Substitute `{index}` and `{name}` placeholders
    ///
    /// The template is scanned once; argument values are copied verbatim and
    /// never re-expanded. Unknown placeholders are left untouched.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template().len());
        let mut rest = self.template();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let key = after
                .find(['{', '}'])
                .filter(|&end| after.as_bytes()[end] == b'}')
                .map(|end| &after[..end]);

            match key.and_then(|key| self.placeholder_value(key)) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[key.map_or(0, str::len) + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Value for a placeholder key, by position or by name
    fn placeholder_value(&self, key: &str) -> Option<&str> {
        match key.parse::<usize>() {
            Ok(index) => self.args().get(index).map(|arg| arg.value.as_str()),
            Err(_) => self.arg_value(key),
        }
    }

    /// Error message for a dependency that failed resolution
    pub fn from_resolve_error(error: &ResolveError) -> Self {
        match error {
            ResolveError::VersionNotFound { name, version } => Self::error(
                ErrorKind::VersionNotFound,
                "Version {version} of {name} is not available",
            )
            .arg("name", name)
            .arg("version", version),
            ResolveError::NoMatchingVersion { name } => {
                Self::error(ErrorKind::NoMatchingVersion, "No version of {name} is available")
                    .arg("name", name)
            }
        }
    }

    /// Error message for a dependency whose version listing failed
    pub fn from_strategy_error(error: &StrategyError) -> Self {
        match error {
            StrategyError::Transport { name, source } => Self::error(
                ErrorKind::Transport,
                "Failed to list versions of {name}: {reason}",
            )
            .arg("name", name)
            .arg("reason", source),
        }
    }

    /// Error message for a dependency whose download failed
    pub fn from_download_error(name: &str, error: &DownloadError) -> Self {
        let kind = match error {
            DownloadError::Transport(_) => ErrorKind::Transport,
            DownloadError::Integrity { .. } => ErrorKind::Integrity,
            DownloadError::Storage { .. } => ErrorKind::Storage,
        };
        Self::error(kind, "Failed to download {name}: {reason}")
            .arg("name", name)
            .arg("reason", error)
    }

    /// Error message for a structural batch defect
    pub fn from_batch_error(error: &BatchError) -> Self {
        let kind = match error {
            BatchError::InvalidVersion {
                source: VersionError::Format { .. },
                ..
            } => ErrorKind::Format,
            BatchError::UnsupportedStrategy { .. } => ErrorKind::UnsupportedStrategy,
            BatchError::DuplicateDependency { .. }
            | BatchError::MissingSource { .. }
            | BatchError::InvalidSource { .. } => ErrorKind::InvalidManifest,
        };
        Self::error(kind, "{reason}").arg("reason", error)
    }
}

/// Observability collaborator receiving messages as they are produced
pub trait ResultSink: Send + Sync {
    /// Receive one message
    fn emit(&self, message: &Message);
}

/// Aggregate outcome of one batch
///
/// Counts are always derived from the lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadResult {
    locks: Vec<DependencyLock>,
    errors: Vec<Message>,
}

impl DownloadResult {
    /// Empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed lock
    pub fn push_lock(&mut self, lock: DependencyLock) {
        self.locks.push(lock);
    }

    /// Append an error message
    pub fn push_error(&mut self, error: Message) {
        self.errors.push(error);
    }

    /// Committed locks in processing order
    pub fn locks(&self) -> &[DependencyLock] {
        &self.locks
    }

    /// Errors in processing order
    pub fn errors(&self) -> &[Message] {
        &self.errors
    }

    /// Number of committed locks
    pub fn locked_count(&self) -> usize {
        self.locks.len()
    }

    /// Number of errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Whether the batch finished without errors
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Summary stating both counts
    pub fn summary(&self) -> Message {
        Message::info("Locked {locked} dependencies, {failed} failed")
            .arg("locked", self.locked_count())
            .arg("failed", self.error_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::DependencyVersion;
    use crate::error::TransportError;

    fn lock(name: &str) -> DependencyLock {
        DependencyLock {
            name: name.to_string(),
            version: DependencyVersion::new(1, 0),
            strategy: "static".to_string(),
            url: format!("https://example.com/{name}"),
            sha256: "00".repeat(32),
            size: 0,
        }
    }

    #[test]
    fn test_render_positional_and_named() {
        let message = Message::info("{0} then {second} then {0}")
            .arg("first", "a")
            .arg("second", "b");
        assert_eq!(message.render(), "a then b then a");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let message = Message::info("hello {who} {missing}").arg("who", "world");
        assert_eq!(message.render(), "hello world {missing}");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        let message = Message::error(ErrorKind::Transport, "Failed {name}: {reason}")
            .arg("name", "lib {reason}")
            .arg("reason", "boom {0}");
        assert_eq!(message.render(), "Failed lib {reason}: boom {0}");
    }

    #[test]
    fn test_render_unbalanced_braces() {
        let message = Message::info("{{name}} and {name").arg("name", "x");
        assert_eq!(message.render(), "{x} and {name");
    }

    #[test]
    fn test_args_keep_order() {
        let message = Message::error(ErrorKind::Integrity, "x")
            .arg("b", 1)
            .arg("a", 2);
        let names: Vec<_> = message.args().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(message.arg_value("a"), Some("2"));
        assert_eq!(message.kind(), Some(ErrorKind::Integrity));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::Transport.is_retryable());
        assert!(!ErrorKind::Integrity.is_retryable());
        assert!(!ErrorKind::VersionNotFound.is_retryable());
        assert!(!ErrorKind::Storage.is_retryable());
    }

    #[test]
    fn test_error_conversions_carry_name() {
        let message = Message::from_resolve_error(&ResolveError::VersionNotFound {
            name: "lib".to_string(),
            version: "2.0".to_string(),
        });
        assert_eq!(message.kind(), Some(ErrorKind::VersionNotFound));
        assert_eq!(message.render(), "Version 2.0 of lib is not available");

        let message = Message::from_download_error(
            "lib",
            &DownloadError::Transport(TransportError::Status {
                url: "https://example.com".to_string(),
                status: 404,
            }),
        );
        assert_eq!(message.kind(), Some(ErrorKind::Transport));
        assert_eq!(message.arg_value("name"), Some("lib"));
    }

    #[test]
    fn test_counts_follow_lists() {
        let mut result = DownloadResult::new();
        assert_eq!(result.summary().render(), "Locked 0 dependencies, 0 failed");
        assert!(result.is_success());

        result.push_lock(lock("a"));
        result.push_lock(lock("b"));
        result.push_error(Message::error(ErrorKind::Transport, "boom"));

        assert_eq!(result.locked_count(), 2);
        assert_eq!(result.error_count(), 1);
        assert!(!result.is_success());
        assert_eq!(result.summary().render(), "Locked 2 dependencies, 1 failed");
    }

    #[test]
    fn test_message_json_shape() {
        let message = Message::error(ErrorKind::NoMatchingVersion, "t").arg("name", "x");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["kind"], "no_matching_version");
        assert_eq!(json["args"][0]["name"], "name");
    }
}
