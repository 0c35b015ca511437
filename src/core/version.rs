//! Version model for resolved dependencies
//!
//! This module handles:
//! - Parsing `<major>.<minor>[.<patch>][-tag]` version text
//! - Total ordering where a release ranks above its pre-releases
//! - Canonical formatting that round-trips through [`DependencyVersion::parse`]

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Grammar for version text. Numeric components never carry leading zeros so
/// that the canonical form is unique.
const VERSION_PATTERN: &str =
    r"^(0|[1-9]\d*)\.(0|[1-9]\d*)(?:\.(0|[1-9]\d*))?(?:-([0-9A-Za-z][0-9A-Za-z.\-]*))?$";

fn version_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).ok()).as_ref()
}

/// A concrete dependency version
///
/// An absent patch component is stored as `0`, so `1.0` and `1.0.0` are the
/// same version and both format as `1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencyVersion {
    major: u64,
    minor: u64,
    patch: u64,
    tag: Option<String>,
}

impl DependencyVersion {
    /// Create an untagged `major.minor` version
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            major,
            minor,
            patch: 0,
            tag: None,
        }
    }

    /// Set the patch component
    #[must_use]
    pub fn with_patch(mut self, patch: u64) -> Self {
        self.patch = patch;
        self
    }

    /// Set the pre-release tag
    ///
    /// An empty tag is the same as no tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = if tag.is_empty() { None } else { Some(tag) };
        self
    }

    /// Parse version text
    ///
    /// # Examples
    /// ```
    /// use verlock::core::version::DependencyVersion;
    ///
    /// let v = DependencyVersion::parse("1.2-beta").unwrap();
    /// assert_eq!(v.to_string(), "1.2-beta");
    /// assert!(DependencyVersion::parse("1").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let format_error = |reason: &str| VersionError::Format {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let caps = version_regex()
            .and_then(|re| re.captures(text))
            .ok_or_else(|| format_error("expected <major>.<minor>[.<patch>][-tag]"))?;

        let component = |index: usize| -> Result<u64, VersionError> {
            caps.get(index).map_or(Ok(0), |m| {
                m.as_str()
                    .parse::<u64>()
                    .map_err(|_| format_error("numeric component out of range"))
            })
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            tag: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    /// Major component
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor component
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch component (`0` when absent)
    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Pre-release tag, if any
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Whether this version carries a pre-release tag
    pub fn is_prerelease(&self) -> bool {
        self.tag.is_some()
    }
}

impl Ord for DependencyVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.tag, &other.tag) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_tags(a, b),
            })
    }
}

impl PartialOrd for DependencyVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two pre-release tags identifier by identifier
///
/// Numeric identifiers compare numerically and rank below alphanumeric ones.
/// A tag that is a strict prefix of the other ranks lower.
fn compare_tags(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }

    // Numerically equal identifiers such as "01" and "1" still differ as text
    a.cmp(b)
}

impl fmt::Display for DependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if let Some(tag) = &self.tag {
            write!(f, "-{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for DependencyVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DependencyVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DependencyVersion> for String {
    fn from(value: DependencyVersion) -> Self {
        value.to_string()
    }
}
