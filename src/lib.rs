//! Verlock - dependency version resolution, download and locking
//!
//! This library resolves declared dependencies to concrete versions through
//! pluggable version sources, downloads their artifacts, and records the
//! result in a lock file for reproducible builds.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic (versions, strategies, resolution, orchestration)
//! - [`infra`] - Infrastructure layer (network, filesystem)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
