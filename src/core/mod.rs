//! Core business logic module
//!
//! This module contains all business logic for verlock. It performs I/O only
//! through the collaborator traits it defines ([`strategy::Fetcher`],
//! [`lock::LockStore`], [`result::ResultSink`]); implementations live in
//! [`crate::infra`] and [`crate::cli`].
//!
//! # Submodules
//!
//! - [`version`] - Version model, parsing and ordering
//! - [`spec`] - Validated dependency declarations
//! - [`manifest`] - Manifest (verlock.toml) parsing
//! - [`strategy`] - Version source strategies and their registry
//! - [`resolver`] - Version selection
//! - [`lock`] - Lock records and the lock store contract
//! - [`fetch`] - Batch resolve-and-download orchestration
//! - [`result`] - Messages and batch results
//! - [`global_config`] - Global configuration management

pub mod fetch;
pub mod global_config;
pub mod lock;
pub mod manifest;
pub mod resolver;
pub mod result;
pub mod spec;
pub mod strategy;
pub mod version;
