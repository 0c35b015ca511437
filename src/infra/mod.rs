//! Infrastructure layer
//!
//! Handles network and filesystem I/O behind the core's collaborator traits.

pub mod dirs;
pub mod download;
pub mod lock_store;
