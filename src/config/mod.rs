//! Configuration and constants
//!
//! - [`defaults`] - Default values for downloads, listing and file names
//! - [`urls`] - Hosting provider and artifact base URLs

pub mod defaults;
pub mod urls;
