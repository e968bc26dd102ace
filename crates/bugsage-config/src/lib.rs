//! Configuration management for BugSage.
//!
//! Loads layered settings (defaults, `.bugsage/config.yaml`, `BUGSAGE_*`
//! environment variables) and discovers the `.bugsage/` project directory.

pub mod bugsage_dir;
pub mod config;

pub use config::{BugSageConfig, ConfigError};
