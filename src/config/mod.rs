//! Configuration module for the threads-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Rate-limit settings with hot reload
//! - Settings validation

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{Config, OptionsConfig, RateLimitConfig, DEFAULT_NAMESPACE};
pub use settings::{Settings, SettingsHandle};
pub use validation::{validate_config, validate_settings};
