//! Configuration Module
//!
//! Loads and validates configuration from TOML files. Every setting has a
//! built-in default, so the file is optional.

pub mod loader;

pub use loader::{
    Config, ConfigError, load_config, load_config_or_default, MAX_FRESHNESS_SECS,
};
