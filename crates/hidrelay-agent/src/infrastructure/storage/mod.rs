//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the TOML configuration from `--config` or
//! the platform config directory, fills in defaults for anything missing and
//! validates the result before the agent starts.

pub mod config;
