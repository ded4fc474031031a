//! Storage infrastructure: client configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the
//! platform-appropriate directory (or an explicit path given on the command
//! line), supplies defaults on first run, and writes it back when asked.

pub mod config;
