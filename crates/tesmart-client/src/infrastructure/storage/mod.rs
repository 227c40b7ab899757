//! Storage infrastructure: the device configuration file.
//!
//! The `config` sub-module handles:
//!
//! - Locating `config.toml` (explicit path or the platform config directory).
//! - Parsing it into [`config::AppConfig`], with defaults for absent fields.
//! - Turning a configured device into a ready-to-use `SwitchClient`.
//!
//! The driver never writes the file; it is edited by hand.

pub mod config;
