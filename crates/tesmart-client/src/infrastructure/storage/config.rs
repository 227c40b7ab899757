//! TOML-based device configuration.
//!
//! Read from `--config <path>` or the platform-appropriate file:
//! - Windows:  `%APPDATA%\TESmart\config.toml`
//! - Linux:    `~/.config/tesmart/config.toml` (honours `XDG_CONFIG_HOME`)
//! - macOS:    `~/Library/Application Support/TESmart/config.toml`
//!
//! # Example
//!
//! ```toml
//! log_level = "info"
//!
//! [timings]
//! settle_delay_ms = 200
//!
//! [devices.office]
//! host = "192.168.1.10"
//! friendly_name = "Office KVM"
//! sources = ["PC", "Mac", "Pi"]
//! source_ignore = ["Pi"]
//!
//! [devices.rack]
//! host = "10.0.0.5"
//! dialect = "legacy"
//! ```
//!
//! Every field except a device's `host` has a default, so a config written
//! for an older release keeps loading.  A device whose `sources` list is
//! absent or empty gets the dialect's default names (`HDMI 1`..`HDMI 16` for
//! LAN firmware, `HDMI 0`..`HDMI 7` for legacy firmware).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tesmart_core::{
    default_sources, DeviceEndpoint, Dialect, PortMap, PortMapError, DEFAULT_DEVICE_PORT,
};
use thiserror::Error;

use crate::application::switch_client::SwitchClient;
use crate::application::transport::Transport;
use crate::infrastructure::network::tcp_transport::{
    TransportTimings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_SETTLE_DELAY,
};

/// Error type for configuration loading and device resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A device entry cannot be turned into a client.
    #[error("device {slug:?} is misconfigured: {source}")]
    InvalidDevice {
        slug: String,
        #[source]
        source: PortMapError,
    },

    /// The requested device slug is not in the file.
    #[error("no device named {slug:?} in config (known: {known})")]
    UnknownDevice { slug: String, known: String },

    /// No slug was given and the file does not hold exactly one device.
    #[error("{count} devices configured; choose one with --device")]
    DeviceRequired { count: usize },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub timings: TimingsConfig,
    /// Devices keyed by slug; sorted so listings are stable.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceConfig>,
}

/// Network timing overrides, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingsConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// One switch on the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub dialect: Dialect,
    /// Display name; the slug is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Source names in port order.  Empty means "dialect defaults".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Names hidden from the selectable list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ignore: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_port() -> u16 {
    DEFAULT_DEVICE_PORT
}
fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}
fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}
fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT.as_millis() as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timings: TimingsConfig::default(),
            devices: BTreeMap::new(),
        }
    }
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl From<TimingsConfig> for TransportTimings {
    fn from(cfg: TimingsConfig) -> Self {
        TransportTimings {
            connect_timeout: Duration::from_millis(cfg.connect_timeout_ms),
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            read_timeout: Duration::from_millis(cfg.read_timeout_ms),
        }
    }
}

// ── Device resolution ─────────────────────────────────────────────────────────

impl DeviceConfig {
    /// Creates an entry for `host` with every other field defaulted.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            dialect: Dialect::default(),
            friendly_name: None,
            unique_id: None,
            sources: Vec::new(),
            source_ignore: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.host.clone(), self.port)
    }

    /// Builds the device's port map, falling back to the dialect defaults
    /// when no sources are configured.
    ///
    /// # Errors
    ///
    /// [`PortMapError::TooManySources`] if the list exceeds what the dialect
    /// can address.
    pub fn port_map(&self) -> Result<PortMap, PortMapError> {
        let sources = if self.sources.is_empty() {
            default_sources(self.dialect)
        } else {
            self.sources.clone()
        };
        PortMap::new(self.dialect, sources, self.source_ignore.iter().cloned())
    }

    /// The friendly name, or `slug` when none is configured.
    pub fn display_name<'a>(&'a self, slug: &'a str) -> &'a str {
        self.friendly_name.as_deref().unwrap_or(slug)
    }

    /// Builds a [`SwitchClient`] for this device.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDevice`] if the source list is invalid.
    pub fn build_client(
        &self,
        slug: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<SwitchClient, ConfigError> {
        let port_map = self.port_map().map_err(|source| ConfigError::InvalidDevice {
            slug: slug.to_string(),
            source,
        })?;
        let client = SwitchClient::new(
            self.display_name(slug),
            self.endpoint(),
            self.dialect,
            port_map,
            transport,
        );
        Ok(match &self.unique_id {
            Some(id) => client.with_unique_id(id.clone()),
            None => client,
        })
    }
}

impl AppConfig {
    /// Looks up a device by slug, or picks the only device when `slug` is `None`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownDevice`] if `slug` is not configured.
    /// - [`ConfigError::DeviceRequired`] if `slug` is `None` and the file does
    ///   not hold exactly one device.
    pub fn resolve_device<'a>(
        &'a self,
        slug: Option<&'a str>,
    ) -> Result<(&'a str, &'a DeviceConfig), ConfigError> {
        match slug {
            Some(slug) => self
                .devices
                .get(slug)
                .map(|device| (slug, device))
                .ok_or_else(|| ConfigError::UnknownDevice {
                    slug: slug.to_string(),
                    known: self.known_slugs(),
                }),
            None => {
                let mut devices = self.devices.iter();
                match (devices.next(), devices.next()) {
                    (Some((slug, device)), None) => Ok((slug.as_str(), device)),
                    _ => Err(ConfigError::DeviceRequired {
                        count: self.devices.len(),
                    }),
                }
            }
        }
    }

    fn known_slugs(&self) -> String {
        if self.devices.is_empty() {
            return "none".to_string();
        }
        self.devices.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Parses configuration text.
///
/// # Errors
///
/// [`ConfigError::Parse`] if the TOML is malformed or a field has the wrong type.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads `AppConfig` from `path`, or from [`config_file_path`] when `path` is
/// `None`.  A missing file yields `AppConfig::default()`.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system errors other than "not found", and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Resolves the platform config directory including the `tesmart` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("TESmart"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("tesmart"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("TESmart"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
