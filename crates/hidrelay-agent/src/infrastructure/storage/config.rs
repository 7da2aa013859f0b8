//! TOML-based configuration for the agent.
//!
//! Reads `AppConfig` from `--config <path>` or from the platform config file:
//! - Windows:  `%APPDATA%\HidRelay\config.toml`
//! - Linux:    `~/.config/hidrelay/config.toml`
//! - macOS:    `~/Library/Application Support/HidRelay/config.toml`
//!
//! A missing file is not an error: the agent runs on defaults.
//!
//! # What is TOML? (for beginners)
//!
//! TOML is a small configuration format that reads like an INI file but has
//! real data types.  Example:
//!
//! ```toml
//! [endpoint]
//! host = "192.168.0.139"
//! port = 81
//!
//! [input]
//! toggle_key = "KEY_GRAVE"
//! mouse_name = "USB Gaming Mouse"
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "some_fn")]`, so any subset of the
//! file (including an empty file) is valid and the rest falls back to
//! defaults.  [`AppConfig::validate`] then rejects values that parse but make
//! no sense, such as port 0 or a toggle key name nobody recognises.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hidrelay_core::{Backoff, KeyCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_tungstenite::tungstenite::http::Uri;

/// Error type for configuration file operations.
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

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    /// `tracing` log level or filter directive; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the HID endpoint listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// `"ws"` or `"wss"`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    /// Full URL; when set it replaces scheme, host, port and path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Key that flips forwarding, by friendly or evdev name.
    #[serde(default = "default_toggle_key")]
    pub toggle_key: String,
    /// Exact device name to pick as the mouse; first pointer wins if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_name: Option<String>,
    /// Upper bound on one capture poll wait.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Minimum spacing between forwarded pointer moves.
    #[serde(default = "default_move_interval_ms")]
    pub move_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// How often a healthy connection is re-checked.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// Send each `MOVE:dx:dy` as two single-axis messages.
    #[serde(default)]
    pub split_move_axes: bool,
    /// Longest one frame write may take before the link is dropped.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_scheme() -> String {
    "ws".to_string()
}
fn default_host() -> String {
    "192.168.0.139".to_string()
}
fn default_port() -> u16 {
    81
}
fn default_path() -> String {
    "/".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_send_timeout_ms() -> u64 {
    5000
}
fn default_toggle_key() -> String {
    "KEY_GRAVE".to_string()
}
fn default_poll_timeout_ms() -> u64 {
    100
}
fn default_move_interval_ms() -> u64 {
    16
}
fn default_base_delay_ms() -> u64 {
    5000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_multiplier() -> f64 {
    1.5
}
fn default_check_interval_ms() -> u64 {
    1000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            path: default_path(),
            url: None,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            toggle_key: default_toggle_key(),
            mouse_name: None,
            poll_timeout_ms: default_poll_timeout_ms(),
            move_interval_ms: default_move_interval_ms(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            check_interval_ms: default_check_interval_ms(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { split_move_axes: false, send_timeout_ms: default_send_timeout_ms() }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl AppConfig {
    /// Checks every value the agent depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint.validate()?;
        self.toggle_key()?;

        if self.input.poll_timeout_ms == 0 {
            return Err(ConfigError::Invalid("input.poll_timeout_ms must be greater than 0".into()));
        }
        if self.transport.send_timeout_ms == 0 {
            return Err(ConfigError::Invalid("transport.send_timeout_ms must be greater than 0".into()));
        }
        let r = &self.reconnect;
        if r.multiplier.is_nan() || r.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "reconnect.multiplier must be at least 1.0, got {}",
                r.multiplier
            )));
        }
        if r.base_delay_ms > r.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "reconnect.base_delay_ms ({}) exceeds max_delay_ms ({})",
                r.base_delay_ms, r.max_delay_ms
            )));
        }
        Ok(())
    }

    /// The configured toggle key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the name is not recognised.
    pub fn toggle_key(&self) -> Result<KeyCode, ConfigError> {
        self.input
            .toggle_key
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("toggle key: {e}")))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.input.poll_timeout_ms)
    }

    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.input.move_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.endpoint.connect_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.transport.send_timeout_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect.check_interval_ms)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.reconnect.base_delay_ms),
            Duration::from_millis(self.reconnect.max_delay_ms),
            self.reconnect.multiplier,
        )
    }
}

impl EndpointConfig {
    /// The WebSocket URL to dial.
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => {
                let path = if self.path.starts_with('/') { self.path.clone() } else { format!("/{}", self.path) };
                format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            let uri: Uri = url
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("endpoint URL {url:?}: {e}")))?;
            if !matches!(uri.scheme_str(), Some("ws" | "wss")) {
                return Err(ConfigError::Invalid(format!("endpoint URL {url:?} must use ws:// or wss://")));
            }
            if uri.host().map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid(format!("endpoint URL {url:?} has no host")));
            }
            return Ok(());
        }

        if !matches!(self.scheme.as_str(), "ws" | "wss") {
            return Err(ConfigError::Invalid(format!(
                "endpoint.scheme must be \"ws\" or \"wss\", got {:?}",
                self.scheme
            )));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("endpoint.port must not be 0".into()));
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path: path.to_path_buf(), source: e }),
    }
}

/// Writes `config` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("HidRelay"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hidrelay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("HidRelay"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
