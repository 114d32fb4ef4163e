//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `roomctl.toml` in the working directory, or at the path named by
//! `ROOMCTL_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use roomctl_domain::error::RoomCtlError;
use roomctl_domain::id::{DeviceId, RoomId};
use roomctl_domain::room::{DeviceConfig, RoomConfig};

const DEFAULT_PATH: &str = "roomctl.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Driver-wide settings, keyed by driver name.
    pub drivers: BTreeMap<String, toml::Table>,
    /// Rooms served by this instance, keyed by room id.
    pub rooms: BTreeMap<String, RoomSection>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Upper bound for one room request, in seconds.
    pub request_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One `[rooms.<id>]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoomSection {
    /// Optional explicit id; must match the table key when present.
    pub id: Option<String>,
    pub proxy: Option<String>,
    pub devices: BTreeMap<String, DeviceConfig>,
}

impl Config {
    /// Load configuration from `roomctl.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ROOMCTL_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Parse a configuration document, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ROOMCTL_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ROOMCTL_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("ROOMCTL_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("ROOMCTL_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.server.request_timeout_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("ROOMCTL_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check the settings and every room.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero port or timeout, and
    /// [`ConfigError::Room`] for a malformed room.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be non-zero".to_string(),
            ));
        }
        self.room_configs().map(|_| ())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Driver settings converted to the JSON shape drivers parse.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a table cannot be represented
    /// as JSON.
    pub fn driver_settings(&self) -> Result<Vec<(&str, serde_json::Value)>, ConfigError> {
        self.drivers
            .iter()
            .map(|(name, table)| {
                serde_json::to_value(table)
                    .map(|value| (name.as_str(), value))
                    .map_err(|err| ConfigError::Validation(format!("drivers.{name}: {err}")))
            })
            .collect()
    }

    /// Every `[rooms.<id>]` table as a validated [`RoomConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Room`] naming the first offending room, or
    /// [`ConfigError::Validation`] when a room's `id` contradicts its key.
    pub fn room_configs(&self) -> Result<Vec<RoomConfig>, ConfigError> {
        self.rooms
            .iter()
            .map(|(key, section)| section.to_room(key))
            .collect()
    }
}

impl RoomSection {
    fn to_room(&self, key: &str) -> Result<RoomConfig, ConfigError> {
        if let Some(explicit) = self.id.as_deref().filter(|id| *id != key) {
            return Err(ConfigError::Validation(format!(
                "rooms.{key}: id {explicit:?} does not match the table key"
            )));
        }
        self.build(key).map_err(|source| ConfigError::Room {
            room: key.to_string(),
            source,
        })
    }

    fn build(&self, key: &str) -> Result<RoomConfig, RoomCtlError> {
        let mut builder = RoomConfig::builder(RoomId::from_str(key)?);
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy);
        }
        for (device, config) in &self.devices {
            builder = builder.device(DeviceId::from_str(device)?, config.clone());
        }
        builder.build()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "roomctld=info,roomctl_app=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A room table does not describe a valid room.
    #[error("invalid room {room:?}")]
    Room {
        room: String,
        #[source]
        source: RoomCtlError,
    },
}
