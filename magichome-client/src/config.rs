//! Configuration types for the device client.

use crate::errors::MagicHomeError;
use magichome_protocol::{ChannelOrder, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete device client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Device settings.
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Device hostname or IP address.
    pub host: String,
    /// Device port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Write timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    5_000
}

/// Device configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Order of the red, green and blue channels on the wire.
    #[serde(default)]
    pub channel_order: ChannelOrder,
    /// Close the connection after every command.
    #[serde(default)]
    pub close_after_send: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig {
                host: String::new(),
                port: default_port(),
                connect_timeout_ms: default_timeout_ms(),
                write_timeout_ms: default_timeout_ms(),
            },
            device: DeviceConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the result fails validation.
    pub fn from_toml_str(s: &str) -> Result<Self, MagicHomeError> {
        let config: Config = toml::from_str(s)
            .map_err(|e| MagicHomeError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file (TOML format).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MagicHomeError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MagicHomeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), MagicHomeError> {
        if self.connection.host.is_empty() {
            return Err(MagicHomeError::Config("Host cannot be empty".to_string()));
        }

        if self.connection.port == 0 {
            return Err(MagicHomeError::Config("Port cannot be 0".to_string()));
        }

        if self.connection.connect_timeout_ms == 0 || self.connection.write_timeout_ms == 0 {
            return Err(MagicHomeError::Config(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the `host:port` address of the device.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.connection.host, self.connection.port)
    }

    /// Returns the connect timeout duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connection.connect_timeout_ms)
    }

    /// Returns the write timeout duration.
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.connection.write_timeout_ms)
    }
}

/// Builder for creating a `Config`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the device hostname or IP address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.connection.host = host.into();
        self
    }

    /// Sets the device port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.connection.port = port;
        self
    }

    /// Sets the channel order.
    #[must_use]
    pub fn channel_order(mut self, order: ChannelOrder) -> Self {
        self.config.device.channel_order = order;
        self
    }

    /// Closes the connection after every command.
    #[must_use]
    pub fn close_after_send(mut self, close: bool) -> Self {
        self.config.device.close_after_send = close;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection.connect_timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Sets the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection.write_timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Config, MagicHomeError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
