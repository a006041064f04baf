//! High-level async client for MagicHome-style RGB(W) LED controllers.
//!
//! This crate drives a single device over its plain TCP protocol, built on
//! top of the low-level `magichome-protocol` crate. It handles lazy
//! connection management, command encoding, reconnect-on-reset and
//! per-device command serialization.
//!
//! # Features
//!
//! - **Async I/O**: Built on tokio, with timeouts on connect and write
//! - **Lazy connection**: The connection opens on the first command
//! - **Bounded recovery**: A reset during a write triggers exactly one
//!   reconnect and resend; a second failure is returned to the caller
//! - **Serialized commands**: Concurrent callers never interleave frames
//! - **Configuration management**: TOML files and a builder API
//! - **Pluggable observability**: Connection events go to a
//!   [`ConnectionObserver`], `tracing` by default
//!
//! # Quick Start
//!
//! ```no_run
//! use magichome_client::{ChannelOrder, Config, DeviceClientBuilder};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::builder()
//!         .host("192.168.2.61")
//!         .channel_order(ChannelOrder::Rgb)
//!         .build()?;
//!
//!     let device = DeviceClientBuilder::new(config).build()?;
//!
//!     device.set_power(true).await?;
//!     device.set_color_rgbw(255, 255, 255, 255).await?;
//!
//!     for h in 0..360 {
//!         device.set_color_hsv(f64::from(h), 100.0, 100.0).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Every failure is returned to the caller of the command. Nothing is
//! retried except a connection reset during a write, and that only once.
//!
//! # Safety
//!
//! This crate is `#![forbid(unsafe_code)]` and uses only safe Rust.

#![forbid(unsafe_code)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::cargo
)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod connection;
pub mod device;
pub mod errors;
pub mod messages;
pub mod observer;
pub mod transport;

// Private implementation modules
mod wire_trace;

// Optional CLI support
#[cfg(feature = "cli")]
pub mod args;

// Re-exports
pub use config::Config;
pub use device::DeviceClient;
pub use errors::MagicHomeError;
pub use magichome_protocol::{ChannelOrder, ConnectionState, Frame, Hsv, Rgb};
pub use messages::DeviceCommand;
pub use observer::{ConnectionObserver, NoopObserver, TracingObserver};
pub use transport::{Connector, TcpConnector};

use std::sync::Arc;

/// Enables or disables hex tracing of outgoing frames on the `wire` target.
///
/// Tracing starts enabled when `MAGICHOME_TRACE` is `1` or `true`.
pub fn set_wire_trace(on: bool) {
    wire_trace::set_enabled(on);
}

/// Builder for creating a device client.
///
/// # Examples
///
/// ```no_run
/// use magichome_client::{Config, DeviceClientBuilder, NoopObserver};
/// use std::sync::Arc;
/// # use anyhow::Result;
///
/// # fn example() -> Result<()> {
/// let config = Config::builder().host("192.168.2.61").build()?;
///
/// let device = DeviceClientBuilder::new(config)
///     .observer(Arc::new(NoopObserver))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceClientBuilder<C: Connector = TcpConnector> {
    config: Config,
    connector: C,
    observer: Arc<dyn ConnectionObserver>,
}

impl DeviceClientBuilder<TcpConnector> {
    /// Creates a new builder that connects over TCP.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            connector: TcpConnector,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl<C: Connector> DeviceClientBuilder<C> {
    /// Uses a custom connector to open device connections.
    #[must_use]
    pub fn connector<C2: Connector>(self, connector: C2) -> DeviceClientBuilder<C2> {
        DeviceClientBuilder {
            config: self.config,
            connector,
            observer: self.observer,
        }
    }

    /// Reports connection events to `observer` instead of `tracing`.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn ConnectionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Builds the client. No connection is opened yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<DeviceClient<C>, MagicHomeError> {
        self.config.validate()?;
        Ok(DeviceClient::from_config(
            self.config,
            self.connector,
            self.observer,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_validates_config() {
        let config = Config::default();
        assert!(DeviceClientBuilder::new(config).build().is_err());
    }

    #[tokio::test]
    async fn test_builder_applies_config() {
        let config = Config::builder()
            .host("10.0.0.9")
            .channel_order(ChannelOrder::Brg)
            .close_after_send(true)
            .build()
            .unwrap();
        let device = DeviceClientBuilder::new(config)
            .observer(Arc::new(NoopObserver))
            .build()
            .unwrap();

        assert_eq!(device.host(), "10.0.0.9");
        assert_eq!(device.channel_order(), ChannelOrder::Brg);
        assert!(device.close_after_send());
        assert_eq!(device.state().await, ConnectionState::Disconnected);
    }
}
