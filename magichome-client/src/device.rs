//! The device client facade.
//!
//! [`DeviceClient`] turns commands into frames and sends them over a lazily
//! opened connection. Sending follows one fixed algorithm:
//!
//! 1. Connect if not connected.
//! 2. Write the frame.
//! 3. If the peer reset the connection, disconnect, reconnect and write the
//!    same frame again, once. The result of that second write is returned.
//! 4. Any other failure is returned immediately.
//! 5. With `close_after_send` set, the connection is closed after the
//!    attempt, whatever its outcome.
//!
//! Commands on one client are serialized: each holds the connection lock
//! from connect to final write, so frames from concurrent callers never
//! interleave on the socket.

use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::errors::MagicHomeError;
use crate::messages::DeviceCommand;
use crate::observer::{ConnectionObserver, TracingObserver};
use crate::transport::{Connector, TcpConnector};
use magichome_protocol::{ChannelOrder, ConnectionState, Frame};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Number of resends after a connection reset.
pub const MAX_RESET_RETRIES: u32 = 1;

/// Client for a single RGB(W) device.
///
/// The client starts disconnected and connects on the first command. It is
/// `Send + Sync` and can be shared between tasks behind an [`Arc`].
///
/// # Examples
///
/// ```no_run
/// use magichome_client::{ChannelOrder, DeviceClient};
///
/// # async fn example() -> Result<(), magichome_client::MagicHomeError> {
/// let device = DeviceClient::new("192.168.2.61", ChannelOrder::Rgb)?;
/// device.set_power(true).await?;
/// device.set_color_rgbw(255, 255, 255, 255).await?;
/// device.set_color_hsv(120.0, 100.0, 100.0).await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceClient<C: Connector = TcpConnector> {
    host: String,
    channel_order: ChannelOrder,
    close_after_send: AtomicBool,
    connection: Mutex<ConnectionManager<C>>,
    observer: Arc<dyn ConnectionObserver>,
}

impl DeviceClient<TcpConnector> {
    /// Creates a client for the device at `host` on the default port.
    ///
    /// # Errors
    ///
    /// Returns [`MagicHomeError::Config`] if `host` is empty.
    pub fn new(
        host: impl Into<String>,
        channel_order: ChannelOrder,
    ) -> Result<Self, MagicHomeError> {
        let config = Config::builder()
            .host(host)
            .channel_order(channel_order)
            .build()?;
        Ok(Self::from_config(config, TcpConnector, Arc::new(TracingObserver)))
    }
}

impl<C: Connector> DeviceClient<C> {
    /// Assembles a client from a validated configuration.
    pub(crate) fn from_config(
        config: Config,
        connector: C,
        observer: Arc<dyn ConnectionObserver>,
    ) -> Self {
        let connection = ConnectionManager::new(
            connector,
            config.connection.host.clone(),
            config.connection.port,
            config.connect_timeout(),
            config.write_timeout(),
            Arc::clone(&observer),
        );

        Self {
            host: config.connection.host,
            channel_order: config.device.channel_order,
            close_after_send: AtomicBool::new(config.device.close_after_send),
            connection: Mutex::new(connection),
            observer,
        }
    }

    /// The device host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The channel order used for color frames.
    #[must_use]
    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    /// Whether the connection is closed after every command.
    #[must_use]
    pub fn close_after_send(&self) -> bool {
        self.close_after_send.load(Ordering::SeqCst)
    }

    /// Close the connection after every command (or stop doing so).
    ///
    /// Takes effect from the next command that completes.
    pub fn set_close_after_send(&self, close: bool) {
        self.close_after_send.store(close, Ordering::SeqCst);
    }

    /// Current connection state.
    ///
    /// Waits for any in-flight command to finish.
    pub async fn state(&self) -> ConnectionState {
        self.connection.lock().await.state()
    }

    /// Returns true when a connection is open.
    pub async fn is_connected(&self) -> bool {
        self.state().await.is_connected()
    }

    /// Opens the connection now instead of on the first command.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(&self) -> Result<(), MagicHomeError> {
        self.connection.lock().await.connect().await
    }

    /// Closes the connection if it is open.
    pub async fn disconnect(&self) {
        self.connection.lock().await.disconnect().await;
    }

    /// Switches the device on or off.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_power(&self, on: bool) -> Result<usize, MagicHomeError> {
        self.execute(DeviceCommand::Power { on }).await
    }

    /// Sets red, green, blue and white channel levels.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_color_rgbw(
        &self,
        r: u8,
        g: u8,
        b: u8,
        w: u8,
    ) -> Result<usize, MagicHomeError> {
        self.execute(DeviceCommand::Rgbw { r, g, b, w }).await
    }

    /// Sets red, green and blue with the white channel off.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_color_rgb(&self, r: u8, g: u8, b: u8) -> Result<usize, MagicHomeError> {
        self.set_color_rgbw(r, g, b, 0).await
    }

    /// Sets a color in HSV space, with `h` in degrees `[0, 360)` and `s`,
    /// `v` in percent `[0, 100]`. The white channel is switched off.
    ///
    /// # Errors
    ///
    /// Returns [`MagicHomeError::InvalidInput`] before any I/O if a component
    /// is out of range; otherwise see [`send`](Self::send).
    pub async fn set_color_hsv(&self, h: f64, s: f64, v: f64) -> Result<usize, MagicHomeError> {
        self.execute(DeviceCommand::Hsv { h, s, v }).await
    }

    /// Encodes and sends a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is invalid or sending fails.
    pub async fn execute(&self, command: DeviceCommand) -> Result<usize, MagicHomeError> {
        let frame = command.to_frame(self.channel_order)?;
        tracing::trace!("{:?} -> {}", command, frame);
        self.send(&frame).await
    }

    /// Sends a frame, reconnecting and resending once if the peer reset the
    /// connection.
    ///
    /// Returns the number of bytes written by the successful write.
    ///
    /// # Errors
    ///
    /// - [`MagicHomeError::ConnectionFailed`] / [`MagicHomeError::Timeout`]
    ///   if connecting (or reconnecting) fails
    /// - [`MagicHomeError::ConnectionReset`] if the resend also hit a reset
    /// - [`MagicHomeError::Transport`] for any other write failure
    pub async fn send(&self, frame: &Frame) -> Result<usize, MagicHomeError> {
        let mut connection = self.connection.lock().await;
        let result = self.send_locked(&mut connection, frame).await;
        if self.close_after_send() {
            connection.disconnect().await;
        }
        result
    }

    async fn send_locked(
        &self,
        connection: &mut ConnectionManager<C>,
        frame: &Frame,
    ) -> Result<usize, MagicHomeError> {
        connection.connect().await?;

        let mut retries_left = MAX_RESET_RETRIES;
        loop {
            match connection.write(frame).await {
                Ok(written) => return Ok(written),
                Err(err) if err.is_connection_reset() && retries_left > 0 => {
                    retries_left -= 1;
                    self.observer.on_connection_reset(&connection.address(), &err);
                    connection.disconnect().await;
                    connection.connect().await?;
                }
                Err(err) => {
                    // The stream may hold a partial frame; a fresh connection
                    // keeps the next command aligned.
                    connection.disconnect().await;
                    return Err(err);
                }
            }
        }
    }
}
