//! Connection management for a single device.
//!
//! [`ConnectionManager`] owns at most one open stream to the device and is the
//! only place that stream is opened, written, or closed. The state machine has
//! two states, mirrored by [`ConnectionState`]:
//!
//! - `Disconnected` -> `Connected` via [`connect`](ConnectionManager::connect)
//! - `Connected` -> `Disconnected` via [`disconnect`](ConnectionManager::disconnect)
//!
//! Both transitions are no-ops when the manager is already in the target
//! state. Writes never open a connection on their own.

use crate::errors::MagicHomeError;
use crate::observer::ConnectionObserver;
use crate::transport::Connector;
use magichome_protocol::socket::DeviceSocket;
use magichome_protocol::{ConnectionState, Frame};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

enum Link<S> {
    Disconnected,
    Connected { stream: S, peer: String },
}

/// Owns the connection to one device.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
    link: Link<C::Stream>,
    observer: Arc<dyn ConnectionObserver>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates a disconnected manager for `host:port`.
    pub fn new(
        connector: C,
        host: impl Into<String>,
        port: u16,
        connect_timeout: Duration,
        write_timeout: Duration,
        observer: Arc<dyn ConnectionObserver>,
    ) -> Self {
        Self {
            connector,
            host: host.into(),
            port,
            connect_timeout,
            write_timeout,
            link: Link::Disconnected,
            observer,
        }
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match self.link {
            Link::Disconnected => ConnectionState::Disconnected,
            Link::Connected { .. } => ConnectionState::Connected,
        }
    }

    /// Returns true when a connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the `host:port` address of the device.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Opens the connection if it is not already open.
    ///
    /// A single attempt is made; failures are returned to the caller without
    /// retrying.
    ///
    /// # Errors
    ///
    /// Returns [`MagicHomeError::ConnectionFailed`] if the connection is
    /// refused or unreachable, or [`MagicHomeError::Timeout`] if it does not
    /// complete within the connect timeout.
    pub async fn connect(&mut self) -> Result<(), MagicHomeError> {
        if self.is_connected() {
            return Ok(());
        }

        let addr = self.address();
        self.observer.on_connecting(&addr);

        let attempt = self.connector.connect(&self.host, self.port);
        let stream = match timeout(self.connect_timeout, attempt).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(MagicHomeError::ConnectionFailed { addr, source }),
            Err(_) => return Err(MagicHomeError::Timeout(self.connect_timeout)),
        };

        let peer = stream.peer_endpoint();
        self.observer.on_connected(&peer);
        self.link = Link::Connected { stream, peer };
        Ok(())
    }

    /// Closes the connection if it is open.
    ///
    /// The stream is shut down on a best-effort basis: a peer that already
    /// dropped the connection cannot make this fail. Afterwards the state is
    /// always `Disconnected`.
    pub async fn disconnect(&mut self) {
        let Link::Connected { mut stream, peer } =
            std::mem::replace(&mut self.link, Link::Disconnected)
        else {
            return;
        };

        match timeout(self.write_timeout, stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Shutdown of {} failed: {}", peer, e),
            Err(_) => tracing::debug!("Shutdown of {} timed out", peer),
        }
        drop(stream);
        self.observer.on_disconnected(&peer);
    }

    /// Writes a complete frame on the open connection.
    ///
    /// Returns the number of bytes written, which is always the frame length.
    ///
    /// # Errors
    ///
    /// - [`MagicHomeError::NotConnected`] if no connection is open
    /// - [`MagicHomeError::ConnectionReset`] if the peer reset the connection
    /// - [`MagicHomeError::Transport`] for any other I/O failure
    /// - [`MagicHomeError::Timeout`] if the write does not complete in time
    pub async fn write(&mut self, frame: &Frame) -> Result<usize, MagicHomeError> {
        let write_timeout = self.write_timeout;
        let Link::Connected { stream, peer } = &mut self.link else {
            return Err(MagicHomeError::NotConnected);
        };

        let bytes = frame.as_bytes();
        let written = timeout(write_timeout, async {
            stream.write_all(bytes).await?;
            stream.flush().await
        })
        .await;

        match written {
            Ok(Ok(())) => {
                self.observer.on_frame_sent(peer, frame);
                Ok(bytes.len())
            }
            Ok(Err(e)) => Err(MagicHomeError::from_write_error(e)),
            Err(_) => Err(MagicHomeError::Timeout(write_timeout)),
        }
    }
}
