//! Transport layer for device connections.
//!
//! The client opens connections through a [`Connector`]. Production code uses
//! [`TcpConnector`], which dials the device over plain TCP; the protocol has no
//! encryption. Tests and embedders can plug in their own connector to run the
//! client over any writable stream.
//!
//! # Examples
//!
//! ```no_run
//! use magichome_client::transport::{Connector, TcpConnector};
//!
//! # async fn example() -> std::io::Result<()> {
//! let socket = TcpConnector.connect("192.168.1.61", 5577).await?;
//! # Ok(())
//! # }
//! ```

use magichome_protocol::socket::{DeviceSocket, TcpSocket};
use std::future::Future;
use std::io;

/// Opens connections to a device.
///
/// Implementations perform a single connection attempt per call. Retrying,
/// timeouts and state tracking are handled by the caller.
pub trait Connector: Send + Sync {
    /// Stream type produced by a successful connection.
    type Stream: DeviceSocket + 'static;

    /// Open a connection to `host:port`.
    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP connector.
///
/// Connections have `TCP_NODELAY` enabled so each frame is sent as soon as it
/// is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpSocket;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpSocket> {
        let socket = TcpSocket::connect(host, port).await?;
        if let Ok(local) = socket.local_addr() {
            tracing::debug!(
                "Connected via TCP: local={} -> remote={}",
                local,
                socket.peer_endpoint()
            );
        }
        Ok(socket)
    }
}
