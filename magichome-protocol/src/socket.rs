//! Socket abstraction for device connections.
//!
//! Devices listen on a fixed TCP port ([`DEFAULT_PORT`]). The protocol is
//! write-only, so a device socket only needs to be writable; anything that
//! implements [`DeviceSocket`] can carry frames.
//!
//! # Examples
//!
//! ```no_run
//! use magichome_protocol::socket::{DeviceSocket, TcpSocket, DEFAULT_PORT};
//!
//! # async fn example() -> std::io::Result<()> {
//! let socket = TcpSocket::connect("192.168.1.61", DEFAULT_PORT).await?;
//! println!("Connected to: {}", socket.peer_endpoint());
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;

/// TCP port every device listens on.
pub const DEFAULT_PORT: u16 = 5577;

/// Core trait for device socket connections.
///
/// # Requirements
///
/// - `AsyncWrite`: frames are written, never read back
/// - `Send + Unpin`: the socket is owned by a client that may move across tasks
pub trait DeviceSocket: AsyncWrite + Send + Unpin {
    /// Get the peer endpoint, e.g. `"192.168.1.61:5577"`.
    fn peer_endpoint(&self) -> String;
}

/// TCP socket wrapper for device connections.
///
/// Frames are a handful of bytes each, so `TCP_NODELAY` is set to push every
/// command out immediately instead of waiting on Nagle's algorithm.
pub struct TcpSocket {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl TcpSocket {
    /// Connect to a device via TCP.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - DNS resolution fails
    /// - Connection is refused
    /// - Network is unreachable
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        let peer_addr = stream.peer_addr()?;
        stream.set_nodelay(true)?;

        Ok(Self { stream, peer_addr })
    }

    /// Get the underlying TCP stream.
    pub fn into_inner(self) -> TcpStream {
        self.stream
    }

    /// Get the resolved peer address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get the local address of the connection.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.local_addr()
    }
}

impl DeviceSocket for TcpSocket {
    fn peer_endpoint(&self) -> String {
        self.peer_addr.to_string()
    }
}

impl AsyncWrite for TcpSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
