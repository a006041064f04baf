//! Error types for the device client.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a device.
#[derive(Debug, Error)]
pub enum MagicHomeError {
    /// Connection failed (TCP connection establishment failed).
    #[error("Connection to {addr} failed: {source}")]
    ConnectionFailed {
        /// Address the client tried to reach.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The peer reset the connection during a write.
    #[error("Connection reset by peer: {0}")]
    ConnectionReset(#[source] io::Error),

    /// Any other transport-level failure.
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// Connect or write did not complete in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Write attempted with no open connection.
    #[error("Not connected")]
    NotConnected,

    /// Command input outside the documented range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MagicHomeError {
    /// Classify an I/O error raised by a write.
    ///
    /// Resets, aborts and broken pipes all mean the peer dropped the
    /// connection and map to [`MagicHomeError::ConnectionReset`]; everything
    /// else is a plain transport error.
    #[must_use]
    pub fn from_write_error(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::ConnectionReset(err),
            _ => Self::Transport(err),
        }
    }

    /// Returns true if this error triggers the reconnect-and-resend cycle.
    #[must_use]
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, Self::ConnectionReset(_))
    }

    /// Returns true if a caller may reasonably try the command again later.
    ///
    /// The client itself only ever retries a reset, and only once.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectionReset(_)
                | Self::Transport(_)
                | Self::Timeout(_)
        )
    }

    /// Returns true if this is a fatal error that should not be retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}
