//! Device connection state.
//!
//! A device connection is either open or not; there is no handshake. The
//! client reports its connection through [`ConnectionState`]; connecting an
//! open connection and disconnecting a closed one leave the state unchanged.

use std::fmt;

/// Connection state of a device client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No connection is open.
    #[default]
    Disconnected,

    /// A TCP connection to the device is open.
    Connected,
}

impl ConnectionState {
    /// Returns true when a connection is open.
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}
