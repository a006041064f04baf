//! Connection lifecycle observers.
//!
//! The client reports connection events through a [`ConnectionObserver`]
//! instead of logging to a fixed sink. [`TracingObserver`] is installed by
//! default and forwards events to `tracing`; callers that want metrics,
//! custom logging, or test assertions inject their own implementation via
//! [`DeviceClientBuilder::observer`](crate::DeviceClientBuilder::observer).

use crate::errors::MagicHomeError;
use crate::wire_trace;
use magichome_protocol::Frame;

/// Receives connection lifecycle events from a device client.
///
/// All methods have empty default implementations so observers only
/// override what they care about. Methods are called while the client holds
/// its command lock and must not block.
pub trait ConnectionObserver: Send + Sync {
    /// A connection attempt to `addr` is about to start.
    fn on_connecting(&self, _addr: &str) {}

    /// A connection to `peer` is open.
    fn on_connected(&self, _peer: &str) {}

    /// The peer reset the connection during a write; the client is about to
    /// reconnect and resend once.
    fn on_connection_reset(&self, _addr: &str, _error: &MagicHomeError) {}

    /// The connection to `peer` was closed.
    fn on_disconnected(&self, _peer: &str) {}

    /// A frame was fully written to `peer`.
    fn on_frame_sent(&self, _peer: &str, _frame: &Frame) {}
}

/// Observer that emits `tracing` events.
///
/// Connect, reset and disconnect events are logged at debug level. Sent
/// frames are hex-dumped on the `wire` target when wire tracing is enabled
/// (`MAGICHOME_TRACE=1` or [`set_wire_trace`](crate::set_wire_trace)).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConnectionObserver for TracingObserver {
    fn on_connecting(&self, addr: &str) {
        tracing::debug!("Connecting to {} ..", addr);
    }

    fn on_connected(&self, peer: &str) {
        tracing::debug!("Connected to {}", peer);
    }

    fn on_connection_reset(&self, addr: &str, error: &MagicHomeError) {
        tracing::debug!("Lost connection to {} ({}), reconnecting", addr, error);
    }

    fn on_disconnected(&self, peer: &str) {
        tracing::debug!("Disconnected from {}", peer);
    }

    fn on_frame_sent(&self, peer: &str, frame: &Frame) {
        wire_trace::out_frame(peer, frame);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConnectionObserver for NoopObserver {}
