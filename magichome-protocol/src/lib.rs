//! Wire protocol for MagicHome-style RGB(W) LED controllers.
//!
//! This crate provides the pure protocol layer used by the device client:
//! color conversion, checksum-framed command encoding, and the socket and
//! state types that carry frames to a device over TCP.
//!
//! # Modules
//!
//! - [`color`] - RGB/HSV color types and HSV to RGB conversion
//! - [`frame`] - Command frames, channel ordering and checksums
//! - [`socket`] - Socket abstraction (TCP, port 5577)
//! - [`connection`] - Two-state connection state machine
//!
//! # Examples
//!
//! ```
//! use magichome_protocol::{build_color_frame, hsv_to_rgb, ChannelOrder};
//!
//! let rgb = hsv_to_rgb(120.0, 100.0, 100.0);
//! let frame = build_color_frame(ChannelOrder::Rgb, rgb.r, rgb.g, rgb.b, 0);
//! assert!(frame.verify_checksum());
//! ```

pub mod color;
pub mod connection;
pub mod frame;
pub mod socket;

mod proptest_frames;

// Re-export commonly used types
pub use color::{hsv_to_rgb, Hsv, Rgb};
pub use connection::ConnectionState;
pub use frame::{build_color_frame, build_power_frame, checksum, ChannelOrder, Frame};
pub use socket::{DeviceSocket, TcpSocket, DEFAULT_PORT};
