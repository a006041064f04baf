//! Checksum-terminated command frames.
//!
//! Every frame sent to a device has the shape
//! `[opcode][payload...][checksum]`, where the checksum is the sum of all
//! preceding bytes modulo 256. The protocol is write-only: the device never
//! answers with a frame the client has to parse.
//!
//! # Wire Format
//!
//! | Opcode | Meaning   | Payload                                        |
//! |--------|-----------|------------------------------------------------|
//! | `0x31` | Set color | 3 ordered color bytes, white, `0x00`, `0x0F`   |
//! | `0x71` | Set power | `0x23` (on) or `0x24` (off), `0x0F`            |
//!
//! # Examples
//!
//! ```
//! use magichome_protocol::frame::{build_color_frame, build_power_frame, ChannelOrder};
//!
//! let frame = build_power_frame(true);
//! assert_eq!(frame.as_bytes(), &[0x71, 0x23, 0x0F, 0xA3]);
//!
//! let frame = build_color_frame(ChannelOrder::Grb, 255, 0, 0, 0);
//! assert_eq!(&frame.as_bytes()[1..4], &[0, 255, 0]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Set color opcode.
pub const OPCODE_SET_COLOR: u8 = 0x31;
/// Set power opcode.
pub const OPCODE_SET_POWER: u8 = 0x71;

/// Power state byte: on.
pub const POWER_ON: u8 = 0x23;
/// Power state byte: off.
pub const POWER_OFF: u8 = 0x24;

/// Trailing flag byte carried by every command before the checksum.
pub const FLAG_TERMINATOR: u8 = 0x0F;

/// Length of a set color frame, checksum included.
pub const COLOR_FRAME_LEN: usize = 8;
/// Length of a set power frame, checksum included.
pub const POWER_FRAME_LEN: usize = 4;

/// Position of red, green and blue within a color frame.
///
/// Strips are wired with different channel orders. The order is chosen once
/// per device and never changes for that device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Green, red, blue.
    Grb,
    /// Blue, red, green.
    Brg,
}

impl ChannelOrder {
    /// Arrange the three color channels in wire order.
    pub const fn arrange(self, r: u8, g: u8, b: u8) -> [u8; 3] {
        match self {
            Self::Rgb => [r, g, b],
            Self::Grb => [g, r, b],
            Self::Brg => [b, r, g],
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb => write!(f, "rgb"),
            Self::Grb => write!(f, "grb"),
            Self::Brg => write!(f, "brg"),
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "grb" => Ok(Self::Grb),
            "brg" => Ok(Self::Brg),
            other => anyhow::bail!("unknown channel order: {} (expected rgb, grb or brg)", other),
        }
    }
}

/// Sum of all bytes modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// A complete frame: opcode, payload and trailing checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Build a frame from opcode and payload, appending the checksum.
    pub fn from_payload(opcode: u8, payload: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(payload.len() + 2);
        buf.put_u8(opcode);
        buf.put_slice(payload);
        let sum = checksum(&buf);
        buf.put_u8(sum);
        Self {
            bytes: buf.freeze(),
        }
    }

    /// Wrap bytes that already carry a checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is shorter than opcode plus checksum
    /// or the trailing byte does not match the checksum of the rest.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> anyhow::Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < 2 {
            anyhow::bail!("frame too short: {} bytes", bytes.len());
        }
        let frame = Self { bytes };
        if !frame.verify_checksum() {
            anyhow::bail!(
                "checksum mismatch: expected {:#04x}, got {:#04x}",
                checksum(frame.body()),
                frame.checksum()
            );
        }
        Ok(frame)
    }

    /// The opcode (first byte).
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Bytes between opcode and checksum.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..self.bytes.len() - 1]
    }

    /// The trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Returns true if the trailing byte matches the sum of all others.
    pub fn verify_checksum(&self) -> bool {
        checksum(self.body()) == self.checksum()
    }

    /// Raw frame bytes, checksum included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Frames always carry at least an opcode and a checksum.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the frame, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    fn body(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Build a set color frame.
///
/// Layout: `0x31`, the three color bytes in `order`, `w`, `0x00`, `0x0F`,
/// checksum.
pub fn build_color_frame(order: ChannelOrder, r: u8, g: u8, b: u8, w: u8) -> Frame {
    let [c0, c1, c2] = order.arrange(r, g, b);
    Frame::from_payload(OPCODE_SET_COLOR, &[c0, c1, c2, w, 0x00, FLAG_TERMINATOR])
}

/// Build a set power frame.
///
/// Layout: `0x71`, `0x23` (on) or `0x24` (off), `0x0F`, checksum.
pub fn build_power_frame(on: bool) -> Frame {
    let state = if on { POWER_ON } else { POWER_OFF };
    Frame::from_payload(OPCODE_SET_POWER, &[state, FLAG_TERMINATOR])
}
