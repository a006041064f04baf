//! Application-facing command values.

use crate::errors::MagicHomeError;
use magichome_protocol::{build_color_frame, build_power_frame, ChannelOrder, Frame, Hsv};

/// A command that can be sent to a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceCommand {
    /// Switch the device on or off.
    Power {
        /// True to switch on.
        on: bool,
    },

    /// Set raw red, green, blue and white channel levels.
    Rgbw {
        /// Red level.
        r: u8,
        /// Green level.
        g: u8,
        /// Blue level.
        b: u8,
        /// White level.
        w: u8,
    },

    /// Set a color in HSV space. The white channel is switched off.
    Hsv {
        /// Hue in degrees, `[0, 360)`.
        h: f64,
        /// Saturation in percent, `[0, 100]`.
        s: f64,
        /// Value in percent, `[0, 100]`.
        v: f64,
    },
}

impl DeviceCommand {
    /// Encode the command as a wire frame for a device with the given
    /// channel order.
    ///
    /// # Errors
    ///
    /// Returns [`MagicHomeError::InvalidInput`] for HSV components that are
    /// not finite or lie outside their documented range.
    pub fn to_frame(&self, order: ChannelOrder) -> Result<Frame, MagicHomeError> {
        match *self {
            DeviceCommand::Power { on } => Ok(build_power_frame(on)),
            DeviceCommand::Rgbw { r, g, b, w } => Ok(build_color_frame(order, r, g, b, w)),
            DeviceCommand::Hsv { h, s, v } => {
                let hsv = Hsv::new(h, s, v);
                if !hsv.in_range() {
                    return Err(MagicHomeError::InvalidInput(format!(
                        "HSV ({}, {}, {}) out of range: h must be in [0, 360), s and v in [0, 100]",
                        h, s, v
                    )));
                }
                let rgb = hsv.to_rgb();
                Ok(build_color_frame(order, rgb.r, rgb.g, rgb.b, 0))
            }
        }
    }
}
