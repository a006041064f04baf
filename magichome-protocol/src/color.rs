//! Color types and HSV to RGB conversion.
//!
//! The device only understands raw 8-bit channel values, so every color a
//! caller expresses in HSV is converted here before it reaches the frame
//! encoder.
//!
//! # Examples
//!
//! ```
//! use magichome_protocol::color::{hsv_to_rgb, Rgb};
//!
//! assert_eq!(hsv_to_rgb(0.0, 100.0, 100.0), Rgb::new(255, 0, 0));
//! assert_eq!(hsv_to_rgb(200.0, 0.0, 100.0), Rgb::new(255, 255, 255));
//! ```

use std::fmt;

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray with the same value on every channel.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color in hue/saturation/value space.
///
/// `h` is in degrees `[0, 360)`, `s` and `v` are percentages `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    /// Create a new HSV color.
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    /// Returns true if every component is finite and inside its documented range.
    pub fn in_range(&self) -> bool {
        self.h.is_finite()
            && self.s.is_finite()
            && self.v.is_finite()
            && (0.0..360.0).contains(&self.h)
            && (0.0..=100.0).contains(&self.s)
            && (0.0..=100.0).contains(&self.v)
    }

    /// Convert to RGB. See [`hsv_to_rgb`].
    pub fn to_rgb(&self) -> Rgb {
        hsv_to_rgb(self.h, self.s, self.v)
    }
}

impl From<Hsv> for Rgb {
    fn from(hsv: Hsv) -> Self {
        hsv.to_rgb()
    }
}

/// Convert an HSV color to RGB.
///
/// Achromatic input (`s == 0`) yields a gray whose level is `v * 255`
/// rounded. Chromatic input selects one of six hue sectors and truncates the
/// channel values toward zero.
///
/// No clamping is done. Components outside their documented range produce
/// whatever the formula yields, saturated into `0..=255` by the float to
/// byte conversion.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let s = s / 100.0;
    let v = v / 100.0;

    if s == 0.0 {
        return Rgb::gray(to_channel((v * 255.0).round()));
    }

    // h / 360 * 6, computed as h / 60 so sector boundaries land exactly.
    let position = h / 60.0;
    let whole = position.floor();
    let d = position - whole;

    let o = 255.0 * v * (1.0 - s);
    let p = 255.0 * v * (1.0 - s * d);
    let q = 255.0 * v * (1.0 - s * (1.0 - d));
    let v = 255.0 * v;

    let (r, g, b) = match (whole as i64).rem_euclid(6) {
        0 => (v, q, o),
        1 => (p, v, o),
        2 => (o, v, q),
        3 => (o, p, v),
        4 => (q, o, v),
        _ => (v, o, p),
    };

    Rgb::new(to_channel(r), to_channel(g), to_channel(b))
}

/// Float to byte conversion truncates toward zero and saturates at the
/// bounds (NaN maps to 0).
fn to_channel(value: f64) -> u8 {
    value as u8
}
