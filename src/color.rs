//! 16-bit color arithmetic shared by palettes, kernels and the dither pass.

use crate::{DitherioError, Result};
use image::{ImageBuffer, Rgba};

/// Largest value a channel can hold.
pub const MAX_CHANNEL: i64 = 0xFFFF;

/// A single RGBA pixel at 16 bits per channel, straight alpha.
pub type Pixel = Rgba<u16>;

/// Working buffer type of the dither pass.
pub type Rgba16Image = ImageBuffer<Pixel, Vec<u16>>;

pub const BLACK: Pixel = Rgba([0, 0, 0, 0xFFFF]);
pub const WHITE: Pixel = Rgba([0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF]);

/// Quantization error of one pixel: original minus quantized, per channel.
///
/// Components are `i64` so that weighted accumulation in the kernels can
/// never overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorVec {
    pub r: i64,
    pub g: i64,
    pub b: i64,
    pub a: i64,
}

impl ErrorVec {
    /// Weighted fraction of the error: `(channel * weight) >> shift`.
    pub fn scaled(self, weight: i64, shift: u32) -> Self {
        Self {
            r: (self.r * weight) >> shift,
            g: (self.g * weight) >> shift,
            b: (self.b * weight) >> shift,
            a: (self.a * weight) >> shift,
        }
    }
}

pub fn clamp(value: i64, lo: i64, hi: i64) -> i64 {
    if value > hi {
        return hi;
    }
    if value < lo {
        return lo;
    }
    value
}

/// Build a pixel, saturating every channel into `[0, 0xFFFF]`.
pub fn make_color(r: i64, g: i64, b: i64, a: i64) -> Pixel {
    Rgba([
        clamp(r, 0, MAX_CHANNEL) as u16,
        clamp(g, 0, MAX_CHANNEL) as u16,
        clamp(b, 0, MAX_CHANNEL) as u16,
        clamp(a, 0, MAX_CHANNEL) as u16,
    ])
}

pub fn color_diff(original: Pixel, quantized: Pixel) -> ErrorVec {
    let [or, og, ob, oa] = original.0.map(i64::from);
    let [qr, qg, qb, qa] = quantized.0.map(i64::from);
    ErrorVec {
        r: or - qr,
        g: og - qg,
        b: ob - qb,
        a: oa - qa,
    }
}

/// Pixel plus error, clamped.
pub fn offset(pixel: Pixel, error: ErrorVec) -> Pixel {
    let [r, g, b, a] = pixel.0.map(i64::from);
    make_color(r + error.r, g + error.g, b + error.b, a + error.a)
}

pub fn widen(pixel: Rgba<u8>) -> Pixel {
    Rgba(pixel.0.map(|v| u16::from(v) * 257))
}

pub fn narrow(pixel: Pixel) -> Rgba<u8> {
    Rgba(pixel.0.map(|v| ((u32::from(v) + 128) / 257) as u8))
}

/// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
pub fn parse_hex(s: &str) -> Result<Pixel> {
    let hex = s.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(DitherioError::Palette(format!("invalid hex color '{}'", s)));
    }

    let mut channels = [0xFFu8; 4];
    for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| DitherioError::Palette(format!("invalid hex color '{}'", s)))?;
    }
    Ok(widen(Rgba(channels)))
}
