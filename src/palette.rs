//! Palette strategies: mapping an arbitrary color onto a fixed set.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::Deserialize;

use crate::color::{self, Pixel, BLACK, WHITE};
use crate::{DitherioError, Result};

/// Maps a color to the closest color it is able to represent.
///
/// Implementations must be pure and idempotent on their own outputs:
/// `quantize(quantize(c)) == quantize(c)`.
pub trait PaletteStrategy {
    fn quantize(&self, color: Pixel) -> Pixel;
}

impl<F> PaletteStrategy for F
where
    F: Fn(Pixel) -> Pixel,
{
    fn quantize(&self, color: Pixel) -> Pixel {
        self(color)
    }
}

/// Black or white, split at half intensity of the unweighted RGB mean.
///
/// The output is always opaque; the source alpha is not carried over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Monochrome;

impl Monochrome {
    const THRESHOLD: u64 = 0xFFFF >> 1;
}

impl PaletteStrategy for Monochrome {
    fn quantize(&self, color: Pixel) -> Pixel {
        let [r, g, b, _] = color.0.map(u64::from);
        let gray = (r + g + b) / 3;
        if gray < Self::THRESHOLD {
            BLACK
        } else {
            WHITE
        }
    }
}

/// A fixed table of colors, matched by squared RGBA distance.
/// Ties go to the entry listed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPalette {
    colors: Vec<Pixel>,
}

impl FixedPalette {
    pub fn new(colors: Vec<Pixel>) -> Result<Self> {
        if colors.is_empty() {
            return Err(DitherioError::Palette("palette has no colors".into()));
        }
        Ok(Self { colors })
    }

    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let colors = colors
            .iter()
            .map(|s| color::parse_hex(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(colors)
    }

    /// The 216-color web-safe palette: every combination of
    /// 0x00, 0x33, .., 0xFF per channel, red varying slowest.
    pub fn web_safe() -> Self {
        let mut colors = Vec::with_capacity(216);
        for r in 0..6u8 {
            for g in 0..6u8 {
                for b in 0..6u8 {
                    colors.push(color::widen(Rgba([r * 0x33, g * 0x33, b * 0x33, 0xFF])));
                }
            }
        }
        Self { colors }
    }

    /// The 256-color Plan 9 palette.
    ///
    /// Sixteen blocks of sixteen: each block pairs a red level `r` with a
    /// brightness step `v`, and entries are rotated within the block so
    /// that grays land on the diagonal.
    pub fn plan9() -> Self {
        let mut colors = vec![BLACK; 256];
        let mut block = 0usize;
        for r in 0..4i32 {
            for v in 0..4i32 {
                let mut j = v - r;
                for g in 0..4i32 {
                    for b in 0..4i32 {
                        let den = r.max(g).max(b);
                        let [cr, cg, cb] = if den == 0 {
                            [17 * v; 3]
                        } else {
                            let num = 17 * (4 * den + v);
                            [r * num / den, g * num / den, b * num / den]
                        };
                        colors[block + (j & 15) as usize] =
                            color::widen(Rgba([cr as u8, cg as u8, cb as u8, 0xFF]));
                        j += 1;
                    }
                }
                block += 16;
            }
        }
        Self { colors }
    }

    pub fn colors(&self) -> &[Pixel] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the nearest entry.
    pub fn nearest(&self, color: Pixel) -> usize {
        let mut best = 0;
        let mut best_dist = u64::MAX;
        for (i, candidate) in self.colors.iter().enumerate() {
            let dist = sq_distance(color, *candidate);
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best
    }
}

impl PaletteStrategy for FixedPalette {
    fn quantize(&self, color: Pixel) -> Pixel {
        self.colors[self.nearest(color)]
    }
}

fn sq_distance(a: Pixel, b: Pixel) -> u64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = u64::from(x.abs_diff(y));
            d * d
        })
        .sum()
}

/// Built-in palettes selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum PaletteKind {
    #[default]
    Monochrome,
    WebSafe,
    Plan9,
}

impl FromStr for PaletteKind {
    type Err = DitherioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "monochrome" | "bw" => Ok(PaletteKind::Monochrome),
            "web-safe" | "websafe" => Ok(PaletteKind::WebSafe),
            "plan9" => Ok(PaletteKind::Plan9),
            other => Err(DitherioError::Palette(format!("unknown palette '{}'", other))),
        }
    }
}

/// Any of the palette strategies, chosen at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Palette {
    Monochrome(Monochrome),
    Fixed(FixedPalette),
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Monochrome(Monochrome)
    }
}

impl From<PaletteKind> for Palette {
    fn from(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Monochrome => Palette::Monochrome(Monochrome),
            PaletteKind::WebSafe => Palette::Fixed(FixedPalette::web_safe()),
            PaletteKind::Plan9 => Palette::Fixed(FixedPalette::plan9()),
        }
    }
}

impl From<FixedPalette> for Palette {
    fn from(palette: FixedPalette) -> Self {
        Palette::Fixed(palette)
    }
}

impl PaletteStrategy for Palette {
    fn quantize(&self, color: Pixel) -> Pixel {
        match self {
            Palette::Monochrome(p) => p.quantize(color),
            Palette::Fixed(p) => p.quantize(color),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::Monochrome(_) => f.write_str("monochrome"),
            Palette::Fixed(p) => write!(f, "{} colors", p.len()),
        }
    }
}
