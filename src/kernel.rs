//! Error diffusion kernels.
//!
//! A kernel is a table of taps, each naming a neighbor relative to the pixel
//! just quantized and the share of its error that neighbor receives. All
//! divisors are powers of two, so a share is `(error * weight) >> shift`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::color::{self, ErrorVec, Rgba16Image};
use crate::{DitherioError, Result};

/// Spreads one pixel's quantization error over its unvisited neighbors.
pub trait Diffuse {
    fn diffuse(&self, image: &mut Rgba16Image, x: u32, y: u32, error: ErrorVec);
}

/// One kernel entry: offset from the current pixel and weight numerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tap {
    pub dx: i32,
    pub dy: i32,
    pub weight: i64,
}

impl Tap {
    pub const fn new(dx: i32, dy: i32, weight: i64) -> Self {
        Self { dx, dy, weight }
    }

    /// Whether the tap points at a pixel not yet visited in raster order.
    pub fn is_forward(&self) -> bool {
        self.dy > 0 || (self.dy == 0 && self.dx > 0)
    }
}

/// An error diffusion kernel.
///
/// Neighbors outside the image are skipped and their share of the error is
/// dropped, so edge pixels propagate less than the full error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    name: Cow<'static, str>,
    taps: Cow<'static, [Tap]>,
    shift: u32,
}

impl Kernel {
    const MAX_SHIFT: u32 = 16;

    const fn builtin(name: &'static str, taps: &'static [Tap], shift: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            taps: Cow::Borrowed(taps),
            shift,
        }
    }

    /// Build a custom kernel.
    ///
    /// Every tap must point forward in raster order (below the current row,
    /// or to the right on it); anything else would write into pixels that
    /// are already final. Weights must lie in `0..=divisor`, which keeps
    /// `error * weight` well inside `i64`.
    pub fn new(name: impl Into<String>, taps: Vec<Tap>, shift: u32) -> Result<Self> {
        let name = name.into();
        if shift > Self::MAX_SHIFT {
            return Err(DitherioError::Kernel(format!(
                "{}: shift {} out of range (max {})",
                name,
                shift,
                Self::MAX_SHIFT
            )));
        }
        let divisor = 1i64 << shift;
        if let Some(tap) = taps.iter().find(|t| !(0..=divisor).contains(&t.weight)) {
            return Err(DitherioError::Kernel(format!(
                "{}: weight {} outside 0..={}",
                name, tap.weight, divisor
            )));
        }
        if let Some(tap) = taps.iter().find(|t| !t.is_forward()) {
            return Err(DitherioError::Kernel(format!(
                "{}: tap ({}, {}) points at an already processed pixel",
                name, tap.dx, tap.dy
            )));
        }
        Ok(Self {
            name: Cow::Owned(name),
            taps: Cow::Owned(taps),
            shift,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn divisor(&self) -> i64 {
        1 << self.shift
    }

    pub fn weight_sum(&self) -> i64 {
        self.taps.iter().map(|t| t.weight).sum()
    }
}

impl Diffuse for Kernel {
    fn diffuse(&self, image: &mut Rgba16Image, x: u32, y: u32, error: ErrorVec) {
        let (width, height) = (i64::from(image.width()), i64::from(image.height()));
        for tap in self.taps.iter() {
            let nx = i64::from(x) + i64::from(tap.dx);
            let ny = i64::from(y) + i64::from(tap.dy);
            if nx < 0 || ny < 0 || nx >= width || ny >= height {
                continue;
            }
            let pixel = image.get_pixel_mut(nx as u32, ny as u32);
            *pixel = color::offset(*pixel, error.scaled(tap.weight, self.shift));
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Floyd-Steinberg.
///
/// ```text
///        X   7
///    3   5   1
/// ```
/// (1/16)
pub const FLOYD_STEINBERG: Kernel = Kernel::builtin("floyd-steinberg", FLOYD_STEINBERG_TAPS, 4);
const FLOYD_STEINBERG_TAPS: &[Tap] = &[
    Tap::new(1, 0, 7),
    Tap::new(-1, 1, 3),
    Tap::new(0, 1, 5),
    Tap::new(1, 1, 1),
];

/// Burkes.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
/// ```
/// (1/32)
pub const BURKES: Kernel = Kernel::builtin("burkes", BURKES_TAPS, 5);
const BURKES_TAPS: &[Tap] = &[
    Tap::new(1, 0, 8),
    Tap::new(2, 0, 4),
    Tap::new(-2, 1, 2),
    Tap::new(-1, 1, 4),
    Tap::new(0, 1, 8),
    Tap::new(1, 1, 4),
    Tap::new(2, 1, 2),
];

/// Atkinson. Only 6/8 of the error is propagated.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
/// (1/8)
pub const ATKINSON: Kernel = Kernel::builtin("atkinson", ATKINSON_TAPS, 3);
const ATKINSON_TAPS: &[Tap] = &[
    Tap::new(1, 0, 1),
    Tap::new(2, 0, 1),
    Tap::new(-1, 1, 1),
    Tap::new(0, 1, 1),
    Tap::new(1, 1, 1),
    Tap::new(0, 2, 1),
];

/// Sierra (three rows).
///
/// ```text
///            X   5   3
///    2   4   5   4   2
///        2   3   2
/// ```
/// (1/32)
pub const SIERRA: Kernel = Kernel::builtin("sierra", SIERRA_TAPS, 5);
const SIERRA_TAPS: &[Tap] = &[
    Tap::new(1, 0, 5),
    Tap::new(2, 0, 3),
    Tap::new(-2, 1, 2),
    Tap::new(-1, 1, 4),
    Tap::new(0, 1, 5),
    Tap::new(1, 1, 4),
    Tap::new(2, 1, 2),
    Tap::new(-1, 2, 2),
    Tap::new(0, 2, 3),
    Tap::new(1, 2, 2),
];

/// Two-row Sierra.
///
/// ```text
///            X   4   3
///    1   2   3   2   1
/// ```
/// (1/16)
pub const SIERRA_TWO_ROW: Kernel = Kernel::builtin("sierra-two-row", SIERRA_TWO_ROW_TAPS, 4);
const SIERRA_TWO_ROW_TAPS: &[Tap] = &[
    Tap::new(1, 0, 4),
    Tap::new(2, 0, 3),
    Tap::new(-2, 1, 1),
    Tap::new(-1, 1, 2),
    Tap::new(0, 1, 3),
    Tap::new(1, 1, 2),
    Tap::new(2, 1, 1),
];

/// Sierra Lite.
///
/// ```text
///    X   2
///    1   1
/// ```
/// (1/4)
pub const SIERRA_LITE: Kernel = Kernel::builtin("sierra-lite", SIERRA_LITE_TAPS, 2);
const SIERRA_LITE_TAPS: &[Tap] = &[Tap::new(1, 0, 2), Tap::new(-1, 1, 1), Tap::new(0, 1, 1)];

/// Built-in kernels selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum KernelKind {
    FloydSteinberg,
    #[default]
    Burkes,
    Atkinson,
    Sierra,
    SierraTwoRow,
    SierraLite,
}

impl KernelKind {
    pub fn kernel(self) -> Kernel {
        match self {
            KernelKind::FloydSteinberg => FLOYD_STEINBERG,
            KernelKind::Burkes => BURKES,
            KernelKind::Atkinson => ATKINSON,
            KernelKind::Sierra => SIERRA,
            KernelKind::SierraTwoRow => SIERRA_TWO_ROW,
            KernelKind::SierraLite => SIERRA_LITE,
        }
    }
}

impl FromStr for KernelKind {
    type Err = DitherioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "floyd-steinberg" => Ok(KernelKind::FloydSteinberg),
            "burkes" => Ok(KernelKind::Burkes),
            "atkinson" => Ok(KernelKind::Atkinson),
            "sierra" => Ok(KernelKind::Sierra),
            "sierra-two-row" => Ok(KernelKind::SierraTwoRow),
            "sierra-lite" => Ok(KernelKind::SierraLite),
            other => Err(DitherioError::Kernel(format!("unknown kernel '{}'", other))),
        }
    }
}
