//! Error-diffusion dithering onto fixed palettes.
//!
//! ```no_run
//! use ditherio::{Ditherer, KernelKind, PaletteKind};
//!
//! let ditherer = Ditherer::new()
//!     .with_kernel(KernelKind::FloydSteinberg.kernel())
//!     .with_palette(PaletteKind::WebSafe.into());
//! ditherer.dither_file("in.png", "out.png")?;
//! # Ok::<(), ditherio::DitherioError>(())
//! ```

pub mod color;
pub mod config;
pub mod dither;
pub mod kernel;
pub mod palette;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use color::{Pixel, Rgba16Image};
pub use config::DitherConfig;
pub use dither::{dither, dither_dynamic};
pub use kernel::{Diffuse, Kernel, KernelKind, Tap};
pub use palette::{FixedPalette, Monochrome, Palette, PaletteKind, PaletteStrategy};

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DitherioError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Palette error: {0}")]
    Palette(String),
    #[error("Kernel error: {0}")]
    Kernel(String),
    #[error("Usage error: {0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, DitherioError>;

/// Dithers images with one kernel and one palette.
#[derive(Debug, Clone)]
pub struct Ditherer {
    kernel: Kernel,
    palette: Palette,
}

impl Default for Ditherer {
    fn default() -> Self {
        Self::new()
    }
}

impl Ditherer {
    /// Burkes onto black and white.
    pub fn new() -> Self {
        Self { kernel: kernel::BURKES, palette: Palette::default() }
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Override kernel and palette with whatever the config sets.
    pub fn with_config(mut self, config: &DitherConfig) -> Result<Self> {
        if let Some(kernel) = config.kernel()? {
            self.kernel = kernel;
        }
        if let Some(palette) = config.palette()? {
            self.palette = palette;
        }
        Ok(self)
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn dither(&self, image: &DynamicImage) -> Rgba16Image {
        let (width, height) = (image.width(), image.height());
        tracing::debug!(width, height, kernel = %self.kernel, palette = %self.palette, "dithering");
        dither_dynamic(image, &self.kernel, &self.palette)
    }

    /// Decode `input`, dither it and encode the result to `output`.
    ///
    /// Nothing is written unless decoding succeeded and the whole image has
    /// been dithered.
    pub fn dither_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let image = image::open(input.as_ref())?;
        let dithered = self.dither(&image);
        save(&dithered, output)
    }
}

/// Encode a dithered image, picking the bit depth from the file extension.
///
/// PNG and TIFF keep 16 bits per channel, JPEG is written as 8-bit RGB and
/// everything else as 8-bit RGBA. The image is encoded in memory first, so
/// a failed encode leaves nothing at `path`.
pub fn save(image: &Rgba16Image, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    let mut encoded = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png | ImageFormat::Tiff => image.write_to(&mut encoded, format)?,
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba16(image.clone()).to_rgb8();
            rgb.write_to(&mut encoded, format)?
        }
        _ => {
            let rgba = DynamicImage::ImageRgba16(image.clone()).to_rgba8();
            rgba.write_to(&mut encoded, format)?
        }
    }
    std::fs::write(path, encoded.into_inner())?;
    tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "saved");
    Ok(())
}
