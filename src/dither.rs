//! The error diffusion pass.

use image::DynamicImage;

use crate::color::{self, Rgba16Image};
use crate::kernel::Diffuse;
use crate::palette::PaletteStrategy;

/// Dither `source` onto `palette`, spreading quantization error with `kernel`.
///
/// Pixels are visited row by row, left to right. Each one is quantized in
/// place and its error handed to the kernel, which only ever touches pixels
/// later in that order. The source is left untouched; the result has the
/// same dimensions.
pub fn dither<K, P>(source: &Rgba16Image, kernel: &K, palette: &P) -> Rgba16Image
where
    K: Diffuse + ?Sized,
    P: PaletteStrategy + ?Sized,
{
    let (width, height) = source.dimensions();
    let mut dithered = source.clone();

    for y in 0..height {
        for x in 0..width {
            let old = *dithered.get_pixel(x, y);
            let new = palette.quantize(old);
            dithered.put_pixel(x, y, new);
            kernel.diffuse(&mut dithered, x, y, color::color_diff(old, new));
        }
    }

    dithered
}

/// Same as [`dither`], for any decoded image.
pub fn dither_dynamic<K, P>(source: &DynamicImage, kernel: &K, palette: &P) -> Rgba16Image
where
    K: Diffuse + ?Sized,
    P: PaletteStrategy + ?Sized,
{
    dither(&source.to_rgba16(), kernel, palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Pixel, BLACK, WHITE};
    use crate::kernel::{BURKES, FLOYD_STEINBERG, SIERRA};
    use crate::palette::{FixedPalette, Monochrome};
    use image::Rgba;

    fn gray(v: u16) -> Pixel {
        Rgba([v, v, v, 0xFFFF])
    }

    fn gradient(width: u32, height: u32) -> Rgba16Image {
        Rgba16Image::from_fn(width, height, |x, y| {
            let v = ((x + y) * 0xFFFF / (width + height).max(1)) as u16;
            Rgba([v, 0xFFFF - v, v / 2, 0xFFFF])
        })
    }

    #[test]
    fn test_checkerboard_is_fixed_point() {
        let source = Rgba16Image::from_fn(2, 2, |x, y| if (x + y) % 2 == 0 { WHITE } else { BLACK });
        let result = dither(&source, &FLOYD_STEINBERG, &Monochrome);
        assert_eq!(result, source);
    }

    #[test]
    fn test_mid_gray_produces_a_pattern() {
        let source = Rgba16Image::from_pixel(8, 8, gray(0x7FFF));
        let result = dither(&source, &FLOYD_STEINBERG, &Monochrome);

        let white = result.pixels().filter(|p| **p == WHITE).count();
        let black = result.pixels().filter(|p| **p == BLACK).count();
        assert_eq!(white + black, 64);
        assert!(white > 0 && black > 0, "white {} black {}", white, black);

        // The first pixel sits on the threshold and goes white; its error
        // pushes the next one below.
        assert_eq!(*result.get_pixel(0, 0), WHITE);
        assert_eq!(*result.get_pixel(1, 0), BLACK);
    }

    #[test]
    fn test_mid_gray_roughly_half_white() {
        let source = Rgba16Image::from_pixel(16, 16, gray(0x7FFF));
        for kernel in [FLOYD_STEINBERG, BURKES, SIERRA] {
            let result = dither(&source, &kernel, &Monochrome);
            let white = result.pixels().filter(|p| **p == WHITE).count();
            assert!((80..=176).contains(&white), "{}: {} white", kernel, white);
        }
    }

    #[test]
    fn test_solid_extremes_stay_solid() {
        for (value, expected) in [(0, BLACK), (0xFFFF, WHITE)] {
            let source = Rgba16Image::from_pixel(5, 3, gray(value));
            let result = dither(&source, &BURKES, &Monochrome);
            assert!(result.pixels().all(|p| *p == expected));
        }
    }

    #[test]
    fn test_monochrome_output_is_binary() {
        let source = gradient(23, 17);
        let result = dither(&source, &BURKES, &Monochrome);
        assert_eq!(result.dimensions(), (23, 17));
        for p in result.pixels() {
            assert!(p.0[..3].iter().all(|&c| c == 0 || c == 0xFFFF), "{:?}", p);
            assert!(p.0[0] == p.0[1] && p.0[1] == p.0[2]);
        }
    }

    #[test]
    fn test_output_drawn_from_fixed_palette() {
        let palette = FixedPalette::web_safe();
        let result = dither(&gradient(12, 9), &FLOYD_STEINBERG, &palette);
        assert!(result.pixels().all(|p| palette.colors().contains(p)));
    }

    #[test]
    fn test_source_is_not_modified() {
        let source = gradient(6, 6);
        let copy = source.clone();
        let _ = dither(&source, &BURKES, &Monochrome);
        assert_eq!(source, copy);
    }

    #[test]
    fn test_zero_area() {
        for (w, h) in [(0, 0), (0, 5), (5, 0)] {
            let source = Rgba16Image::new(w, h);
            let result = dither(&source, &BURKES, &Monochrome);
            assert_eq!(result.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_single_pixel() {
        let source = Rgba16Image::from_pixel(1, 1, gray(0x9000));
        let result = dither(&source, &SIERRA, &Monochrome);
        assert_eq!(*result.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_single_row_and_column() {
        let row = Rgba16Image::from_pixel(9, 1, gray(0x4000));
        let col = Rgba16Image::from_pixel(1, 9, gray(0x4000));
        assert_eq!(dither(&row, &BURKES, &Monochrome).dimensions(), (9, 1));
        assert_eq!(dither(&col, &BURKES, &Monochrome).dimensions(), (1, 9));
    }

    #[test]
    fn test_deterministic() {
        let source = gradient(31, 13);
        let a = dither(&source, &FLOYD_STEINBERG, &Monochrome);
        let b = dither(&source, &FLOYD_STEINBERG, &Monochrome);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_dither_dynamic_converts_8_bit_input() {
        let white = image::RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]));
        let source = DynamicImage::ImageRgb8(white);
        let result = dither_dynamic(&source, &BURKES, &Monochrome);
        assert!(result.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_trait_objects() {
        let kernel: &dyn Diffuse = &BURKES;
        let palette: &dyn PaletteStrategy = &Monochrome;
        let result = dither(&gradient(4, 4), kernel, palette);
        assert_eq!(result.dimensions(), (4, 4));
    }
}
