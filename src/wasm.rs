//! WebAssembly bindings for ditherio

use crate::color::{narrow, widen, Rgba16Image};
use crate::dither;
use crate::kernel::{Kernel, KernelKind};
use crate::palette::{FixedPalette, Palette, PaletteKind};
use wasm_bindgen::prelude::*;

fn to_js(err: crate::DitherioError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WasmDitherer {
    kernel: Kernel,
    palette: Palette,
}

#[wasm_bindgen]
impl WasmDitherer {
    /// Create a ditherer from a kernel name ("burkes", "floyd-steinberg", ...)
    /// and a palette name ("monochrome", "web-safe", "plan9")
    #[wasm_bindgen(constructor)]
    pub fn new(kernel: &str, palette: &str) -> Result<WasmDitherer, JsValue> {
        let kernel = kernel.parse::<KernelKind>().map_err(to_js)?.kernel();
        let palette = Palette::from(palette.parse::<PaletteKind>().map_err(to_js)?);
        Ok(WasmDitherer { kernel, palette })
    }

    /// Replace the palette with hex colors like "#ff0000"
    #[wasm_bindgen]
    pub fn set_colors(&mut self, colors: Vec<String>) -> Result<(), JsValue> {
        self.palette = FixedPalette::from_hex(&colors).map_err(to_js)?.into();
        Ok(())
    }

    /// Dither RGBA8 pixel data (as found in `ImageData.data`).
    /// Returns `{ data: Uint8Array, width, height }`
    #[wasm_bindgen]
    pub fn dither_rgba(&self, image_data: &[u8], width: u32, height: u32) -> Result<js_sys::Object, JsValue> {
        let img = image::RgbaImage::from_raw(width, height, image_data.to_vec()).ok_or_else(|| {
            web_sys::console::warn_1(&"ditherio: pixel data does not match dimensions".into());
            JsValue::from_str("Invalid image dimensions")
        })?;

        let source = Rgba16Image::from_fn(width, height, |x, y| widen(*img.get_pixel(x, y)));
        let dithered = dither::dither(&source, &self.kernel, &self.palette);

        let data: Vec<u8> = dithered.pixels().flat_map(|p| narrow(*p).0).collect();

        let result = js_sys::Object::new();
        js_sys::Reflect::set(&result, &"data".into(), &js_sys::Uint8Array::from(&data[..]))?;
        js_sys::Reflect::set(&result, &"width".into(), &width.into())?;
        js_sys::Reflect::set(&result, &"height".into(), &height.into())?;
        Ok(result)
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    // WASM initialization
}
