//! JSON configuration for custom palettes and kernels.
//!
//! ```json
//! {
//!   "palette": ["#000000", "#ffffff", "#ff0000"],
//!   "kernel": { "shift": 4, "taps": [{"dx": 1, "dy": 0, "weight": 8}, {"dx": 0, "dy": 1, "weight": 8}] }
//! }
//! ```
//!
//! Both fields are optional and either may name a built-in instead
//! (`"palette": "web-safe"`, `"kernel": "atkinson"`).

use std::path::Path;

use serde::Deserialize;

use crate::kernel::{Kernel, KernelKind, Tap};
use crate::palette::{FixedPalette, Palette, PaletteKind};
use crate::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DitherConfig {
    #[serde(default)]
    pub palette: Option<PaletteConfig>,
    #[serde(default)]
    pub kernel: Option<KernelConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PaletteConfig {
    Named(PaletteKind),
    Colors(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KernelConfig {
    Named(KernelKind),
    Custom(CustomKernel),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomKernel {
    #[serde(default = "default_kernel_name")]
    pub name: String,
    pub shift: u32,
    pub taps: Vec<Tap>,
}

fn default_kernel_name() -> String {
    "custom".to_string()
}

impl DitherConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The configured palette, validated.
    pub fn palette(&self) -> Result<Option<Palette>> {
        match &self.palette {
            None => Ok(None),
            Some(PaletteConfig::Named(kind)) => Ok(Some(Palette::from(*kind))),
            Some(PaletteConfig::Colors(colors)) => Ok(Some(FixedPalette::from_hex(colors)?.into())),
        }
    }

    /// The configured kernel, validated.
    pub fn kernel(&self) -> Result<Option<Kernel>> {
        match &self.kernel {
            None => Ok(None),
            Some(KernelConfig::Named(kind)) => Ok(Some(kind.kernel())),
            Some(KernelConfig::Custom(custom)) => Ok(Some(Kernel::new(
                custom.name.clone(),
                custom.taps.clone(),
                custom.shift,
            )?)),
        }
    }
}
