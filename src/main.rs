//! ditherio CLI - Dither images onto a fixed palette

use clap::Parser;
use ditherio::{DitherConfig, Ditherer, DitherioError, FixedPalette, KernelKind, PaletteKind};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ditherio", about = "Dither images onto a fixed palette")]
struct Args {
    /// Input image files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output file (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Directory for outputs (default: next to each input)
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Error diffusion kernel
    #[arg(short, long, value_enum, default_value_t = KernelKind::Burkes)]
    kernel: KernelKind,
    /// Built-in palette
    #[arg(short, long, value_enum, default_value_t = PaletteKind::Monochrome)]
    palette: PaletteKind,
    /// Custom palette as comma-separated hex RGB (e.g. "#000000,#FFFFFF,#FF0000")
    #[arg(long, value_delimiter = ',')]
    colors: Option<Vec<String>>,
    /// JSON config with a custom palette and/or kernel
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), DitherioError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ditherio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let args = Args::parse();

    if args.output.is_some() && args.inputs.len() > 1 {
        return Err(DitherioError::Usage(
            "--output can only be used with a single input".into(),
        ));
    }

    let mut ditherer = Ditherer::new()
        .with_kernel(args.kernel.kernel())
        .with_palette(args.palette.into());

    if let Some(colors) = &args.colors {
        ditherer = ditherer.with_palette(FixedPalette::from_hex(colors)?.into());
    }

    if let Some(path) = &args.config {
        ditherer = ditherer.with_config(&DitherConfig::from_file(path)?)?;
    }

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)?;
    }

    // One image per worker; each image is still a single sequential pass.
    let results: Vec<(&PathBuf, Result<(), DitherioError>)> = args
        .inputs
        .par_iter()
        .map(|input| {
            let output = match &args.output {
                Some(output) => output.clone(),
                None => output_path(input, args.out_dir.as_deref()),
            };
            (input, ditherer.dither_file(input, &output))
        })
        .collect();

    let mut first_error = None;
    for (input, result) in results {
        if let Err(e) = result {
            tracing::error!(input = %input.display(), %e, "failed");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// `<stem>_dithered.png`, next to the input or inside `out_dir`.
fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = format!("{}_dithered.png", stem);
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_input() {
        assert_eq!(
            output_path(Path::new("assets/shiba.jpg"), None),
            PathBuf::from("assets/shiba_dithered.png")
        );
    }

    #[test]
    fn test_output_path_in_out_dir() {
        assert_eq!(
            output_path(Path::new("assets/shiba.png"), Some(Path::new("out"))),
            PathBuf::from("out/shiba_dithered.png")
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "ditherio",
            "a.png",
            "b.png",
            "-k",
            "floyd-steinberg",
            "-p",
            "web-safe",
            "--colors",
            "#000000,#ffffff",
        ])
        .unwrap();
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.kernel, KernelKind::FloydSteinberg);
        assert_eq!(args.palette, PaletteKind::WebSafe);
        assert_eq!(args.colors.unwrap(), ["#000000", "#ffffff"]);
    }

    #[test]
    fn test_args_require_input() {
        assert!(Args::try_parse_from(["ditherio"]).is_err());
    }
}
