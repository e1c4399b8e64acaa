use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use porthole_core::engine::CropResolution;

use super::ViewArgs;
use crate::summary::print_crop_summary;

#[derive(Args)]
pub struct CropArgs {
    /// Input image or raw container file
    pub file: PathBuf,

    /// Output PNG file (auto-generated if not provided; with multiple
    /// resolutions the edge length is always appended)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output edge length in pixels; zero or negative means native.
    /// Repeat for multiple outputs
    #[arg(short, long = "resolution", default_value = "0")]
    pub resolutions: Vec<i32>,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run(args: &CropArgs) -> Result<()> {
    let mut engine = args.view.engine_for(&args.file)?;
    let geometry = engine.geometry().expect("source just loaded");
    let (width, height) = engine.source_dimensions().expect("source just loaded");

    print_crop_summary(&args.file, width, height, &geometry, engine.viewport());

    let pb = ProgressBar::new(args.resolutions.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Cropping [{bar:40}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut outputs = Vec::new();
    for &raw in &args.resolutions {
        let resolution = CropResolution::from_raw(raw);
        let path = output_path(&args.file, args.output.as_deref(), raw, args.resolutions.len());
        engine.crop_to_path(&path, resolution)?;
        outputs.push(path);
        pb.inc(1);
    }
    pb.finish();

    for path in &outputs {
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn output_path(source: &Path, output: Option<&Path>, resolution: i32, count: usize) -> PathBuf {
    let suffix = if resolution <= 0 {
        "native".to_string()
    } else {
        resolution.to_string()
    };
    match output {
        Some(path) if count == 1 => path.to_path_buf(),
        Some(path) => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("crop");
            let parent = path.parent().unwrap_or(Path::new("."));
            parent.join(format!("{stem}_{suffix}.png"))
        }
        None => {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            let parent = source.parent().unwrap_or(Path::new("."));
            parent.join(format!("{stem}_crop_{suffix}.png"))
        }
    }
}
