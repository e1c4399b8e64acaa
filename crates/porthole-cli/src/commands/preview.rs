use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use image::ImageFormat;

use super::ViewArgs;

#[derive(Args)]
pub struct PreviewArgs {
    /// Input image or raw container file
    pub file: PathBuf,

    /// Output PNG file (auto-generated if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub view: ViewArgs,
}

/// Render what the interactive viewport would show, mask included.
pub fn run(args: &PreviewArgs) -> Result<()> {
    let engine = args.view.engine_for(&args.file)?;
    let frame = engine.render_preview();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| preview_output_path(&args.file));
    frame
        .save_with_format(&output, ImageFormat::Png)
        .with_context(|| format!("Failed to write preview to {}", output.display()))?;

    println!(
        "Preview {}x{} saved to {}",
        frame.width(),
        frame.height(),
        output.display()
    );
    Ok(())
}

fn preview_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = source.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_preview.png"))
}
