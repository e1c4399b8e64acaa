use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use porthole_core::source::RawImageWriter;

#[derive(Args)]
pub struct PackArgs {
    /// Input image file
    pub file: PathBuf,

    /// Output raw container file (auto-generated if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Convert an image into the raw region-decode container, so later crop
/// sessions can decode regions straight from the memory map instead of
/// re-decoding the whole image.
pub fn run(args: &PackArgs) -> Result<()> {
    let image = image::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| pack_output_path(&args.file));

    let pb = ProgressBar::new(height as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Packing [{bar:40}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut writer = RawImageWriter::create(&output, width, height)?;
    let row_bytes = width as usize * 4;
    for row in image.as_raw().chunks(row_bytes) {
        writer.write_row(row)?;
        pb.inc(1);
    }
    writer.finalize()?;
    pb.finish();

    let total_mb = (width as u64 * height as u64 * 4) as f64 / (1024.0 * 1024.0);
    println!(
        "Packed {}x{} ({:.1} MB) to {}",
        width,
        height,
        total_mb,
        output.display()
    );
    Ok(())
}

fn pack_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = source.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}.praw"))
}
