use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::ViewArgs;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image or raw container file
    pub file: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let engine = args.view.engine_for(&args.file)?;
    let (width, height) = engine.source_dimensions().expect("source just loaded");
    let geometry = engine.geometry().expect("source just loaded");
    let sampling = engine.sampling();
    let viewport = engine.viewport();
    let radius = viewport.preview_radius();

    println!("File:            {}", args.file.display());
    println!("Dimensions:      {}x{}", width, height);
    println!(
        "Viewport:        {}x{} (preview radius {})",
        viewport.width, viewport.height, radius
    );
    println!(
        "Center:          ({:.1}, {:.1})",
        geometry.center_x, geometry.center_y
    );
    println!("Zoom:            {:.4}", geometry.zoom);
    println!("Sample factor:   {}", sampling.sample_factor);
    println!("Residual scale:  {:.4}", sampling.residual_scale);
    println!(
        "Crop square:     {:.0}px per side",
        (radius * 2) as f32 / geometry.zoom
    );

    Ok(())
}
