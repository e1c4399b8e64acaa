pub mod config;
pub mod crop;
pub mod info;
pub mod pack;
pub mod preview;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use porthole_core::config::EngineConfig;
use porthole_core::engine::CropEngine;
use porthole_core::source::{SourceImage, RAW_MAGIC};

/// View parameters shared by the crop and preview commands.
#[derive(Args)]
pub struct ViewArgs {
    /// Viewport width in display pixels
    #[arg(long, default_value = "300")]
    pub width: u32,

    /// Viewport height in display pixels
    #[arg(long, default_value = "300")]
    pub height: u32,

    /// Preview quality in [0.0, 1.0]
    #[arg(long, default_value = "0.444")]
    pub quality: f32,

    /// Mask overlay color as ARGB hex
    #[arg(long, default_value = "90000000", value_parser = parse_argb)]
    pub mask: u32,

    /// Zoom override applied on top of the fitted view
    #[arg(long)]
    pub zoom: Option<f32>,

    /// View center x override, in source pixels
    #[arg(long)]
    pub center_x: Option<f32>,

    /// View center y override, in source pixels
    #[arg(long)]
    pub center_y: Option<f32>,
}

impl ViewArgs {
    /// Build an engine for these args, load the source and apply the
    /// zoom/center overrides.
    pub fn engine_for(&self, path: &Path) -> Result<CropEngine> {
        let config = EngineConfig {
            viewport_width: self.width,
            viewport_height: self.height,
            preview_quality: self.quality,
            mask_color: self.mask,
        };
        let mut engine = CropEngine::new(config)?;
        engine.set_source(open_source(path)?)?;

        if let Some(zoom) = self.zoom {
            engine.set_zoom(zoom)?;
        }
        if self.center_x.is_some() || self.center_y.is_some() {
            let current = engine.geometry().expect("source just loaded");
            engine.set_center(
                self.center_x.unwrap_or(current.center_x),
                self.center_y.unwrap_or(current.center_y),
            )?;
        }
        Ok(engine)
    }
}

fn parse_argb(text: &str) -> std::result::Result<u32, String> {
    let hex = text.trim_start_matches("0x").trim_start_matches('#');
    u32::from_str_radix(hex, 16).map_err(|e| format!("invalid ARGB hex color: {e}"))
}

/// Open a source file, sniffing the raw container magic before falling back
/// to the image crate's format detection.
pub fn open_source(path: &Path) -> Result<SourceImage> {
    let mut magic = [0u8; RAW_MAGIC.len()];
    let read = File::open(path)
        .and_then(|mut f| f.read(&mut magic))
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let source = if read == magic.len() && &magic == RAW_MAGIC {
        SourceImage::open_raw(path)
    } else {
        SourceImage::open(path)
    };
    source.with_context(|| format!("Failed to load source {}", path.display()))
}
