use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MASK_COLOR, DEFAULT_PREVIEW_QUALITY, DEFAULT_VIEWPORT_SIZE, DISPLAY_SCALE_RANGE,
    MIN_DISPLAY_SCALE,
};
use crate::error::{PortholeError, Result};
use crate::geometry::Viewport;

/// Engine construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Viewport width in display pixels.
    #[serde(default = "default_viewport_size")]
    pub viewport_width: u32,

    /// Viewport height in display pixels.
    #[serde(default = "default_viewport_size")]
    pub viewport_height: u32,

    /// Preview quality in [0, 1]. Maps linearly onto the display scale
    /// `0.1 + quality * 0.9`; decoded previews never exceed the display
    /// resolution, so quality 1 means a 1:1 decode.
    #[serde(default = "default_preview_quality")]
    pub preview_quality: f32,

    /// Mask overlay color as ARGB.
    #[serde(default = "default_mask_color")]
    pub mask_color: u32,
}

fn default_viewport_size() -> u32 {
    DEFAULT_VIEWPORT_SIZE
}

fn default_preview_quality() -> f32 {
    DEFAULT_PREVIEW_QUALITY
}

fn default_mask_color() -> u32 {
    DEFAULT_MASK_COLOR
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_size(),
            viewport_height: default_viewport_size(),
            preview_quality: default_preview_quality(),
            mask_color: default_mask_color(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations that cannot host a preview window.
    pub fn validate(&self) -> Result<()> {
        Viewport::checked(self.viewport_width, self.viewport_height)?;
        if !(0.0..=1.0).contains(&self.preview_quality) {
            return Err(PortholeError::InvalidConfig(format!(
                "preview quality {} outside [0, 1]",
                self.preview_quality
            )));
        }
        Ok(())
    }
}

/// Map a preview quality to its display scale, clamping quality to [0, 1].
pub fn display_scale_for(quality: f32) -> f32 {
    MIN_DISPLAY_SCALE + quality.clamp(0.0, 1.0) * DISPLAY_SCALE_RANGE
}
