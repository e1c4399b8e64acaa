use crate::consts::PREVIEW_RADIUS_FACTOR;
use crate::error::{PortholeError, Result};

/// Display area the preview frame is rendered into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build a viewport, rejecting sizes too small to hold a preview window.
    pub fn checked(width: u32, height: u32) -> Result<Self> {
        let viewport = Self::new(width, height);
        if viewport.preview_radius() == 0 {
            return Err(PortholeError::InvalidConfig(format!(
                "viewport {width}x{height} too small for a preview window"
            )));
        }
        Ok(viewport)
    }

    /// Radius of the circular preview window in display pixels, centered in
    /// the viewport: 80% of half the limiting edge, truncated.
    pub fn preview_radius(&self) -> u32 {
        let half = self.width.min(self.height) / 2;
        (half as f32 * PREVIEW_RADIUS_FACTOR) as u32
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// Pan/zoom state: where on the source image the view is looking.
///
/// `center_x`/`center_y` are in source pixels, `zoom` is the source-to-display
/// magnification. The clamp methods keep the state inside the coverage
/// invariant: the preview circle always shows image, never background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub zoom: f32,
}

impl ViewGeometry {
    /// Initial state for a freshly loaded source: centered, zoomed so the
    /// limiting source edge exactly spans the preview diameter.
    pub fn fitted(src_width: u32, src_height: u32, preview_radius: u32) -> Self {
        let diameter = (preview_radius * 2) as f32;
        let limiting = src_width.min(src_height) as f32;
        Self {
            center_x: (src_width / 2) as f32,
            center_y: (src_height / 2) as f32,
            zoom: diameter / limiting,
        }
    }

    /// Raise the zoom to its floor if needed: the limiting source dimension
    /// must span the preview diameter. Runs before any center clamping,
    /// which is only meaningful at a valid zoom.
    pub fn clamp_zoom(&mut self, src_width: u32, src_height: u32, preview_radius: u32) {
        let diameter = (preview_radius * 2) as f32;
        let limiting = src_width.min(src_height) as f32;
        if limiting * self.zoom < diameter {
            self.zoom = diameter / limiting;
        }
    }

    /// Clamp the center per axis so the preview circle stays inside the
    /// image. At a valid zoom the two bounds of an axis cannot both bind.
    pub fn clamp_center(&mut self, src_width: u32, src_height: u32, preview_radius: u32) {
        let radius = preview_radius as f32;
        self.center_x = clamp_axis(self.center_x, src_width as f32, self.zoom, radius);
        self.center_y = clamp_axis(self.center_y, src_height as f32, self.zoom, radius);
    }

    /// Half-extent of the preview circle in source pixels.
    pub fn source_radius(&self, preview_radius: u32) -> f32 {
        preview_radius as f32 / self.zoom
    }
}

fn clamp_axis(center: f32, dimension: f32, zoom: f32, radius: f32) -> f32 {
    let mut c = center;
    if c * zoom < radius {
        c = radius / zoom;
    }
    if (dimension - c) * zoom < radius {
        c = dimension - radius / zoom;
    }
    c
}

/// Decoder sampling for a given zoom: the power-of-two downsample factor
/// handed to the region decoder, plus the zoom remainder the compositor
/// applies on top of the decoded bitmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampling {
    pub sample_factor: u32,
    /// Leftover magnification after sampling; always in (0, 1].
    pub residual_scale: f32,
}

impl Sampling {
    /// Sampling of an unscaled 1:1 decode.
    pub fn identity() -> Self {
        Self {
            sample_factor: 1,
            residual_scale: 1.0,
        }
    }
}

/// Resolve the decode sampling for a zoom and display scale.
///
/// The exponent is the square root of the ideal inverse magnification rather
/// than its log2, so the factor steps at quadratic boundaries (4, 9, 16, ..)
/// and stays fine-grained near zoom 1. The raw square-root form eventually
/// overshoots the ideal, so the factor is capped at the largest power of two
/// that still fits; the decoded bitmap is then never smaller than the
/// display needs.
pub fn resolve_sampling(zoom: f32, display_scale: f32) -> Sampling {
    let effective = zoom * display_scale;
    debug_assert!(effective > 0.0);
    let ideal = 1.0 / effective;
    let sample_factor = if ideal <= 1.0 {
        1
    } else {
        let damped = ideal.sqrt() as u32;
        let cap = 31 - (ideal as u32).leading_zeros();
        1u32 << damped.min(cap)
    };
    Sampling {
        sample_factor,
        residual_scale: effective * sample_factor as f32,
    }
}
