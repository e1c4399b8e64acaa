use image::RgbaImage;

use crate::consts::DECODE_MARGIN;
use crate::geometry::{ViewGeometry, Viewport};
use crate::source::SourceRect;

/// A planned view decode: the source rectangle to request, plus how far its
/// midpoint sits from the view center, in decoded-bitmap pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionPlan {
    pub rect: SourceRect,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// The decoded bitmap currently backing the preview, with the sampling it
/// was decoded at and its centering correction.
#[derive(Clone, Debug)]
pub struct DecodedPreview {
    pub bitmap: RgbaImage,
    pub sample_factor: u32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Plan the decode for the current view: per axis, half a viewport in source
/// pixels plus a safety margin on each side of the center, clamped to the
/// image edge when the edge is nearer.
///
/// When exactly one side of an axis clamps, the rectangle midpoint drifts
/// off the view center; the offsets carry that drift so the compositor can
/// shift the draw back.
pub fn plan_view_region(
    geometry: &ViewGeometry,
    viewport: Viewport,
    src_width: u32,
    src_height: u32,
    sample_factor: u32,
) -> RegionPlan {
    let (left, right) = span_axis(
        geometry.center_x,
        geometry.zoom,
        viewport.width as f32,
        src_width as f32,
    );
    let (top, bottom) = span_axis(
        geometry.center_y,
        geometry.zoom,
        viewport.height as f32,
        src_height as f32,
    );
    let sample = sample_factor as f32;
    RegionPlan {
        rect: SourceRect::from_edges(left, top, right, bottom),
        offset_x: (geometry.center_x - (left + right) as f32 / 2.0) / sample,
        offset_y: (geometry.center_y - (top + bottom) as f32 / 2.0) / sample,
    }
}

/// One axis of the view rectangle as `(near, far)` source edges, truncated
/// to whole pixels.
fn span_axis(center: f32, zoom: f32, viewport_extent: f32, dimension: f32) -> (u32, u32) {
    let half = viewport_extent / zoom / 2.0;
    let near = if center * zoom > viewport_extent / 2.0 {
        (center - half - DECODE_MARGIN).max(0.0) as u32
    } else {
        0
    };
    let far = if (dimension - center) * zoom > viewport_extent / 2.0 {
        (center + half + DECODE_MARGIN).min(dimension) as u32
    } else {
        dimension as u32
    };
    (near, far)
}

/// The crop rectangle: the square bounding the preview circle in source
/// pixels, intersected with the image. The clamped center keeps the circle
/// inside the image, so the intersection only trims float dust at the
/// edges.
pub fn plan_crop_region(
    geometry: &ViewGeometry,
    preview_radius: u32,
    src_width: u32,
    src_height: u32,
) -> SourceRect {
    let half = geometry.source_radius(preview_radius);
    let left = (geometry.center_x - half).max(0.0) as u32;
    let top = (geometry.center_y - half).max(0.0) as u32;
    let right = ((geometry.center_x + half) as u32).min(src_width);
    let bottom = ((geometry.center_y + half) as u32).min(src_height);
    SourceRect::from_edges(left, top, right, bottom)
}

/// Decode sample factor for a crop targeting `resolution` output pixels per
/// edge: how many times the crop square's source side fits over the target,
/// floored, at least 1.
pub fn crop_sample_factor(geometry: &ViewGeometry, preview_radius: u32, resolution: u32) -> u32 {
    let side = (preview_radius * 2) as f32 / geometry.zoom;
    ((side / resolution as f32) as u32).max(1)
}
