use image::RgbaImage;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::geometry::{Sampling, Viewport};
use crate::region::DecodedPreview;

/// Placement of the decoded bitmap in the viewport: uniform scale first,
/// then translate. Translating first would move the scaling pivot and land
/// the bitmap in the wrong place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewTransform {
    pub scale: f32,
    pub dx: f32,
    pub dy: f32,
}

/// Compute the placement for a decoded preview: the residual scale corrected
/// for the display scale, centered in the viewport, shifted by the decode
/// offsets.
pub fn preview_transform(
    viewport: Viewport,
    preview: &DecodedPreview,
    sampling: Sampling,
    display_scale: f32,
) -> PreviewTransform {
    let scale = sampling.residual_scale / display_scale;
    let (bw, bh) = preview.bitmap.dimensions();
    PreviewTransform {
        scale,
        dx: (viewport.width as f32 - bw as f32 * scale) / 2.0 - preview.offset_x * scale,
        dy: (viewport.height as f32 - bh as f32 * scale) / 2.0 - preview.offset_y * scale,
    }
}

/// Rasterize one viewport frame: the preview bitmap under its transform,
/// sampled nearest-neighbor, then the mask color blended over everything
/// outside the preview circle. With no preview loaded only the mask
/// renders, over transparency.
pub fn render_frame(
    viewport: Viewport,
    placed: Option<(&DecodedPreview, PreviewTransform)>,
    mask_color: u32,
) -> RgbaImage {
    let mut frame = RgbaImage::new(viewport.width, viewport.height);
    let mask = argb_channels(mask_color);
    let row_bytes = viewport.width as usize * 4;
    let pixels = viewport.width as usize * viewport.height as usize;
    let buf: &mut [u8] = &mut frame;

    if pixels >= PARALLEL_PIXEL_THRESHOLD {
        buf.par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| composite_row(y as u32, row, viewport, placed, mask));
    } else {
        for (y, row) in buf.chunks_mut(row_bytes).enumerate() {
            composite_row(y as u32, row, viewport, placed, mask);
        }
    }
    frame
}

fn composite_row(
    y: u32,
    row: &mut [u8],
    viewport: Viewport,
    placed: Option<(&DecodedPreview, PreviewTransform)>,
    mask: (u8, u8, u8, u8),
) {
    let (cx, cy) = viewport.center();
    let radius = viewport.preview_radius() as f32;
    let radius_sq = radius * radius;
    let py = y as f32 + 0.5;

    for x in 0..viewport.width {
        let px = x as f32 + 0.5;
        let pixel = &mut row[x as usize * 4..x as usize * 4 + 4];

        if let Some((preview, t)) = placed {
            let sx = (px - t.dx) / t.scale;
            let sy = (py - t.dy) / t.scale;
            if sx >= 0.0 && sy >= 0.0 {
                let (bw, bh) = preview.bitmap.dimensions();
                let (bx, by) = (sx as u32, sy as u32);
                if bx < bw && by < bh {
                    pixel.copy_from_slice(&preview.bitmap.get_pixel(bx, by).0);
                }
            }
        }

        let dx = px - cx;
        let dy = py - cy;
        if dx * dx + dy * dy > radius_sq {
            blend_mask(pixel, mask);
        }
    }
}

/// Split an ARGB color into its (a, r, g, b) channels.
fn argb_channels(color: u32) -> (u8, u8, u8, u8) {
    (
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    )
}

/// Source-over blend of the mask color onto one RGBA pixel in place.
fn blend_mask(pixel: &mut [u8], (ma, mr, mg, mb): (u8, u8, u8, u8)) {
    let a = ma as u32;
    let inv = 255 - a;
    pixel[0] = ((mr as u32 * a + pixel[0] as u32 * inv) / 255) as u8;
    pixel[1] = ((mg as u32 * a + pixel[1] as u32 * inv) / 255) as u8;
    pixel[2] = ((mb as u32 * a + pixel[2] as u32 * inv) / 255) as u8;
    pixel[3] = (a + pixel[3] as u32 * inv / 255) as u8;
}
