use image::RgbaImage;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{PortholeError, Result};

use super::SourceRect;

/// Decoder-side guard against a zero sample factor.
pub(crate) fn check_sample_factor(sample_factor: u32) -> Result<()> {
    if sample_factor == 0 {
        return Err(PortholeError::DecodeRegionFailed(
            "sample factor must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Decode `rect` out of a tightly packed RGBA row plane of width
/// `plane_width`, downsampled by `sample_factor`.
pub(crate) fn decode_plane_region(
    plane: &[u8],
    plane_width: u32,
    rect: SourceRect,
    sample_factor: u32,
) -> RgbaImage {
    if sample_factor == 1 {
        copy_region(plane, plane_width, rect)
    } else {
        downsample_region(plane, plane_width, rect, sample_factor)
    }
}

/// Straight row-by-row copy of `rect`.
fn copy_region(plane: &[u8], plane_width: u32, rect: SourceRect) -> RgbaImage {
    let stride = plane_width as usize * 4;
    let col_offset = rect.x as usize * 4;
    let row_bytes = rect.width as usize * 4;
    let mut out = RgbaImage::new(rect.width, rect.height);
    let buf: &mut [u8] = &mut out;
    for row in 0..rect.height as usize {
        let src_start = (rect.y as usize + row) * stride + col_offset;
        let dst_start = row * row_bytes;
        buf[dst_start..dst_start + row_bytes]
            .copy_from_slice(&plane[src_start..src_start + row_bytes]);
    }
    out
}

/// Box-average downsample: each output pixel is the mean of a
/// `sample x sample` block. Output dimensions round up, so edge blocks may
/// average fewer pixels but every source pixel in `rect` contributes.
fn downsample_region(
    plane: &[u8],
    plane_width: u32,
    rect: SourceRect,
    sample_factor: u32,
) -> RgbaImage {
    let k = sample_factor as usize;
    let out_w = (rect.width as usize).div_ceil(k);
    let out_h = (rect.height as usize).div_ceil(k);
    let mut out = RgbaImage::new(out_w as u32, out_h as u32);
    let row_bytes = out_w * 4;
    let buf: &mut [u8] = &mut out;

    if out_w * out_h >= PARALLEL_PIXEL_THRESHOLD {
        buf.par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(oy, row)| downsample_row(plane, plane_width, rect, k, oy, out_w, row));
    } else {
        for (oy, row) in buf.chunks_mut(row_bytes).enumerate() {
            downsample_row(plane, plane_width, rect, k, oy, out_w, row);
        }
    }
    out
}

fn downsample_row(
    plane: &[u8],
    plane_width: u32,
    rect: SourceRect,
    k: usize,
    oy: usize,
    out_w: usize,
    row: &mut [u8],
) {
    let stride = plane_width as usize * 4;
    let y0 = rect.y as usize + oy * k;
    let y1 = (y0 + k).min((rect.y + rect.height) as usize);
    for ox in 0..out_w {
        let x0 = rect.x as usize + ox * k;
        let x1 = (x0 + k).min((rect.x + rect.width) as usize);
        let (mut r, mut g, mut b, mut a) = (0u64, 0u64, 0u64, 0u64);
        for y in y0..y1 {
            let row_base = y * stride;
            for x in x0..x1 {
                let i = row_base + x * 4;
                r += plane[i] as u64;
                g += plane[i + 1] as u64;
                b += plane[i + 2] as u64;
                a += plane[i + 3] as u64;
            }
        }
        let count = ((y1 - y0) * (x1 - x0)) as u64;
        let o = ox * 4;
        row[o] = (r / count) as u8;
        row[o + 1] = (g / count) as u8;
        row[o + 2] = (b / count) as u8;
        row[o + 3] = (a / count) as u8;
    }
}
