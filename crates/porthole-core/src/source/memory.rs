use image::RgbaImage;

use crate::error::Result;

use super::plane::{check_sample_factor, decode_plane_region};
use super::{RegionDecoder, SourceRect};

/// Region decoder backed by a fully decoded RGBA bitmap.
///
/// Decoding the whole source once up front trades peak memory for format
/// coverage; sources too large for that go through the raw container
/// decoder instead.
pub struct MemoryRegionDecoder {
    pixels: RgbaImage,
}

impl MemoryRegionDecoder {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}

impl RegionDecoder for MemoryRegionDecoder {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn decode_region(&mut self, rect: SourceRect, sample_factor: u32) -> Result<RgbaImage> {
        check_sample_factor(sample_factor)?;
        let (width, height) = self.pixels.dimensions();
        rect.validated(width, height)?;
        Ok(decode_plane_region(
            self.pixels.as_raw(),
            width,
            rect,
            sample_factor,
        ))
    }
}
