use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgba, RgbaImage};

use porthole_core::error::{PortholeError, Result};
use porthole_core::source::{MemoryRegionDecoder, RegionDecoder, SourceRect};

/// Deterministic RGBA test image: each pixel encodes its own coordinates.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

/// Uniform RGBA test image.
pub fn solid_image(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(pixel))
}

/// Write a gradient PNG to a temp file.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_png(width: u32, height: u32) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("create temp file");
    gradient_image(width, height)
        .save_with_format(file.path(), ImageFormat::Png)
        .expect("write PNG");
    file
}

/// Region decoder that counts decode calls and records the last request,
/// through handles that stay usable after the decoder moves into an engine.
pub struct CountingDecoder {
    inner: MemoryRegionDecoder,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(SourceRect, u32)>>>,
}

impl CountingDecoder {
    pub fn new(pixels: RgbaImage) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Option<(SourceRect, u32)>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let decoder = Self {
            inner: MemoryRegionDecoder::new(pixels),
            calls: Arc::clone(&calls),
            last_request: Arc::clone(&last_request),
        };
        (decoder, calls, last_request)
    }
}

impl RegionDecoder for CountingDecoder {
    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn decode_region(&mut self, rect: SourceRect, sample_factor: u32) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((rect, sample_factor));
        self.inner.decode_region(rect, sample_factor)
    }
}

/// Region decoder that starts failing after a set number of successful
/// decodes.
pub struct FailingDecoder {
    inner: MemoryRegionDecoder,
    successes_left: usize,
}

impl FailingDecoder {
    pub fn new(pixels: RgbaImage, successes: usize) -> Self {
        Self {
            inner: MemoryRegionDecoder::new(pixels),
            successes_left: successes,
        }
    }
}

impl RegionDecoder for FailingDecoder {
    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn decode_region(&mut self, rect: SourceRect, sample_factor: u32) -> Result<RgbaImage> {
        if self.successes_left == 0 {
            return Err(PortholeError::DecodeRegionFailed(
                "synthetic decoder failure".into(),
            ));
        }
        self.successes_left -= 1;
        self.inner.decode_region(rect, sample_factor)
    }
}
