mod memory;
mod plane;
mod raw;
mod raw_writer;

pub use memory::MemoryRegionDecoder;
pub use raw::{RawHeader, RawRegionDecoder, RAW_HEADER_SIZE, RAW_MAGIC};
pub use raw_writer::{write_raw_image, RawImageWriter};

use std::io::{BufRead, Seek};
use std::path::Path;

use image::RgbaImage;

use crate::error::{PortholeError, Result};

/// A rectangle in source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from edge coordinates. Callers guarantee `right >= left` and
    /// `bottom >= top`.
    pub fn from_edges(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Reject empty or out-of-bounds rectangles for a source of the given
    /// dimensions.
    pub fn validated(&self, src_width: u32, src_height: u32) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PortholeError::DecodeRegionFailed(format!(
                "empty region {}x{} at ({}, {})",
                self.width, self.height, self.x, self.y
            )));
        }
        if self.x as u64 + self.width as u64 > src_width as u64
            || self.y as u64 + self.height as u64 > src_height as u64
        {
            return Err(PortholeError::DecodeRegionFailed(format!(
                "region ({}, {}) {}x{} exceeds source dimensions {}x{}",
                self.x, self.y, self.width, self.height, src_width, src_height
            )));
        }
        Ok(())
    }
}

/// Partial-decode capability over one source image.
///
/// Implementations materialize only the requested rectangle, never the whole
/// source, so a view can move over images larger than memory.
pub trait RegionDecoder: Send {
    /// Full source dimensions as (width, height).
    fn dimensions(&self) -> (u32, u32);

    /// Decode `rect` at `sample_factor` source pixels per output pixel and
    /// axis. Output dimensions are `rect / sample_factor` rounded up, with
    /// edge blocks averaged over the pixels available. Invalid rectangles
    /// and a zero factor are rejected with `DecodeRegionFailed`.
    fn decode_region(&mut self, rect: SourceRect, sample_factor: u32) -> Result<RgbaImage>;
}

/// A loaded source: its logical dimensions plus the decoder serving regions
/// of it. The engine owns the source exclusively for its lifetime.
pub struct SourceImage {
    width: u32,
    height: u32,
    decoder: Box<dyn RegionDecoder>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl SourceImage {
    /// Wrap a custom region decoder.
    pub fn from_decoder(decoder: Box<dyn RegionDecoder>) -> Result<Self> {
        let (width, height) = decoder.dimensions();
        if width == 0 || height == 0 {
            return Err(PortholeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            decoder,
        })
    }

    /// Open an image file in any format the `image` crate reads, fully
    /// decoded into a memory-backed region decoder.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::ImageReader::open(path)?
            .decode()
            .map_err(|e| PortholeError::SourceUnreadable(e.to_string()))?;
        Self::from_decoder(Box::new(MemoryRegionDecoder::new(img.to_rgba8())))
    }

    /// Decode a source from any seekable byte stream, sniffing the format
    /// from its content.
    pub fn from_reader<R: BufRead + Seek>(reader: R) -> Result<Self> {
        let img = image::ImageReader::new(reader)
            .with_guessed_format()?
            .decode()
            .map_err(|e| PortholeError::SourceUnreadable(e.to_string()))?;
        Self::from_decoder(Box::new(MemoryRegionDecoder::new(img.to_rgba8())))
    }

    /// Open a raw pixel container through its memory-mapped region decoder.
    pub fn open_raw(path: &Path) -> Result<Self> {
        Self::from_decoder(Box::new(RawRegionDecoder::open(path)?))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn decode_region(&mut self, rect: SourceRect, sample_factor: u32) -> Result<RgbaImage> {
        self.decoder.decode_region(rect, sample_factor)
    }
}
