use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use image::RgbaImage;
use memmap2::Mmap;

use crate::error::{PortholeError, Result};

use super::plane::{check_sample_factor, decode_plane_region};
use super::{RegionDecoder, SourceRect};

/// Magic bytes at the start of every raw pixel container.
pub const RAW_MAGIC: &[u8; 12] = b"PORTHOLERAW1";

/// Header size in bytes: magic plus two little-endian u32 dimensions.
pub const RAW_HEADER_SIZE: usize = 20;

/// Parsed raw container header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawHeader {
    pub width: u32,
    pub height: u32,
}

impl RawHeader {
    /// Byte size of the RGBA pixel plane described by this header.
    pub fn plane_byte_size(&self) -> usize {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4))
            .expect("plane size overflows usize")
    }
}

/// Memory-mapped reader for the raw pixel container.
///
/// The container holds a plain RGBA row plane behind a fixed header, so a
/// region decode touches only the mapped pages of the requested rows. This
/// is the partial-decode path for sources too large to hold decoded in
/// memory.
#[derive(Debug)]
pub struct RawRegionDecoder {
    mmap: Mmap,
    header: RawHeader,
}

impl RawRegionDecoder {
    /// Open and validate a raw container file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < RAW_HEADER_SIZE {
            return Err(PortholeError::SourceUnreadable(format!(
                "file too small for a raw container header: {} bytes",
                mmap.len()
            )));
        }
        if &mmap[..RAW_MAGIC.len()] != RAW_MAGIC {
            return Err(PortholeError::SourceUnreadable(
                "missing PORTHOLERAW1 magic".into(),
            ));
        }

        let header = parse_header(&mmap[..RAW_HEADER_SIZE])?;
        let expected = RAW_HEADER_SIZE + header.plane_byte_size();
        if mmap.len() < expected {
            return Err(PortholeError::SourceUnreadable(format!(
                "file truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    fn plane(&self) -> &[u8] {
        &self.mmap[RAW_HEADER_SIZE..RAW_HEADER_SIZE + self.header.plane_byte_size()]
    }
}

fn parse_header(buf: &[u8]) -> Result<RawHeader> {
    let mut cursor = Cursor::new(&buf[RAW_MAGIC.len()..]);
    let width = cursor.read_u32::<LittleEndian>()?;
    let height = cursor.read_u32::<LittleEndian>()?;
    if width == 0 || height == 0 {
        return Err(PortholeError::InvalidDimensions { width, height });
    }
    Ok(RawHeader { width, height })
}

impl RegionDecoder for RawRegionDecoder {
    fn dimensions(&self) -> (u32, u32) {
        (self.header.width, self.header.height)
    }

    fn decode_region(&mut self, rect: SourceRect, sample_factor: u32) -> Result<RgbaImage> {
        check_sample_factor(sample_factor)?;
        rect.validated(self.header.width, self.header.height)?;
        Ok(decode_plane_region(
            self.plane(),
            self.header.width,
            rect,
            sample_factor,
        ))
    }
}
