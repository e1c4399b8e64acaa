use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use image::RgbaImage;

use crate::error::{PortholeError, Result};

use super::raw::RAW_MAGIC;

/// Writes a valid raw pixel container at the byte level, one row at a time,
/// so a conversion never needs the whole plane in memory at once.
pub struct RawImageWriter {
    writer: BufWriter<File>,
    width: u32,
    height: u32,
    rows_written: u32,
}

impl RawImageWriter {
    /// Create the container file and write its header.
    pub fn create(path: &Path, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PortholeError::InvalidDimensions { width, height });
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(RAW_MAGIC)?;
        writer.write_u32::<LittleEndian>(width)?;
        writer.write_u32::<LittleEndian>(height)?;
        Ok(Self {
            writer,
            width,
            height,
            rows_written: 0,
        })
    }

    /// Append one RGBA row of `width * 4` bytes.
    pub fn write_row(&mut self, row: &[u8]) -> Result<()> {
        debug_assert_eq!(row.len(), self.width as usize * 4);
        self.writer.write_all(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush and finalize the file.
    pub fn finalize(mut self) -> Result<()> {
        debug_assert_eq!(self.rows_written, self.height);
        self.writer.flush()?;
        Ok(())
    }
}

/// Write a decoded bitmap into a raw container file in one call.
pub fn write_raw_image(path: &Path, image: &RgbaImage) -> Result<()> {
    let (width, height) = image.dimensions();
    let mut writer = RawImageWriter::create(path, width, height)?;
    let row_bytes = width as usize * 4;
    for row in image.as_raw().chunks(row_bytes) {
        writer.write_row(row)?;
    }
    writer.finalize()
}
