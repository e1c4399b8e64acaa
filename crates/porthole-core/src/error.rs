use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortholeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable source image: {0}")]
    SourceUnreadable(String),

    #[error("No source image loaded")]
    NoSourceLoaded,

    #[error("Region decode failed: {0}")]
    DecodeRegionFailed(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PortholeError>;
