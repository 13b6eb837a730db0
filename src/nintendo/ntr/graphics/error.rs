use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image of {width}x{height} pixels can't be split into 8x8 tiles")]
    TilingMismatch { width: u32, height: u32 },

    #[error("Image data holds {actual} bytes but {expected} are required")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Palette index {index} is out of range for a palette of {len} colors")]
    PaletteIndexOutOfRange { index: u8, len: usize },
}

pub type ImageResult<T> = Result<T, ImageError>;
