use crate::nintendo::ntr::fs::error::{TreeError, VfsError};
use crate::nintendo::ntr::graphics::ImageError;
use crate::nintendo::ntr::header::error::HeaderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NintendoNTRError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error(transparent)]
    HeaderError(#[from] HeaderError),

    #[error(transparent)]
    TreeError(#[from] TreeError),

    #[error(transparent)]
    VfsError(#[from] VfsError),

    #[error(transparent)]
    ImageError(#[from] ImageError),

    #[error(transparent)]
    PngError(#[from] image::ImageError),

    #[error("ROM has no banner")]
    NoBanner,

    #[error("Refusing to export unsafe file name {0:?}")]
    UnsafeName(String),

    #[error("Pixel buffer does not match a {width}x{height} image")]
    PixelBufferSize { width: u32, height: u32 },

    #[error("Output path {0} exists and is not a directory")]
    OutputNotADirectory(PathBuf),
}

pub type NintendoNTRResult<T> = Result<T, NintendoNTRError>;
