use crate::nintendo::ntr::models::header::RomRegion;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error("ROM is {len} bytes, smaller than the {required} byte header")]
    TooSmall { len: usize, required: usize },

    #[error("Declared header size {header_size:#x} is smaller than {required:#x}")]
    HeaderSizeTooSmall { header_size: u32, required: usize },

    #[error("Declared ROM size {rom_size:#x} exceeds the {len:#x} byte image")]
    RomSizeExceedsImage { rom_size: u32, len: usize },

    #[error("Banner at {offset:#x} does not fit in the ROM size {rom_size:#x}")]
    BannerOutOfBounds { offset: u32, rom_size: u32 },

    #[error("{region} [{offset:#x}, +{size:#x}) does not fit in the ROM size {rom_size:#x}")]
    RegionOutOfBounds {
        region: RomRegion,
        offset: u32,
        size: u32,
        rom_size: u32,
    },
}

pub type HeaderResult<T> = Result<T, HeaderError>;
