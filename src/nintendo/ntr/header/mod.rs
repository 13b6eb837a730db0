use crate::nintendo::ntr::constants::{NTR_BANNER_SIZE, NTR_HEADER_SIZE};
use crate::nintendo::ntr::header::error::{HeaderError, HeaderResult};
use crate::nintendo::ntr::models::header::{NdsHeader, RomRegion};
use binrw::BinRead;
use log::debug;
use std::io::Cursor;

pub mod error;

/// Parses the header and checks every region it declares against the ROM size.
///
/// Everything downstream trusts the returned header's bounds, so this has to run first.
pub fn validate(rom: &[u8]) -> HeaderResult<NdsHeader> {
    if rom.len() < NTR_HEADER_SIZE {
        return Err(HeaderError::TooSmall {
            len: rom.len(),
            required: NTR_HEADER_SIZE,
        });
    }

    let header = NdsHeader::read(&mut Cursor::new(&rom[..NTR_HEADER_SIZE]))?;
    check_bounds(&header, rom.len())?;

    debug!(
        "Header of {} ({}) is valid, ROM size {:#x}",
        header.title(),
        header.game_code(),
        header.rom_size
    );

    Ok(header)
}

/// Region checks against `header.rom_size`; all arithmetic is done in 64 bits so nothing wraps.
pub fn check_bounds(header: &NdsHeader, image_len: usize) -> HeaderResult<()> {
    let rom_size = u64::from(header.rom_size);

    if (header.header_size as usize) < NTR_HEADER_SIZE {
        return Err(HeaderError::HeaderSizeTooSmall {
            header_size: header.header_size,
            required: NTR_HEADER_SIZE,
        });
    }

    if header.rom_size as usize > image_len {
        return Err(HeaderError::RomSizeExceedsImage {
            rom_size: header.rom_size,
            len: image_len,
        });
    }

    if u64::from(header.banner_offset) + NTR_BANNER_SIZE as u64 >= rom_size {
        return Err(HeaderError::BannerOutOfBounds {
            offset: header.banner_offset,
            rom_size: header.rom_size,
        });
    }

    for region in RomRegion::ALL {
        let (offset, size) = header.region(region);
        if size != 0 && u64::from(offset) + u64::from(size) > rom_size {
            return Err(HeaderError::RegionOutOfBounds {
                region,
                offset,
                size,
                rom_size: header.rom_size,
            });
        }
    }

    Ok(())
}
