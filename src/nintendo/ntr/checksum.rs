use crate::nintendo::ntr::constants::{NTR_BANNER_SIZE, NTR_LOGO_CHECKSUM};
use crate::nintendo::ntr::models::header::NdsHeader;
use crc::{CRC_16_MODBUS, Crc};
use std::fmt::{Display, Formatter};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Header bytes covered by `NdsHeader::header_checksum`.
const HEADER_CHECKED_LEN: usize = 0x15E;

/// Banner bytes before this offset (version, checksums, reserved) are not covered.
const BANNER_CHECKED_START: usize = 0x20;

/// CRC over the first 0x15E bytes of the ROM.
pub fn header_crc(rom: &[u8]) -> u16 {
    CRC16.checksum(&rom[..rom.len().min(HEADER_CHECKED_LEN)])
}

pub fn logo_crc(logo: &[u8]) -> u16 {
    CRC16.checksum(logo)
}

/// CRC over bytes 0x20..0x840 of a serialized banner.
pub fn banner_crc(banner: &[u8]) -> u16 {
    let end = banner.len().min(NTR_BANNER_SIZE);
    CRC16.checksum(banner.get(BANNER_CHECKED_START..end).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumStatus {
    pub stored: u16,
    pub computed: u16,
}

impl ChecksumStatus {
    pub fn is_valid(&self) -> bool {
        self.stored == self.computed
    }
}

impl Display for ChecksumStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "{:#06x} (ok)", self.stored)
        } else {
            write!(f, "{:#06x} (computed {:#06x})", self.stored, self.computed)
        }
    }
}

/// Stored versus recomputed checksums. Mismatches are informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumReport {
    pub header: ChecksumStatus,
    pub logo: ChecksumStatus,
    pub banner: Option<ChecksumStatus>,
}

impl ChecksumReport {
    /// `header` must come from `validate(rom)`, so the banner range is known to be in bounds.
    pub fn compute(rom: &[u8], header: &NdsHeader) -> Self {
        let banner = if header.has_banner() {
            let start = header.banner_offset as usize;
            rom.get(start..start + NTR_BANNER_SIZE)
                .map(|bytes| ChecksumStatus {
                    stored: u16::from_le_bytes([bytes[2], bytes[3]]),
                    computed: banner_crc(bytes),
                })
        } else {
            None
        };

        Self {
            header: ChecksumStatus {
                stored: header.header_checksum,
                computed: header_crc(rom),
            },
            logo: ChecksumStatus {
                stored: header.logo_checksum,
                computed: logo_crc(&header.logo),
            },
            banner,
        }
    }

    /// Whether the stored logo checksum is the one licensed cartridges carry.
    pub fn has_nintendo_logo(&self) -> bool {
        self.logo.stored == NTR_LOGO_CHECKSUM
    }
}
