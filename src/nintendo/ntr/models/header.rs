use binrw::{BinRead, BinWrite};
use std::fmt::{Display, Formatter};

/// Cartridge header located at offset 0 of every NDS ROM.
///
/// All multi-byte fields are little-endian. The record is 0x1FC bytes of fields padded to
/// [`NTR_HEADER_SIZE`](crate::nintendo::ntr::constants::NTR_HEADER_SIZE).
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct NdsHeader {
    /// Game title, null padded ASCII
    pub title: [u8; 12],

    /// Game code, e.g. `AMCE`
    pub game_code: [u8; 4],

    /// Maker code, e.g. `01` for Nintendo
    pub maker_code: [u8; 2],

    /// Unit code (0x00 = NDS, 0x02 = NDS + DSi, 0x03 = DSi only)
    pub unit_code: u8,

    /// Encryption seed select
    pub encryption_seed: u8,

    /// Device capacity (chip size = 128 KiB << capacity)
    pub capacity: u8,

    pub reserved1: [u8; 7],

    /// Used by DSi titles
    pub dsi_flags: [u8; 2],

    /// ROM version
    pub version: u8,

    /// Flags such as auto start (bit 2)
    pub flags: u8,

    pub arm9_offset: u32,
    pub arm9_entry: u32,
    pub arm9_load: u32,
    pub arm9_size: u32,

    pub arm7_offset: u32,
    pub arm7_entry: u32,
    pub arm7_load: u32,
    pub arm7_size: u32,

    /// File name table
    pub fnt_offset: u32,
    pub fnt_size: u32,

    /// File allocation table
    pub fat_offset: u32,
    pub fat_size: u32,

    pub arm9_overlay_offset: u32,
    pub arm9_overlay_size: u32,
    pub arm7_overlay_offset: u32,
    pub arm7_overlay_size: u32,

    /// Normal card control register settings
    pub card_control: u32,

    /// Secure card control register settings
    pub secure_card_control: u32,

    /// Offset of the [`NdsBanner`](super::banner::NdsBanner), 0 if there is none
    pub banner_offset: u32,

    /// Secure area checksum
    pub secure_area_checksum: u16,

    /// Secure area loading timeout
    pub secure_area_timeout: u16,

    /// Auto load list RAM addresses
    pub arm9_autoload: u32,
    pub arm7_autoload: u32,

    /// Secure area disable
    pub secure_area_disable: u64,

    /// Total used ROM size
    pub rom_size: u32,
    pub header_size: u32,

    pub reserved2: [u8; 56],

    /// Compressed Nintendo logo bitmap
    pub logo: [u8; 156],

    /// CRC-16 of the logo
    pub logo_checksum: u16,

    /// CRC-16 of the header bytes 0x000..0x15E
    pub header_checksum: u16,

    pub debug_rom_offset: u32,
    pub debug_rom_size: u32,

    pub reserved3: [u8; 0x98],
}

/// Byte regions a header points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RomRegion {
    Arm9,
    Arm7,
    FileNameTable,
    FileAllocationTable,
    Arm9OverlayTable,
    Arm7OverlayTable,
    DebugRom,
}

impl RomRegion {
    pub const ALL: [RomRegion; 7] = [
        RomRegion::Arm9,
        RomRegion::Arm7,
        RomRegion::FileNameTable,
        RomRegion::FileAllocationTable,
        RomRegion::Arm9OverlayTable,
        RomRegion::Arm7OverlayTable,
        RomRegion::DebugRom,
    ];
}

impl Display for RomRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RomRegion::Arm9 => "ARM9 binary",
            RomRegion::Arm7 => "ARM7 binary",
            RomRegion::FileNameTable => "File name table",
            RomRegion::FileAllocationTable => "File allocation table",
            RomRegion::Arm9OverlayTable => "ARM9 overlay table",
            RomRegion::Arm7OverlayTable => "ARM7 overlay table",
            RomRegion::DebugRom => "Debug ROM",
        };
        f.write_str(name)
    }
}

fn trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

impl NdsHeader {
    /// Returns the `(offset, size)` pair the header declares for `region`.
    pub fn region(&self, region: RomRegion) -> (u32, u32) {
        match region {
            RomRegion::Arm9 => (self.arm9_offset, self.arm9_size),
            RomRegion::Arm7 => (self.arm7_offset, self.arm7_size),
            RomRegion::FileNameTable => (self.fnt_offset, self.fnt_size),
            RomRegion::FileAllocationTable => (self.fat_offset, self.fat_size),
            RomRegion::Arm9OverlayTable => (self.arm9_overlay_offset, self.arm9_overlay_size),
            RomRegion::Arm7OverlayTable => (self.arm7_overlay_offset, self.arm7_overlay_size),
            RomRegion::DebugRom => (self.debug_rom_offset, self.debug_rom_size),
        }
    }

    pub fn title(&self) -> String {
        trimmed(&self.title)
    }

    pub fn game_code(&self) -> String {
        trimmed(&self.game_code)
    }

    pub fn maker_code(&self) -> String {
        trimmed(&self.maker_code)
    }

    pub fn has_banner(&self) -> bool {
        self.banner_offset != 0
    }
}
