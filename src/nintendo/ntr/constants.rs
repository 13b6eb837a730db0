/// Size of the packed cartridge header record, including its alignment tail.
pub const NTR_HEADER_SIZE: usize = 0x200;

/// Size of the version 1 banner (icon, palette and six titles).
pub const NTR_BANNER_SIZE: usize = 0x840;

pub const NTR_ICON_WIDTH: u32 = 32;
pub const NTR_ICON_HEIGHT: u32 = 32;
pub const NTR_ICON_PALETTE_SIZE: usize = 16;

/// Files are allocated in 1 KiB granules inside the ROM image.
pub const NTR_FILE_GRANULE: u32 = 0x400;

/// Upper nibble set on every encoded folder id.
pub const NTR_FOLDER_TAG: u16 = 0xF000;
pub const NTR_FOLDER_ID_MASK: u16 = 0x0FFF;

pub const NTR_FNT_FOLDER_ENTRY_SIZE: usize = 8;
pub const NTR_FAT_ENTRY_SIZE: usize = 8;
pub const NTR_OVERLAY_ENTRY_SIZE: usize = 32;

/// Logo checksum every licensed cartridge carries.
pub const NTR_LOGO_CHECKSUM: u16 = 0xCF56;

pub const NTR_LANGUAGES: [&str; 6] = ["Japanese", "English", "French", "German", "Italian", "Spanish"];
