use binrw::{BinRead, BinWrite};

/// Entry of an ARM9/ARM7 overlay table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct OverlayEntry {
    pub overlay_id: u32,
    pub ram_address: u32,
    pub ram_size: u32,
    pub bss_size: u32,
    pub static_init_start: u32,
    pub static_init_end: u32,

    /// Index into the file allocation table
    pub file_id: u32,

    /// Compressed size in bits 0-23, flags in bits 24-31
    pub flags: u32,
}

impl OverlayEntry {
    pub fn is_compressed(&self) -> bool {
        self.flags & 0x0100_0000 != 0
    }
}
