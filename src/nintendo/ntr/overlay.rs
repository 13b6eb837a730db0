use crate::nintendo::ntr::constants::NTR_OVERLAY_ENTRY_SIZE;
use crate::nintendo::ntr::error::NintendoNTRResult;
use crate::nintendo::ntr::fs::builder::fat_entry;
use crate::nintendo::ntr::models::fnt::FatEntry;
use crate::nintendo::ntr::models::header::{NdsHeader, RomRegion};
use crate::nintendo::ntr::models::overlay::OverlayEntry;
use binrw::BinRead;
use log::debug;
use std::fmt::{Display, Formatter};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cpu {
    Arm9,
    Arm7,
}

impl Cpu {
    pub fn table_region(self) -> RomRegion {
        match self {
            Cpu::Arm9 => RomRegion::Arm9OverlayTable,
            Cpu::Arm7 => RomRegion::Arm7OverlayTable,
        }
    }

    /// Digit used in exported overlay names, `overlay9_0000.bin`.
    pub fn digit(self) -> u8 {
        match self {
            Cpu::Arm9 => 9,
            Cpu::Arm7 => 7,
        }
    }
}

impl Display for Cpu {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARM{}", self.digit())
    }
}

/// Overlay table entry together with the byte range its file id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub entry: OverlayEntry,
    pub file: FatEntry,
}

impl Overlay {
    pub fn file_name(&self, cpu: Cpu) -> String {
        format!("overlay{}_{:04}.bin", cpu.digit(), self.entry.overlay_id)
    }
}

/// Decodes the overlay table of `cpu`. A trailing partial entry is ignored.
pub fn overlay_table(rom: &[u8], header: &NdsHeader, cpu: Cpu) -> NintendoNTRResult<Vec<Overlay>> {
    let (offset, size) = header.region(cpu.table_region());
    if size == 0 {
        return Ok(Vec::new());
    }

    let start = offset as usize;
    let table = rom.get(start..start + size as usize).unwrap_or_default();
    let count = table.len() / NTR_OVERLAY_ENTRY_SIZE;
    if table.len() % NTR_OVERLAY_ENTRY_SIZE != 0 {
        debug!(
            "{cpu} overlay table size {:#x} is not a multiple of {NTR_OVERLAY_ENTRY_SIZE}",
            table.len()
        );
    }

    let mut cursor = Cursor::new(table);
    let mut overlays = Vec::with_capacity(count);
    for _ in 0..count {
        let entry = OverlayEntry::read(&mut cursor)?;
        let file = fat_entry(rom, header, entry.file_id)?;
        overlays.push(Overlay { entry, file });
    }

    debug!("Read {} {cpu} overlays", overlays.len());
    Ok(overlays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nintendo::ntr::error::NintendoNTRError;
    use crate::nintendo::ntr::fs::error::TreeError;
    use crate::nintendo::ntr::header::validate;
    use crate::nintendo::ntr::test_rom::{TestRom, write_header};

    fn rom_with_overlays() -> Vec<u8> {
        let mut rom = TestRom::single_file("A.BIN", vec![1]);
        rom.arm9_overlays = vec![vec![0x11; 40], vec![0x22; 8]];
        rom.build()
    }

    #[test]
    fn arm9_overlays_resolve_to_their_files() {
        let rom = rom_with_overlays();
        let header = validate(&rom).unwrap();
        let overlays = overlay_table(&rom, &header, Cpu::Arm9).unwrap();

        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[1].entry.overlay_id, 1);
        assert_eq!(overlays[1].file.size(), 8);
        let file = overlays[0].file;
        assert_eq!(&rom[file.start as usize..file.end as usize], &[0x11; 40]);
        assert_eq!(overlays[0].file_name(Cpu::Arm9), "overlay9_0000.bin");
    }

    #[test]
    fn empty_table_has_no_overlays() {
        let rom = rom_with_overlays();
        let header = validate(&rom).unwrap();
        assert!(overlay_table(&rom, &header, Cpu::Arm7).unwrap().is_empty());
    }

    #[test]
    fn partial_trailing_entry_is_ignored() {
        let mut rom = rom_with_overlays();
        let mut header = validate(&rom).unwrap();
        header.arm9_overlay_size = NTR_OVERLAY_ENTRY_SIZE as u32 + 4;
        write_header(&mut rom, &header);

        assert_eq!(overlay_table(&rom, &header, Cpu::Arm9).unwrap().len(), 1);
    }

    #[test]
    fn unknown_file_id_is_corrupt() {
        let mut rom = rom_with_overlays();
        let header = validate(&rom).unwrap();
        let file_id = header.arm9_overlay_offset as usize + 24;
        rom[file_id..file_id + 4].copy_from_slice(&500u32.to_le_bytes());

        assert!(matches!(
            overlay_table(&rom, &header, Cpu::Arm9),
            Err(NintendoNTRError::TreeError(TreeError::CorruptIndex(_)))
        ));
    }
}
