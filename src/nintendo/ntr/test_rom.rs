//! Assembles small but structurally valid ROM images for tests.

use crate::nintendo::ntr::checksum::{banner_crc, header_crc, logo_crc};
use crate::nintendo::ntr::constants::{
    NTR_FILE_GRANULE, NTR_FOLDER_TAG, NTR_HEADER_SIZE, NTR_OVERLAY_ENTRY_SIZE,
};
use crate::nintendo::ntr::models::banner::NdsBanner;
use crate::nintendo::ntr::models::fnt::{FatEntry, FntFolderEntry};
use crate::nintendo::ntr::models::header::NdsHeader;
use crate::nintendo::ntr::models::overlay::OverlayEntry;
use binrw::BinWrite;
use std::io::Cursor;

pub fn blank_header() -> NdsHeader {
    NdsHeader {
        title: [0; 12],
        game_code: [0; 4],
        maker_code: [0; 2],
        unit_code: 0,
        encryption_seed: 0,
        capacity: 0,
        reserved1: [0; 7],
        dsi_flags: [0; 2],
        version: 0,
        flags: 0,
        arm9_offset: 0,
        arm9_entry: 0,
        arm9_load: 0,
        arm9_size: 0,
        arm7_offset: 0,
        arm7_entry: 0,
        arm7_load: 0,
        arm7_size: 0,
        fnt_offset: 0,
        fnt_size: 0,
        fat_offset: 0,
        fat_size: 0,
        arm9_overlay_offset: 0,
        arm9_overlay_size: 0,
        arm7_overlay_offset: 0,
        arm7_overlay_size: 0,
        card_control: 0,
        secure_card_control: 0,
        banner_offset: 0,
        secure_area_checksum: 0,
        secure_area_timeout: 0,
        arm9_autoload: 0,
        arm7_autoload: 0,
        secure_area_disable: 0,
        rom_size: 0,
        header_size: 0x4000,
        reserved2: [0; 56],
        logo: [0; 156],
        logo_checksum: 0,
        header_checksum: 0,
        debug_rom_offset: 0,
        debug_rom_size: 0,
        reserved3: [0; 0x98],
    }
}

pub fn blank_banner() -> NdsBanner {
    NdsBanner {
        version: 1,
        checksum: 0,
        reserved: [0; 28],
        icon: [0; 512],
        palette: [0; 16],
        titles: [[0; 128]; 6],
    }
}

pub fn write_header(rom: &mut [u8], header: &NdsHeader) {
    let mut buf = Vec::with_capacity(NTR_HEADER_SIZE);
    header.write(&mut Cursor::new(&mut buf)).unwrap();
    rom[..NTR_HEADER_SIZE].copy_from_slice(&buf);
}

#[derive(Debug, Clone)]
pub enum TestEntry {
    File(String, Vec<u8>),
    Folder(String, u16),
}

#[derive(Debug, Clone)]
pub struct TestFolder {
    pub parent: u16,
    pub entries: Vec<TestEntry>,
}

/// Folder 0 is the root; files get FAT slots in name table order, after any overlays.
#[derive(Debug, Clone)]
pub struct TestRom {
    pub folders: Vec<TestFolder>,
    pub banner: NdsBanner,
    pub arm9: Vec<u8>,
    pub arm7: Vec<u8>,
    pub arm9_overlays: Vec<Vec<u8>>,
    pub debug_rom: Vec<u8>,
    pub file_base: usize,
    /// End the image right after its last payload instead of padding it to 1 KiB
    pub trimmed: bool,
}

fn append_aligned(rom: &mut Vec<u8>, data: &[u8], align: usize) -> u32 {
    rom.resize(rom.len().next_multiple_of(align), 0);
    let offset = rom.len() as u32;
    rom.extend_from_slice(data);
    offset
}

impl TestRom {
    pub fn new() -> Self {
        Self {
            folders: vec![TestFolder {
                parent: 0,
                entries: Vec::new(),
            }],
            banner: blank_banner(),
            arm9: Vec::new(),
            arm7: Vec::new(),
            arm9_overlays: Vec::new(),
            debug_rom: Vec::new(),
            file_base: 0x1000,
            trimmed: false,
        }
    }

    pub fn single_file(name: &str, data: Vec<u8>) -> Self {
        let mut rom = Self::new();
        rom.add_file(0, name, data);
        rom
    }

    pub fn add_file(&mut self, folder: u16, name: &str, data: Vec<u8>) {
        self.folders[folder as usize]
            .entries
            .push(TestEntry::File(name.to_string(), data));
    }

    pub fn add_folder(&mut self, parent: u16, name: &str) -> u16 {
        let id = self.folders.len() as u16;
        self.folders.push(TestFolder {
            parent,
            entries: Vec::new(),
        });
        self.folders[parent as usize]
            .entries
            .push(TestEntry::Folder(name.to_string(), id));
        id
    }

    /// Raw name table and the file payloads in FAT order.
    pub fn name_table(&self) -> (Vec<u8>, Vec<Vec<u8>>) {
        let table_len = self.folders.len() * 8;
        let mut subtables = Vec::new();
        let mut entries = Vec::new();
        let mut files: Vec<Vec<u8>> = self.arm9_overlays.clone();

        for (id, folder) in self.folders.iter().enumerate() {
            let entry = FntFolderEntry {
                subtable_offset: (table_len + subtables.len()) as u32,
                first_file_index: files.len() as u16,
                encoded_id: if id == 0 {
                    self.folders.len() as u16
                } else {
                    NTR_FOLDER_TAG | folder.parent
                },
            };
            let mut buf = Vec::new();
            entry.write(&mut Cursor::new(&mut buf)).unwrap();
            entries.extend(buf);

            for item in &folder.entries {
                match item {
                    TestEntry::File(name, data) => {
                        subtables.push(name.len() as u8);
                        subtables.extend_from_slice(name.as_bytes());
                        files.push(data.clone());
                    }
                    TestEntry::Folder(name, child) => {
                        subtables.push(0x80 | name.len() as u8);
                        subtables.extend_from_slice(name.as_bytes());
                        subtables.extend_from_slice(&(NTR_FOLDER_TAG | child).to_le_bytes());
                    }
                }
            }
            subtables.push(0);
        }

        let mut fnt = entries;
        fnt.extend(subtables);
        (fnt, files)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut rom = vec![0u8; NTR_HEADER_SIZE];
        let mut header = blank_header();
        header.title[..4].copy_from_slice(b"TEST");
        header.game_code.copy_from_slice(b"ATSE");
        header.maker_code.copy_from_slice(b"01");

        if !self.arm9.is_empty() {
            header.arm9_offset = append_aligned(&mut rom, &self.arm9, 0x200);
            header.arm9_size = self.arm9.len() as u32;
        }
        if !self.arm7.is_empty() {
            header.arm7_offset = append_aligned(&mut rom, &self.arm7, 0x200);
            header.arm7_size = self.arm7.len() as u32;
        }

        let (fnt, files) = self.name_table();

        if !self.arm9_overlays.is_empty() {
            let mut table = Vec::new();
            for id in 0..self.arm9_overlays.len() as u32 {
                let entry = OverlayEntry {
                    overlay_id: id,
                    ram_address: 0x0200_0000 + id * 0x1000,
                    ram_size: self.arm9_overlays[id as usize].len() as u32,
                    bss_size: 0,
                    static_init_start: 0,
                    static_init_end: 0,
                    file_id: id,
                    flags: 0,
                };
                let mut buf = Vec::new();
                entry.write(&mut Cursor::new(&mut buf)).unwrap();
                table.extend(buf);
            }
            header.arm9_overlay_offset = append_aligned(&mut rom, &table, 4);
            header.arm9_overlay_size = (self.arm9_overlays.len() * NTR_OVERLAY_ENTRY_SIZE) as u32;
        }

        header.fnt_offset = append_aligned(&mut rom, &fnt, 4);
        header.fnt_size = fnt.len() as u32;

        header.fat_offset = append_aligned(&mut rom, &vec![0u8; files.len() * 8], 4);
        header.fat_size = (files.len() * 8) as u32;

        let mut banner = self.banner.clone();
        let mut banner_bytes = Vec::new();
        banner.write(&mut Cursor::new(&mut banner_bytes)).unwrap();
        banner.checksum = banner_crc(&banner_bytes);
        banner_bytes.clear();
        banner.write(&mut Cursor::new(&mut banner_bytes)).unwrap();
        header.banner_offset = append_aligned(&mut rom, &banner_bytes, 0x200);

        let base = self.file_base.max(rom.len().next_multiple_of(0x200));
        rom.resize(base, 0);

        let mut fat = Vec::new();
        // one granule per file so growing within capacity never touches a neighbour
        for data in &files {
            let start = append_aligned(&mut rom, data, NTR_FILE_GRANULE as usize);
            let entry = FatEntry {
                start,
                end: start + data.len() as u32,
            };
            let mut buf = Vec::new();
            entry.write(&mut Cursor::new(&mut buf)).unwrap();
            fat.extend(buf);
        }
        let fat_offset = header.fat_offset as usize;
        rom[fat_offset..fat_offset + fat.len()].copy_from_slice(&fat);

        if !self.debug_rom.is_empty() {
            header.debug_rom_offset =
                append_aligned(&mut rom, &self.debug_rom, NTR_FILE_GRANULE as usize);
            header.debug_rom_size = self.debug_rom.len() as u32;
        }

        let end = rom.len().max(base + 1);
        if self.trimmed {
            rom.resize(end, 0);
        } else {
            rom.resize(end.next_multiple_of(0x400), 0);
        }
        header.rom_size = rom.len() as u32;

        header.logo_checksum = logo_crc(&header.logo);
        write_header(&mut rom, &header);
        header.header_checksum = header_crc(&rom);
        write_header(&mut rom, &header);

        rom
    }
}
