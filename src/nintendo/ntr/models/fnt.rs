use crate::nintendo::ntr::constants::{NTR_FOLDER_ID_MASK, NTR_FOLDER_TAG};
use binrw::{BinRead, BinWrite};

/// Folder entry of the file name table main table.
///
/// For the root entry `encoded_id` holds the total folder count instead of a parent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct FntFolderEntry {
    /// Offset of the folder's name subtable, relative to the start of the table
    pub subtable_offset: u32,

    /// File id of the first file in the folder
    pub first_file_index: u16,

    /// Encoded parent folder id
    pub encoded_id: u16,
}

/// One file's byte range in the ROM, indexed by file id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct FatEntry {
    pub start: u32,
    pub end: u32,
}

impl FatEntry {
    pub fn size(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// Decoded form of the ids stored in the name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId {
    Folder(u16),
    File(u16),
}

impl EntryId {
    pub fn decode(raw: u16) -> Self {
        if raw & NTR_FOLDER_TAG == NTR_FOLDER_TAG {
            EntryId::Folder(raw & NTR_FOLDER_ID_MASK)
        } else {
            EntryId::File(raw)
        }
    }

    pub fn encode(self) -> u16 {
        match self {
            EntryId::Folder(id) => NTR_FOLDER_TAG | (id & NTR_FOLDER_ID_MASK),
            EntryId::File(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_ids_carry_the_tag_nibble() {
        assert_eq!(EntryId::decode(0xF000), EntryId::Folder(0));
        assert_eq!(EntryId::decode(0xF123), EntryId::Folder(0x123));
        assert_eq!(EntryId::Folder(7).encode(), 0xF007);
    }

    #[test]
    fn untagged_ids_are_files() {
        assert_eq!(EntryId::decode(0x0042), EntryId::File(0x42));
        // only a full 0xF nibble marks a folder
        assert_eq!(EntryId::decode(0x8001), EntryId::File(0x8001));
    }

    #[test]
    fn fat_entry_size() {
        assert_eq!(FatEntry { start: 0x1000, end: 0x1004 }.size(), 4);
        assert_eq!(FatEntry { start: 0x10, end: 0x8 }.size(), 0);
    }
}
