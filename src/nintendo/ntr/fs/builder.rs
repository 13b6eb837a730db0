use crate::nintendo::ntr::constants::{
    NTR_FAT_ENTRY_SIZE, NTR_FILE_GRANULE, NTR_FNT_FOLDER_ENTRY_SIZE, NTR_FOLDER_TAG,
};
use crate::nintendo::ntr::fs::VirtualFileSystem;
use crate::nintendo::ntr::fs::error::{TreeError, TreeResult};
use crate::nintendo::ntr::fs::node::{NodeId, NodeKind, TreeNode};
use crate::nintendo::ntr::models::fnt::{EntryId, FatEntry, FntFolderEntry};
use crate::nintendo::ntr::models::header::NdsHeader;
use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::io::Cursor;

fn corrupt(message: String) -> TreeError {
    TreeError::CorruptIndex(message)
}

/// Bounded reader over the file name table.
struct NameTableReader<'a> {
    cursor: Cursor<&'a [u8]>,
    base: usize,
}

impl<'a> NameTableReader<'a> {
    fn new(table: &'a [u8], base: usize) -> Self {
        Self {
            cursor: Cursor::new(table),
            base,
        }
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn truncated(&self, position: usize, needed: usize) -> TreeError {
        TreeError::TruncatedNameTable {
            position: self.base + position,
            needed,
        }
    }

    fn read_u8(&mut self) -> TreeResult<u8> {
        let position = self.position();
        self.cursor
            .read_u8()
            .map_err(|_| self.truncated(position, 1))
    }

    fn read_u16(&mut self) -> TreeResult<u16> {
        let position = self.position();
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.truncated(position, 2))
    }

    fn read_name(&mut self, len: usize) -> TreeResult<&'a [u8]> {
        let position = self.position();
        let table: &'a [u8] = *self.cursor.get_ref();
        let name = table
            .get(position..position + len)
            .ok_or_else(|| self.truncated(position, len))?;
        self.cursor.set_position((position + len) as u64);
        Ok(name)
    }

    fn read_folder_entry(&mut self) -> TreeResult<FntFolderEntry> {
        let position = self.position();
        FntFolderEntry::read(&mut self.cursor)
            .map_err(|_| self.truncated(position, NTR_FNT_FOLDER_ENTRY_SIZE))
    }
}

struct ScannedFolder<'a> {
    parent: u16,
    name: Option<&'a [u8]>,
    /// Position among the parent's subfolders, in name table order
    ordinal: u16,
    folders: u16,
    files: u16,
}

impl ScannedFolder<'_> {
    fn new(parent: u16) -> Self {
        Self {
            parent,
            name: None,
            ordinal: 0,
            folders: 0,
            files: 0,
        }
    }
}

struct ScannedFile<'a> {
    parent: u16,
    name: &'a [u8],
    ordinal: u16,
    fat_index: u16,
    entry: FatEntry,
}

/// Reads entry `index` of the file allocation table, rejecting ranges outside the ROM.
pub fn fat_entry(rom: &[u8], header: &NdsHeader, index: u32) -> TreeResult<FatEntry> {
    let fat_start = header.fat_offset as usize;
    let fat = rom
        .get(fat_start..fat_start + header.fat_size as usize)
        .ok_or_else(|| corrupt("file allocation table lies outside the ROM".to_string()))?;

    let position = index as usize * NTR_FAT_ENTRY_SIZE;
    let raw = fat
        .get(position..position + NTR_FAT_ENTRY_SIZE)
        .ok_or_else(|| corrupt(format!("file {index} has no allocation table entry")))?;
    let entry = FatEntry::read(&mut Cursor::new(raw))
        .map_err(|err| corrupt(format!("file {index}: {err}")))?;

    if entry.start > entry.end || entry.end as usize > rom.len() {
        return Err(corrupt(format!(
            "file {index} spans [{:#x}, {:#x}) outside the ROM",
            entry.start, entry.end
        )));
    }

    Ok(entry)
}

/// Walks the folder table and the name stream, recording names, parents and child counts.
fn scan<'a>(
    reader: &mut NameTableReader<'a>,
    rom: &[u8],
    header: &NdsHeader,
) -> TreeResult<(Vec<ScannedFolder<'a>>, Vec<ScannedFile<'a>>)> {
    let root = reader.read_folder_entry()?;

    // the root has no parent, so its id field must not carry the folder tag
    if root.encoded_id & NTR_FOLDER_TAG != 0 || root.encoded_id == 0 {
        return Err(TreeError::RootNotFound);
    }

    let folder_count = root.encoded_id;
    let mut folders = Vec::with_capacity(folder_count as usize);
    folders.push(ScannedFolder::new(0));

    for id in 1..folder_count {
        let entry = reader.read_folder_entry()?;
        let parent = match EntryId::decode(entry.encoded_id) {
            EntryId::Folder(parent) if parent < folder_count => parent,
            _ => {
                return Err(corrupt(format!(
                    "folder {id} has invalid parent id {:#06x}",
                    entry.encoded_id
                )));
            }
        };
        folders.push(ScannedFolder::new(parent));
    }

    let mut files = Vec::new();
    let mut owner: u16 = 0;
    let mut fat_index = u32::from(root.first_file_index);

    loop {
        let entry_len = reader.read_u8()?;

        if entry_len == 0 {
            owner += 1;
            if owner == folder_count {
                break;
            }
            continue;
        }

        let name = reader.read_name((entry_len & 0x7F) as usize)?;

        if entry_len & 0x80 != 0 {
            let raw = reader.read_u16()?;
            let child = match EntryId::decode(raw) {
                EntryId::Folder(child) if child != 0 && child < folder_count => child,
                _ => {
                    return Err(corrupt(format!(
                        "subfolder of folder {owner} has invalid id {raw:#06x}"
                    )));
                }
            };

            let parent = folders[child as usize].parent;
            if parent != owner {
                return Err(corrupt(format!(
                    "folder {child} is listed in folder {owner} but belongs to folder {parent}"
                )));
            }
            if folders[child as usize].name.is_some() {
                return Err(corrupt(format!("folder {child} is named twice")));
            }

            let ordinal = folders[owner as usize].folders;
            folders[owner as usize].folders += 1;
            folders[child as usize].name = Some(name);
            folders[child as usize].ordinal = ordinal;
        } else {
            let index = u16::try_from(fat_index)
                .map_err(|_| corrupt(format!("file index {fat_index} exceeds 16 bits")))?;
            let entry = fat_entry(rom, header, fat_index)?;

            let ordinal = folders[owner as usize].files;
            folders[owner as usize].files = ordinal
                .checked_add(1)
                .ok_or_else(|| corrupt(format!("folder {owner} holds too many files")))?;

            files.push(ScannedFile {
                parent: owner,
                name,
                ordinal,
                fat_index: index,
                entry,
            });
            fat_index += 1;
        }
    }

    if let Some(unnamed) = folders.iter().skip(1).position(|folder| folder.name.is_none()) {
        return Err(corrupt(format!(
            "folder {} is never listed by its parent",
            unnamed + 1
        )));
    }

    Ok((folders, files))
}

fn decode_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Reserves the id blocks for a folder's children, starting at `next`.
fn folder_kind(folder: &ScannedFolder, next: &mut NodeId) -> NodeKind {
    let folder_hint = *next;
    let file_hint = folder_hint + folder.folders as usize;
    *next = file_hint + folder.files as usize;

    NodeKind::Folder {
        folder_hint,
        file_hint,
        folder_count: folder.folders,
        file_count: folder.files,
    }
}

/// Id block base and path of a placed parent folder.
fn child_slot(placed: &[Option<TreeNode>], parent: NodeId, folder: bool) -> TreeResult<(NodeId, String)> {
    match placed.get(parent).and_then(Option::as_ref) {
        Some(TreeNode {
            kind:
                NodeKind::Folder {
                    folder_hint,
                    file_hint,
                    ..
                },
            path,
            ..
        }) => Ok((if folder { *folder_hint } else { *file_hint }, path.clone())),
        _ => Err(corrupt(format!("node {parent} is not a placed folder"))),
    }
}

fn insert(placed: &mut [Option<TreeNode>], node: TreeNode) -> TreeResult<()> {
    let id = node.id;
    let slot = placed
        .get_mut(id)
        .ok_or_else(|| corrupt(format!("node id {id} is out of range")))?;
    if slot.is_some() {
        return Err(corrupt(format!("node id {id} is assigned twice")));
    }
    *slot = Some(node);
    Ok(())
}

/// Assigns final ids top-down: each folder's children fill a folder block then a file block.
fn place(
    folders: &[ScannedFolder],
    files: &[ScannedFile],
    fnt_offset: u32,
) -> TreeResult<Vec<TreeNode>> {
    let total = folders.len() + files.len();
    let mut placed: Vec<Option<TreeNode>> = vec![None; total];
    let mut folder_ids: Vec<Option<NodeId>> = vec![None; folders.len()];
    let mut next: NodeId = 1;

    let root_kind = folder_kind(&folders[0], &mut next);
    insert(
        &mut placed,
        TreeNode {
            id: 0,
            parent: None,
            name: String::new(),
            path: String::new(),
            offset: fnt_offset,
            size: 0,
            kind: root_kind,
        },
    )?;
    folder_ids[0] = Some(0);

    for (index, folder) in folders.iter().enumerate().skip(1) {
        let parent = folder_ids[folder.parent as usize].ok_or_else(|| {
            corrupt(format!(
                "folder {index} comes before its parent {}",
                folder.parent
            ))
        })?;
        let (hint, parent_path) = child_slot(&placed, parent, true)?;
        let name = decode_name(folder.name.unwrap_or_default());
        let id = hint + folder.ordinal as usize;

        insert(
            &mut placed,
            TreeNode {
                id,
                parent: Some(parent),
                path: format!("{parent_path}/{name}"),
                name,
                offset: fnt_offset + (index * NTR_FNT_FOLDER_ENTRY_SIZE) as u32,
                size: 0,
                kind: folder_kind(folder, &mut next),
            },
        )?;
        folder_ids[index] = Some(id);
    }

    for file in files {
        let parent = folder_ids[file.parent as usize]
            .ok_or_else(|| corrupt(format!("folder {} was never placed", file.parent)))?;
        let (hint, parent_path) = child_slot(&placed, parent, false)?;
        let name = decode_name(file.name);
        let size = file.entry.size();

        insert(
            &mut placed,
            TreeNode {
                id: hint + file.ordinal as usize,
                parent: Some(parent),
                path: format!("{parent_path}/{name}"),
                name,
                offset: file.entry.start,
                size,
                kind: NodeKind::File {
                    fat_index: file.fat_index,
                    capacity: size.checked_next_multiple_of(NTR_FILE_GRANULE).unwrap_or(size),
                },
            },
        )?;
    }

    placed
        .into_iter()
        .enumerate()
        .map(|(id, node)| node.ok_or_else(|| corrupt(format!("node id {id} was never assigned"))))
        .collect()
}

/// Rebuilds the directory tree from the file name and file allocation tables.
pub fn build(rom: &[u8], header: &NdsHeader) -> TreeResult<VirtualFileSystem> {
    if header.fnt_size == 0 {
        return Err(TreeError::NoFileSystem);
    }

    let fnt_start = header.fnt_offset as usize;
    let fnt = rom
        .get(fnt_start..fnt_start + header.fnt_size as usize)
        .ok_or(TreeError::TruncatedNameTable {
            position: fnt_start,
            needed: header.fnt_size as usize,
        })?;

    let mut reader = NameTableReader::new(fnt, fnt_start);
    let (folders, files) = scan(&mut reader, rom, header)?;
    let nodes = place(&folders, &files, header.fnt_offset)?;

    debug!(
        "Built file system with {} folders and {} files",
        folders.len(),
        files.len()
    );

    Ok(VirtualFileSystem::new(nodes, header.fat_offset))
}
