use crate::nintendo::ntr::constants::NTR_FAT_ENTRY_SIZE;
use crate::nintendo::ntr::fs::error::{VfsError, VfsResult};
use crate::nintendo::ntr::fs::node::{NodeId, NodeKind, TreeNode};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Range;

pub mod builder;
pub mod error;
pub mod node;

pub use builder::build;

/// Directory tree of a ROM with byte-level access to its files.
///
/// Holds no ROM bytes itself; every I/O call takes the image it was built from.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    nodes: Vec<TreeNode>,
    paths: HashMap<String, NodeId>,
    fat_offset: u32,
}

impl VirtualFileSystem {
    /// Indexes the nodes by path. A name repeated inside one folder resolves to its first node.
    pub(crate) fn new(nodes: Vec<TreeNode>, fat_offset: u32) -> Self {
        let mut paths = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            match paths.entry(node.path.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node.id);
                }
                Entry::Occupied(first) => warn!(
                    "{} shadows node {} with the same path, lookups return the first",
                    node,
                    first.get()
                ),
            }
        }

        Self {
            nodes,
            paths,
            fat_offset,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.first()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Looks a node up by path, with or without the leading slash. `""` and `"/"` are the root.
    pub fn lookup(&self, path: &str) -> Option<&TreeNode> {
        let trimmed = path.trim_end_matches('/');
        let id = if trimmed.is_empty() || trimmed.starts_with('/') {
            self.paths.get(trimmed)
        } else {
            self.paths.get(&format!("/{trimmed}"))
        };

        id.and_then(|&id| self.nodes.get(id))
    }

    /// Direct children of a folder, subfolders first.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> {
        let (folders, files) = match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Folder {
                folder_hint,
                file_hint,
                folder_count,
                file_count,
            }) => (
                *folder_hint..*folder_hint + *folder_count as usize,
                *file_hint..*file_hint + *file_count as usize,
            ),
            _ => (0..0, 0..0),
        };

        let folders = self.nodes.get(folders).unwrap_or_default();
        let files = self.nodes.get(files).unwrap_or_default();
        folders.iter().chain(files)
    }

    pub fn files(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|node| node.is_file())
    }

    fn file(&self, id: NodeId) -> VfsResult<&TreeNode> {
        let node = self.nodes.get(id).ok_or(VfsError::UnknownNode(id))?;
        if node.is_folder() {
            return Err(VfsError::NotAFile(node.to_string()));
        }
        Ok(node)
    }

    /// End of `len` bytes at `offset`, rejected when it passes `limit` or does not fit in a u64.
    fn end_of(offset: u64, len: usize, limit: u64) -> VfsResult<u64> {
        offset
            .checked_add(len as u64)
            .filter(|&end| end <= limit)
            .ok_or(VfsError::OutOfBounds {
                offset,
                size: len as u64,
                limit,
            })
    }

    /// Absolute range of `len` bytes at `offset` inside the file, checked against the image.
    fn span(node: &TreeNode, offset: u64, len: usize, image_len: usize) -> VfsResult<Range<usize>> {
        let image_len = image_len as u64;
        let start = u64::from(node.offset)
            .checked_add(offset)
            .ok_or(VfsError::OutOfBounds {
                offset,
                size: len as u64,
                limit: image_len,
            })?;
        let end = Self::end_of(start, len, image_len)?;
        Ok(start as usize..end as usize)
    }

    /// Position of the end field of a file's allocation table entry.
    fn fat_end_field(&self, fat_index: u16, image_len: usize) -> VfsResult<Range<usize>> {
        let start = self.fat_offset as usize + fat_index as usize * NTR_FAT_ENTRY_SIZE + 4;
        if start + 4 > image_len {
            return Err(VfsError::OutOfBounds {
                offset: start as u64,
                size: 4,
                limit: image_len as u64,
            });
        }
        Ok(start..start + 4)
    }

    /// Fills `buf` from the file starting at `offset`. The whole range must lie within the file.
    pub fn read(&self, rom: &[u8], id: NodeId, buf: &mut [u8], offset: u64) -> VfsResult<()> {
        let node = self.file(id)?;

        Self::end_of(offset, buf.len(), u64::from(node.size))?;
        let span = Self::span(node, offset, buf.len(), rom.len())?;
        buf.copy_from_slice(&rom[span]);
        Ok(())
    }

    pub fn read_to_vec(&self, rom: &[u8], id: NodeId) -> VfsResult<Vec<u8>> {
        let size = self.file(id)?.size as usize;
        let mut buf = vec![0u8; size];
        self.read(rom, id, &mut buf, 0)?;
        Ok(buf)
    }

    /// First four bytes of a file, `None` for folders and files shorter than that.
    pub fn magic(&self, rom: &[u8], id: NodeId) -> Option<[u8; 4]> {
        let mut magic = [0u8; 4];
        self.read(rom, id, &mut magic, 0).ok()?;
        Some(magic)
    }

    /// Writes `data` into the file at `offset`.
    ///
    /// Writing past the current size grows the file, up to its allocated capacity, and
    /// updates the allocation table entry in `rom`. Nothing is modified when this fails.
    pub fn write(&mut self, rom: &mut [u8], id: NodeId, data: &[u8], offset: u64) -> VfsResult<()> {
        let node = self.file(id)?;

        let capacity = node.capacity();
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or(VfsError::OutOfBounds {
                offset,
                size: data.len() as u64,
                limit: u64::from(capacity),
            })?;
        if end > u64::from(capacity) {
            return Err(VfsError::CapacityExceeded {
                requested: end,
                capacity,
            });
        }

        let span = Self::span(node, offset, data.len(), rom.len())?;
        let grows = end > u64::from(node.size);
        let fat_field = match node.kind {
            NodeKind::File { fat_index, .. } if grows => {
                Some(self.fat_end_field(fat_index, rom.len())?)
            }
            _ => None,
        };
        let file_start = node.offset;

        rom[span].copy_from_slice(data);

        if let Some(field) = fat_field {
            // end <= capacity, which fits in u32
            let new_size = end as u32;
            LittleEndian::write_u32(&mut rom[field], file_start + new_size);
            self.nodes[id].size = new_size;
            debug!("Grew {} to {new_size} bytes", self.nodes[id]);
        }

        Ok(())
    }

    /// Changes the logical size of a file without moving it.
    ///
    /// Shrinking always succeeds. Growing stays within the granule already allocated to the file
    /// and within the image, which may end before that granule does.
    pub fn resize(&mut self, rom: &mut [u8], id: NodeId, new_size: u32) -> VfsResult<()> {
        let node = self.file(id)?;

        let capacity = node.capacity();
        if new_size > capacity {
            return Err(VfsError::CapacityExceeded {
                requested: u64::from(new_size),
                capacity,
            });
        }

        let NodeKind::File { fat_index, .. } = node.kind else {
            return Err(VfsError::NotAFile(node.to_string()));
        };
        if new_size > node.size {
            Self::span(node, 0, new_size as usize, rom.len())?;
        }
        let field = self.fat_end_field(fat_index, rom.len())?;
        let end = node.offset + new_size;

        LittleEndian::write_u32(&mut rom[field], end);
        self.nodes[id].size = new_size;
        debug!("Resized {} to {new_size} bytes", self.nodes[id]);

        Ok(())
    }
}
