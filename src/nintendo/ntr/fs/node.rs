use std::fmt::{Display, Formatter};

/// Dense index of a node, the root is always 0.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Children occupy `[folder_hint, folder_hint + folder_count)` and
    /// `[file_hint, file_hint + file_count)`.
    Folder {
        folder_hint: NodeId,
        file_hint: NodeId,
        folder_count: u16,
        file_count: u16,
    },
    File {
        /// Slot in the file allocation table
        fat_index: u16,

        /// Bytes reserved in the image, the size rounded up to the next granule
        capacity: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,

    /// `parent.path + "/" + name`, the root's path is empty
    pub path: String,

    /// Absolute ROM offset: the folder's table entry for folders, the payload for files
    pub offset: u32,
    pub size: u32,
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_folder_count(&self) -> u16 {
        match self.kind {
            NodeKind::Folder { folder_count, .. } => folder_count,
            NodeKind::File { .. } => 0,
        }
    }

    pub fn child_file_count(&self) -> u16 {
        match self.kind {
            NodeKind::Folder { file_count, .. } => file_count,
            NodeKind::File { .. } => 0,
        }
    }

    /// Writable bytes; folders have none.
    pub fn capacity(&self) -> u32 {
        match self.kind {
            NodeKind::File { capacity, .. } => capacity,
            NodeKind::Folder { .. } => 0,
        }
    }
}

impl Display for TreeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.path)
        }
    }
}
