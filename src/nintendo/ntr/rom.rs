use crate::nintendo::ntr::checksum::ChecksumReport;
use crate::nintendo::ntr::constants::NTR_BANNER_SIZE;
use crate::nintendo::ntr::error::NintendoNTRResult;
use crate::nintendo::ntr::fs::error::VfsResult;
use crate::nintendo::ntr::fs::node::{NodeId, TreeNode};
use crate::nintendo::ntr::fs::{VirtualFileSystem, build};
use crate::nintendo::ntr::header::validate;
use crate::nintendo::ntr::models::banner::NdsBanner;
use crate::nintendo::ntr::models::header::{NdsHeader, RomRegion};
use crate::nintendo::ntr::overlay::{Cpu, Overlay, overlay_table};
use binrw::BinRead;
use log::debug;
use std::io::Cursor;
use std::path::Path;
use tokio::task;

/// An opened ROM: the image, its validated header and the file tree built from it.
///
/// File writes go through the tree into the owned image, keeping the allocation table in sync.
#[derive(Debug, Clone)]
pub struct NtrRom {
    data: Vec<u8>,
    header: NdsHeader,
    fs: VirtualFileSystem,
}

impl NtrRom {
    pub fn from_bytes(data: Vec<u8>) -> NintendoNTRResult<Self> {
        let header = validate(&data)?;
        let fs = build(&data, &header)?;

        Ok(Self { data, header, fs })
    }

    /// Reads and parses a ROM off the async runtime.
    pub async fn open(path: impl AsRef<Path>) -> NintendoNTRResult<Self> {
        let path = path.as_ref();
        debug!("Reading ROM {}", path.display());
        let data = tokio::fs::read(path).await?;

        task::spawn_blocking(move || Self::from_bytes(data)).await?
    }

    pub fn header(&self) -> &NdsHeader {
        &self.header
    }

    pub fn fs(&self) -> &VirtualFileSystem {
        &self.fs
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn banner(&self) -> NintendoNTRResult<Option<NdsBanner>> {
        if !self.header.has_banner() {
            return Ok(None);
        }

        let start = self.header.banner_offset as usize;
        let bytes = self
            .data
            .get(start..start + NTR_BANNER_SIZE)
            .unwrap_or_default();

        Ok(Some(NdsBanner::read(&mut Cursor::new(bytes))?))
    }

    /// Bytes of `region`, empty when the header declares none.
    pub fn region_bytes(&self, region: RomRegion) -> &[u8] {
        let (offset, size) = self.header.region(region);
        let start = offset as usize;
        self.data
            .get(start..start + size as usize)
            .unwrap_or_default()
    }

    pub fn checksums(&self) -> ChecksumReport {
        ChecksumReport::compute(&self.data, &self.header)
    }

    pub fn overlays(&self, cpu: Cpu) -> NintendoNTRResult<Vec<Overlay>> {
        overlay_table(&self.data, &self.header, cpu)
    }

    pub fn lookup(&self, path: &str) -> Option<&TreeNode> {
        self.fs.lookup(path)
    }

    pub fn read_file(&self, id: NodeId) -> VfsResult<Vec<u8>> {
        self.fs.read_to_vec(&self.data, id)
    }

    pub fn magic(&self, id: NodeId) -> Option<[u8; 4]> {
        self.fs.magic(&self.data, id)
    }

    pub fn write_file(&mut self, id: NodeId, data: &[u8], offset: u64) -> VfsResult<()> {
        self.fs.write(&mut self.data, id, data, offset)
    }

    pub fn resize_file(&mut self, id: NodeId, new_size: u32) -> VfsResult<()> {
        self.fs.resize(&mut self.data, id, new_size)
    }
}
