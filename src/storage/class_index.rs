//! Per-class membership index: a flat list of 4-byte vertex ids

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::codec::read_u32;
use crate::storage::file::StoreFile;

/// Vertices that belong directly to one class
#[derive(Debug)]
pub struct ClassIndex {
    file: StoreFile,
    ids: BTreeSet<u32>,
}

impl ClassIndex {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self { file: StoreFile::create(StoreKind::ClassIndex, path)?, ids: BTreeSet::new() })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let file = StoreFile::open(StoreKind::ClassIndex, path)?;
        let bytes = file.read_all()?;
        if bytes.len() % 4 != 0 {
            return Err(GraphError::Decode {
                store: StoreKind::ClassIndex,
                field: "vertex id",
                expected: 4,
                found: bytes.len() % 4,
            });
        }

        let ids = bytes
            .chunks_exact(4)
            .map(|chunk| read_u32(StoreKind::ClassIndex, "vertex id", chunk))
            .collect::<Result<BTreeSet<u32>>>()?;
        Ok(Self { file, ids })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn contains(&self, vertex: u32) -> bool {
        self.ids.contains(&vertex)
    }

    pub fn insert(&mut self, vertex: u32) {
        self.ids.insert(vertex);
    }

    pub fn remove(&mut self, vertex: u32) {
        self.ids.remove(&vertex);
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn write(&self) -> Result<()> {
        let bytes: Vec<u8> = self.ids.iter().flat_map(|id| id.to_le_bytes()).collect();
        self.file.replace(&bytes)
    }
}
