//! Class store: a single-inheritance class tree in 9-byte records
//!
//! Record layout: count u32, label u16, super u8, first sub u8, next sibling u8.
//! The whole table is loaded at open and rewritten on every write.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::class_index::ClassIndex;
use crate::storage::codec::Decoder;
use crate::storage::file::StoreFile;

pub const CLASS_RECORD_SIZE: usize = 9;

/// Highest class id an 8-bit reference can hold
pub const MAX_CLASSES: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Class {
    pub id: u8,
    /// Vertices belonging directly to this class
    pub count: u32,
    /// Label id of the class name; 0 marks a free slot
    pub label: u16,
    pub super_class: u8,
    pub first_sub: u8,
    pub next_sibling: u8,
}

impl Class {
    fn decode(id: u8, bytes: &[u8]) -> Result<Self> {
        assert_eq!(bytes.len(), CLASS_RECORD_SIZE, "class store: record must be {} bytes", CLASS_RECORD_SIZE);
        let mut d = Decoder::new(StoreKind::Class, bytes);
        Ok(Self {
            id,
            count: d.u32("count")?,
            label: d.u16("label")?,
            super_class: d.u8("super")?,
            first_sub: d.u8("sub")?,
            next_sibling: d.u8("next sibling")?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.label.to_le_bytes());
        out.extend_from_slice(&[self.super_class, self.first_sub, self.next_sibling]);
    }

    pub fn is_tombstone(&self) -> bool {
        self.label == 0
    }
}

#[derive(Debug)]
pub struct ClassStore {
    file: StoreFile,
    index_dir: PathBuf,
    extension: String,
    /// Slot `id - 1` holds class `id`
    classes: Vec<Class>,
    /// Membership indexes opened so far
    indexes: HashMap<u8, ClassIndex>,
}

impl ClassStore {
    pub fn create(path: &Path, index_dir: &Path, extension: &str) -> Result<Self> {
        let file = StoreFile::create(StoreKind::Class, path)?;
        std::fs::create_dir_all(index_dir).map_err(GraphError::io(StoreKind::ClassIndex, "create dir"))?;
        Ok(Self {
            file,
            index_dir: index_dir.to_path_buf(),
            extension: extension.to_string(),
            classes: Vec::new(),
            indexes: HashMap::new(),
        })
    }

    pub fn open(path: &Path, index_dir: &Path, extension: &str) -> Result<Self> {
        let file = StoreFile::open(StoreKind::Class, path)?;
        let bytes = file.read_all()?;
        if bytes.len() % CLASS_RECORD_SIZE != 0 {
            return Err(GraphError::Decode {
                store: StoreKind::Class,
                field: "class record",
                expected: CLASS_RECORD_SIZE,
                found: bytes.len() % CLASS_RECORD_SIZE,
            });
        }
        if bytes.len() / CLASS_RECORD_SIZE > MAX_CLASSES {
            return Err(GraphError::ClassLimit(MAX_CLASSES));
        }

        let classes = bytes
            .chunks_exact(CLASS_RECORD_SIZE)
            .enumerate()
            .map(|(i, chunk)| Class::decode(i as u8 + 1, chunk))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            file,
            index_dir: index_dir.to_path_buf(),
            extension: extension.to_string(),
            classes,
            indexes: HashMap::new(),
        })
    }

    /// Live class by id; 0 and free slots are `None`
    pub fn find(&self, id: u8) -> Option<Class> {
        if id == 0 {
            return None;
        }
        self.classes.get(id as usize - 1).copied().filter(|c| !c.is_tombstone())
    }

    pub fn find_by_label(&self, label: u16) -> Option<Class> {
        assert!(label != 0, "class store: cannot look up label id 0");
        self.classes.iter().copied().find(|c| c.label == label)
    }

    pub fn classes(&self) -> impl Iterator<Item = Class> + '_ {
        self.classes.iter().copied().filter(|c| !c.is_tombstone())
    }

    fn slot(&mut self, id: u8) -> &mut Class {
        assert!(id != 0, "class store: class id 0 is reserved");
        &mut self.classes[id as usize - 1]
    }

    fn next_id(&self) -> Result<u8> {
        if let Some(free) = self.classes.iter().find(|c| c.is_tombstone()) {
            return Ok(free.id);
        }
        if self.classes.len() >= MAX_CLASSES {
            return Err(GraphError::ClassLimit(MAX_CLASSES));
        }
        Ok(self.classes.len() as u8 + 1)
    }

    /// Insert a class at the head of its super-class's sub-class chain
    pub fn add_class(&mut self, label: u16, super_class: Option<u8>) -> Result<Class> {
        let id = self.next_id()?;
        let mut class = Class { id, count: 0, label, super_class: 0, first_sub: 0, next_sibling: 0 };

        if let Some(super_id) = super_class {
            let parent = self.slot(super_id);
            class.super_class = super_id;
            class.next_sibling = parent.first_sub;
            parent.first_sub = id;
        }

        if id as usize > self.classes.len() {
            self.classes.push(class);
        } else {
            *self.slot(id) = class;
        }
        Ok(class)
    }

    /// Unlink a class from its parent's chain and free its slot. The caller
    /// checks that it has no vertices and no sub-classes.
    pub fn remove_class(&mut self, id: u8) {
        let class = *self.slot(id);

        if class.super_class != 0 {
            let parent = *self.slot(class.super_class);
            if parent.first_sub == id {
                self.slot(class.super_class).first_sub = class.next_sibling;
            } else {
                let mut current = parent.first_sub;
                while current != 0 {
                    let sibling = self.slot(current);
                    if sibling.next_sibling == id {
                        sibling.next_sibling = class.next_sibling;
                        break;
                    }
                    current = sibling.next_sibling;
                }
            }
        }

        *self.slot(id) = Class { id, count: 0, label: 0, super_class: 0, first_sub: 0, next_sibling: 0 };
        self.indexes.remove(&id);
    }

    /// Direct sub-classes, most recently added first
    pub fn sub_classes(&self, id: u8) -> Vec<u8> {
        let mut out = Vec::new();
        let mut current = self.find(id).map(|c| c.first_sub).unwrap_or(0);
        while let Some(class) = self.find(current) {
            out.push(class.id);
            current = class.next_sibling;
        }
        out
    }

    pub fn adjust_count(&mut self, id: u8, delta: i64) {
        let class = self.slot(id);
        class.count = (class.count as i64 + delta).max(0) as u32;
    }

    pub fn index_path(&self, name: &str) -> PathBuf {
        self.index_dir.join(format!("{}.idx.{}", name, self.extension))
    }

    /// Membership index of a class, opened (or created) on first use
    pub fn index(&mut self, id: u8, name: &str) -> Result<&mut ClassIndex> {
        let path = self.index_path(name);
        match self.indexes.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let index = if path.exists() { ClassIndex::open(&path)? } else { ClassIndex::create(&path)? };
                Ok(entry.insert(index))
            }
        }
    }

    /// Close a class's index so the next access reopens it by path
    pub fn release_index(&mut self, id: u8) -> Result<()> {
        if let Some(index) = self.indexes.remove(&id) {
            index.write()?;
        }
        Ok(())
    }

    /// Rewrite the class table, then every open membership index
    pub fn write(&self) -> Result<()> {
        let mut bytes = Vec::with_capacity(self.classes.len() * CLASS_RECORD_SIZE);
        for class in &self.classes {
            class.encode(&mut bytes);
        }
        self.file.replace(&bytes)?;

        for index in self.indexes.values() {
            index.write()?;
        }

        tracing::debug!(
            "class store: wrote {} classes, {} indexes",
            self.classes.len(),
            self.indexes.len()
        );
        Ok(())
    }
}
