//! Variable-length text store: length-prefixed blobs over fixed-size rows

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::codec::read_u32;
use crate::storage::file::StoreFile;
use crate::storage::text_id_store::{FreeRun, TextIdStore, LENGTH_PREFIX};

/// A stored byte string. `id` is its row address, 0 while unsaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub id: u64,
    /// Length recorded when the text was last saved; sizes the space it owns
    length: u32,
    value: Vec<u8>,
}

impl Text {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self { id: 0, length: 0, value: value.into() }
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.value).map_err(|source| GraphError::DecodeText {
            store: StoreKind::Text,
            id: self.id,
            source,
        })
    }

    pub fn len(&self) -> u32 {
        self.value.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the contents; call `TextStore::save_text` afterwards
    pub fn set_value(&mut self, value: impl Into<Vec<u8>>) {
        self.value = value.into();
    }

    fn data(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(LENGTH_PREFIX as usize + self.value.len());
        bytes.extend_from_slice(&self.len().to_le_bytes());
        bytes.extend_from_slice(&self.value);
        bytes
    }
}

/// Text store. Nothing reaches the file until [`TextStore::write`].
#[derive(Debug)]
pub struct TextStore {
    file: StoreFile,
    ids: TextIdStore,
    pending: BTreeMap<u64, Text>,
}

impl TextStore {
    pub fn create(path: &Path, id_path: &Path, row_size: u32) -> Result<Self> {
        Ok(Self {
            file: StoreFile::create(StoreKind::Text, path)?,
            ids: TextIdStore::create(id_path, row_size)?,
            pending: BTreeMap::new(),
        })
    }

    pub fn open(path: &Path, id_path: &Path, row_size: u32) -> Result<Self> {
        Ok(Self {
            file: StoreFile::open(StoreKind::Text, path)?,
            ids: TextIdStore::open(id_path, row_size)?,
            pending: BTreeMap::new(),
        })
    }

    fn offset(&self, id: u64) -> u64 {
        (id - 1) * self.ids.row_size() as u64
    }

    /// Text at a row address; pending (unflushed) texts are served first
    pub fn find(&self, id: u64) -> Result<Text> {
        assert!(id != 0, "text store: cannot find text with id 0");

        if let Some(text) = self.pending.get(&id) {
            return Ok(text.clone());
        }

        let offset = self.offset(id);
        let mut prefix = [0u8; LENGTH_PREFIX as usize];
        self.file.read_exact_at(offset, &mut prefix, id)?;
        let length = read_u32(StoreKind::Text, "length", &prefix)?;
        if offset + LENGTH_PREFIX as u64 + length as u64 > self.file.len()? {
            return Err(GraphError::ShortRead { store: StoreKind::Text, id });
        }

        let mut value = vec![0u8; length as usize];
        self.file.read_exact_at(offset + LENGTH_PREFIX as u64, &mut value, id)?;

        Ok(Text { id, length, value })
    }

    /// Assign a row address to an unsaved text and queue it for writing
    pub fn add_text(&mut self, text: &mut Text) -> u64 {
        assert!(text.id == 0, "text store: cannot add text that already has an id ({})", text.id);

        text.id = self.ids.next_id(text.len());
        text.length = text.len();
        self.pending.insert(text.id, text.clone());
        text.id
    }

    /// Release the rows a text owns; the text becomes unsaved
    pub fn remove_text(&mut self, text: &mut Text) {
        if text.id == 0 {
            return;
        }

        let rows = self.ids.rows_for(text.length);
        self.ids.add_id(FreeRun::new(text.id, rows));
        self.pending.remove(&text.id);
        text.id = 0;
    }

    /// Queue an updated text. Shrinking keeps the address and frees the
    /// trailing rows; growing relocates it, and the returned address must
    /// be propagated by the caller.
    pub fn save_text(&mut self, text: &mut Text) -> u64 {
        if text.id == 0 {
            return self.add_text(text);
        }

        let old_rows = self.ids.rows_for(text.length);
        let new_rows = self.ids.rows_for(text.len());

        if new_rows > old_rows {
            self.remove_text(text);
            return self.add_text(text);
        }

        if new_rows < old_rows {
            self.ids.add_id(FreeRun::new(text.id + new_rows as u64, old_rows - new_rows));
        }

        text.length = text.len();
        self.pending.insert(text.id, text.clone());
        text.id
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn id_store(&self) -> &TextIdStore {
        &self.ids
    }

    /// Flush pending texts to their rows, then the allocator state
    pub fn write(&mut self) -> Result<()> {
        for (&id, text) in &self.pending {
            self.file.write_at(self.offset(id), &text.data())?;
        }
        self.ids.write()?;

        tracing::debug!(
            "text store: wrote {} texts, {} free runs, next row {}",
            self.pending.len(),
            self.ids.free_runs().len(),
            self.ids.next_row()
        );
        self.pending.clear();
        Ok(())
    }
}
