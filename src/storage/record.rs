//! Generic fixed-size record store with a tracking map
//!
//! Records live at `(id - 1) * SIZE`. The tracking map is both the read
//! cache and the write buffer: whatever it holds for an id wins over the
//! file until the next [`RecordStore::write`].

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;

use crate::error::{Result, StoreKind};
use crate::storage::file::StoreFile;
use crate::storage::id_store::Uint32IdStore;

/// A fixed-size record keyed by a 32-bit id
pub trait Record: Copy + Debug {
    const KIND: StoreKind;
    const ID_KIND: StoreKind;
    const SIZE: usize;

    fn id(&self) -> u32;

    /// Decode from exactly `SIZE` bytes
    fn decode(id: u32, bytes: &[u8]) -> Result<Self>;

    /// Encode into exactly `SIZE` bytes
    fn encode(&self, out: &mut [u8]);

    /// Whether the discriminating field holds the empty sentinel
    fn is_tombstone(&self) -> bool;

    /// The cleared record written in place of a removed one
    fn tombstone(id: u32) -> Self;
}

#[derive(Debug)]
pub struct RecordStore<R: Record> {
    file: StoreFile,
    ids: Uint32IdStore,
    tracked: BTreeMap<u32, R>,
}

impl<R: Record> RecordStore<R> {
    pub fn create(path: &Path, id_path: &Path) -> Result<Self> {
        Ok(Self {
            file: StoreFile::create(R::KIND, path)?,
            ids: Uint32IdStore::create(R::ID_KIND, id_path)?,
            tracked: BTreeMap::new(),
        })
    }

    pub fn open(path: &Path, id_path: &Path) -> Result<Self> {
        Ok(Self {
            file: StoreFile::open(R::KIND, path)?,
            ids: Uint32IdStore::open(R::ID_KIND, id_path)?,
            tracked: BTreeMap::new(),
        })
    }

    fn offset(id: u32) -> u64 {
        (id as u64 - 1) * R::SIZE as u64
    }

    /// Live record by id. Tombstones and never-issued ids are `None`.
    pub fn find(&self, id: u32) -> Result<Option<R>> {
        assert!(id != 0, "{} store: cannot find record with id 0", R::KIND);

        if let Some(record) = self.tracked.get(&id) {
            return Ok((!record.is_tombstone()).then_some(*record));
        }
        if id > self.ids.last_id() {
            return Ok(None);
        }

        let mut bytes = vec![0u8; R::SIZE];
        self.file.read_exact_at(Self::offset(id), &mut bytes, id as u64)?;
        let record = R::decode(id, &bytes)?;
        Ok((!record.is_tombstone()).then_some(record))
    }

    /// Reserve an id for a new record; the caller tracks the record
    pub fn next_id(&mut self) -> Result<u32> {
        self.ids.next_id()
    }

    /// Register the latest state of a record
    pub fn track(&mut self, record: R) {
        assert!(record.id() != 0, "{} store: cannot track record with id 0", R::KIND);
        self.tracked.insert(record.id(), record);
    }

    /// Tombstone a record and recycle its id
    pub fn remove(&mut self, id: u32) {
        self.track(R::tombstone(id));
        self.ids.add_id(id);
    }

    pub fn last_id(&self) -> u32 {
        self.ids.last_id()
    }

    pub fn free_count(&self) -> usize {
        self.ids.free_count()
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Write every tracked record to its slot, then the id allocator
    pub fn write(&mut self) -> Result<()> {
        let mut buf = vec![0u8; R::SIZE];
        for (&id, record) in &self.tracked {
            record.encode(&mut buf);
            self.file.write_at(Self::offset(id), &buf)?;
        }
        self.ids.write()?;

        tracing::debug!(
            "{} store: wrote {} records, last id {}, {} free ids",
            R::KIND,
            self.tracked.len(),
            self.ids.last_id(),
            self.ids.free_count()
        );
        self.tracked.clear();
        Ok(())
    }
}
