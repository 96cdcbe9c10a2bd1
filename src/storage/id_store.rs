//! Recyclable id allocators (16-bit for labels, 32-bit for records)
//!
//! File layout: `lastId` followed by every free id, all little-endian.
//! Freed ids are handed out again oldest-first (FIFO) before `lastId` advances.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::path::Path;

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::file::StoreFile;

/// An integer id width usable by [`IdStore`]
pub trait RecyclableId: Copy + Eq + Ord + Debug {
    const WIDTH: usize;
    const ZERO: Self;

    fn checked_next(self) -> Option<Self>;
    fn encode(self, out: &mut Vec<u8>);
    fn decode(store: StoreKind, bytes: &[u8]) -> Result<Self>;
}

macro_rules! recyclable_id {
    ($ty:ty, $read:path) => {
        impl RecyclableId for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const ZERO: Self = 0;

            fn checked_next(self) -> Option<Self> {
                self.checked_add(1)
            }

            fn encode(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn decode(store: StoreKind, bytes: &[u8]) -> Result<Self> {
                $read(store, "id", bytes)
            }
        }
    };
}

recyclable_id!(u16, crate::storage::codec::read_u16);
recyclable_id!(u32, crate::storage::codec::read_u32);

pub type Uint16IdStore = IdStore<u16>;
pub type Uint32IdStore = IdStore<u32>;

/// Hands out unique ids, recycling freed ones
#[derive(Debug)]
pub struct IdStore<T: RecyclableId> {
    file: StoreFile,
    last_id: T,
    free: VecDeque<T>,
}

impl<T: RecyclableId> IdStore<T> {
    /// Create a new allocator file with `lastId = 0`
    pub fn create(kind: StoreKind, path: &Path) -> Result<Self> {
        let store = Self {
            file: StoreFile::create(kind, path)?,
            last_id: T::ZERO,
            free: VecDeque::new(),
        };
        store.write()?;
        Ok(store)
    }

    /// Load an existing allocator file
    pub fn open(kind: StoreKind, path: &Path) -> Result<Self> {
        let file = StoreFile::open(kind, path)?;
        let bytes = file.read_all()?;

        if bytes.len() < T::WIDTH {
            return Err(GraphError::Decode {
                store: kind,
                field: "lastId",
                expected: T::WIDTH,
                found: bytes.len(),
            });
        }

        let last_id = T::decode(kind, &bytes[..T::WIDTH])?;
        let rest = &bytes[T::WIDTH..];
        if rest.len() % T::WIDTH != 0 {
            return Err(GraphError::Decode {
                store: kind,
                field: "free id",
                expected: T::WIDTH,
                found: rest.len() % T::WIDTH,
            });
        }

        let free = rest
            .chunks_exact(T::WIDTH)
            .map(|chunk| T::decode(kind, chunk))
            .collect::<Result<VecDeque<T>>>()?;

        Ok(Self { file, last_id, free })
    }

    /// Next id: oldest freed id if any, otherwise `lastId + 1`
    pub fn next_id(&mut self) -> Result<T> {
        if let Some(id) = self.free.pop_front() {
            return Ok(id);
        }

        self.last_id = self
            .last_id
            .checked_next()
            .ok_or(GraphError::IdSpaceExhausted { store: self.file.kind() })?;
        Ok(self.last_id)
    }

    /// Return an id to the pool. Adding the same id twice corrupts the pool.
    pub fn add_id(&mut self, id: T) {
        assert!(id != T::ZERO, "{} store: cannot free id 0", self.file.kind());
        self.free.push_back(id);
    }

    pub fn last_id(&self) -> T {
        self.last_id
    }

    pub fn free_ids(&self) -> impl Iterator<Item = T> + '_ {
        self.free.iter().copied()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Truncate and rewrite `lastId` and the free list
    pub fn write(&self) -> Result<()> {
        let mut bytes = Vec::with_capacity(T::WIDTH * (1 + self.free.len()));
        self.last_id.encode(&mut bytes);
        for &id in &self.free {
            id.encode(&mut bytes);
        }
        self.file.replace(&bytes)
    }
}
