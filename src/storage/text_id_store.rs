//! Row-range allocator for the text store
//!
//! File layout: 8-byte next-row cursor, then 12-byte free runs
//! (8-byte start row, 4-byte row count). Row addresses start at 1.

use std::path::Path;

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::codec::Decoder;
use crate::storage::file::StoreFile;

/// Bytes reserved in front of every stored text for its length
pub const LENGTH_PREFIX: u32 = 4;

/// On-disk size of one free run descriptor
pub const FREE_RUN_SIZE: usize = 12;

/// Rows needed to hold a text of `len` bytes plus its length prefix
pub fn rows_for(len: u32, row_size: u32) -> u32 {
    (len as u64 + LENGTH_PREFIX as u64).div_ceil(row_size as u64) as u32
}

/// Contiguous unused rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRun {
    pub start: u64,
    pub rows: u32,
}

impl FreeRun {
    pub fn new(start: u64, rows: u32) -> Self {
        Self { start, rows }
    }

    pub fn contains(&self, row: u64) -> bool {
        row >= self.start && row < self.start + self.rows as u64
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.rows.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        assert_eq!(bytes.len(), FREE_RUN_SIZE, "text.id store: free run must be {} bytes", FREE_RUN_SIZE);
        let mut d = Decoder::new(StoreKind::TextId, bytes);
        Ok(Self {
            start: d.u64("run start")?,
            rows: d.u32("run rows")?,
        })
    }
}

/// First-fit slab allocator over free row runs. Runs are never coalesced.
#[derive(Debug)]
pub struct TextIdStore {
    file: StoreFile,
    row_size: u32,
    next: u64,
    runs: Vec<FreeRun>,
}

impl TextIdStore {
    pub fn create(path: &Path, row_size: u32) -> Result<Self> {
        let store = Self {
            file: StoreFile::create(StoreKind::TextId, path)?,
            row_size,
            next: 1,
            runs: Vec::new(),
        };
        store.write()?;
        Ok(store)
    }

    pub fn open(path: &Path, row_size: u32) -> Result<Self> {
        let file = StoreFile::open(StoreKind::TextId, path)?;
        let bytes = file.read_all()?;

        let mut d = Decoder::new(StoreKind::TextId, &bytes);
        let next = d.u64("next row")?;

        let rest = &bytes[8..];
        if rest.len() % FREE_RUN_SIZE != 0 {
            return Err(GraphError::Decode {
                store: StoreKind::TextId,
                field: "free run",
                expected: FREE_RUN_SIZE,
                found: rest.len() % FREE_RUN_SIZE,
            });
        }
        let runs = rest
            .chunks_exact(FREE_RUN_SIZE)
            .map(FreeRun::decode)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { file, row_size, next, runs })
    }

    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    pub fn rows_for(&self, len: u32) -> u32 {
        rows_for(len, self.row_size)
    }

    /// Address for a text of `len` bytes: front of the first run that fits,
    /// otherwise the end-of-file cursor
    pub fn next_id(&mut self, len: u32) -> u64 {
        let needed = self.rows_for(len);

        if let Some(pos) = self.runs.iter().position(|run| run.rows >= needed) {
            let run = &mut self.runs[pos];
            let addr = run.start;
            run.start += needed as u64;
            run.rows -= needed;
            if run.rows == 0 {
                self.runs.remove(pos);
            }
            return addr;
        }

        let addr = self.next;
        self.next += needed as u64;
        addr
    }

    /// Give a run back for reuse
    pub fn add_id(&mut self, run: FreeRun) {
        assert!(run.start != 0, "text.id store: cannot free row 0");
        if run.rows > 0 {
            self.runs.push(run);
        }
    }

    pub fn next_row(&self) -> u64 {
        self.next
    }

    pub fn free_runs(&self) -> &[FreeRun] {
        &self.runs
    }

    pub fn write(&self) -> Result<()> {
        let mut bytes = Vec::with_capacity(8 + FREE_RUN_SIZE * self.runs.len());
        bytes.extend_from_slice(&self.next.to_le_bytes());
        for run in &self.runs {
            run.encode(&mut bytes);
        }
        self.file.replace(&bytes)
    }
}
