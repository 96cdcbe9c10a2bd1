//! Positioned I/O over one store file

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result, StoreKind};

/// A store's backing file. Closed exactly once, when dropped.
#[derive(Debug)]
pub struct StoreFile {
    kind: StoreKind,
    path: PathBuf,
    file: File,
}

impl StoreFile {
    /// Create a new file; fails if it already exists
    pub fn create(kind: StoreKind, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(GraphError::io(kind, "create"))?;

        Ok(Self { kind, path: path.to_path_buf(), file })
    }

    /// Open an existing file for reading and writing
    pub fn open(kind: StoreKind, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(GraphError::io(kind, "open"))?;

        Ok(Self { kind, path: path.to_path_buf(), file })
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata().map_err(GraphError::io(self.kind, "stat"))?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read as many bytes as are available at `offset`, up to `buf.len()`
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut f = &self.file;
        f.seek(SeekFrom::Start(offset)).map_err(GraphError::io(self.kind, "seek"))?;

        let mut filled = 0;
        while filled < buf.len() {
            match f.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(GraphError::io(self.kind, "read")(e)),
            }
        }
        Ok(filled)
    }

    /// Read exactly `buf.len()` bytes; `id` names the record for the short-read error
    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8], id: u64) -> Result<()> {
        if self.read_at(offset, buf)? != buf.len() {
            return Err(GraphError::ShortRead { store: self.kind, id });
        }
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.len()? as usize];
        let n = self.read_at(0, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    pub fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut f = &self.file;
        f.seek(SeekFrom::Start(offset)).map_err(GraphError::io(self.kind, "seek"))?;
        f.write_all(bytes).map_err(GraphError::io(self.kind, "write"))
    }

    /// Truncate and rewrite the whole file
    pub fn replace(&self, bytes: &[u8]) -> Result<()> {
        self.file.set_len(0).map_err(GraphError::io(self.kind, "truncate"))?;
        self.write_at(0, bytes)
    }
}
