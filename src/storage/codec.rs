//! Fixed-width little-endian codec shared by every store

use crate::error::{GraphError, Result, StoreKind};

macro_rules! read_le {
    ($name:ident, $ty:ty) => {
        /// Decode a little-endian value; the slice must be exactly the field width
        pub fn $name(store: StoreKind, field: &'static str, bytes: &[u8]) -> Result<$ty> {
            let arr: [u8; std::mem::size_of::<$ty>()] =
                bytes.try_into().map_err(|_| GraphError::Decode {
                    store,
                    field,
                    expected: std::mem::size_of::<$ty>(),
                    found: bytes.len(),
                })?;
            Ok(<$ty>::from_le_bytes(arr))
        }
    };
}

read_le!(read_u16, u16);
read_le!(read_u32, u32);
read_le!(read_u64, u64);

pub fn read_f64(store: StoreKind, field: &'static str, bytes: &[u8]) -> Result<f64> {
    read_u64(store, field, bytes).map(f64::from_bits)
}

pub fn f64_to_bytes(value: f64) -> [u8; 8] {
    value.to_bits().to_le_bytes()
}

/// Sequential reader over one fixed-size record
pub struct Decoder<'a> {
    store: StoreKind,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(store: StoreKind, bytes: &'a [u8]) -> Self {
        Self { store, bytes, pos: 0 }
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        if end > self.bytes.len() {
            return Err(GraphError::Decode {
                store: self.store,
                field,
                expected: len,
                found: self.bytes.len().saturating_sub(self.pos),
            });
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.take(field, 1)?[0])
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16> {
        let bytes = self.take(field, 2)?;
        read_u16(self.store, field, bytes)
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32> {
        let bytes = self.take(field, 4)?;
        read_u32(self.store, field, bytes)
    }

    pub fn u64(&mut self, field: &'static str) -> Result<u64> {
        let bytes = self.take(field, 8)?;
        read_u64(self.store, field, bytes)
    }

    pub fn array8(&mut self, field: &'static str) -> Result<[u8; 8]> {
        let bytes = self.take(field, 8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
