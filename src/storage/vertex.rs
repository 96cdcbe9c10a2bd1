//! Vertex record: 13 bytes (class u8, first out u32, first in u32, first attribute u32)

use crate::error::{Result, StoreKind};
use crate::storage::codec::Decoder;
use crate::storage::record::{Record, RecordStore};

pub type VertexStore = RecordStore<Vertex>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub id: u32,
    /// Class id; 0 marks a removed vertex
    pub class: u8,
    pub first_out: u32,
    pub first_in: u32,
    pub first_attribute: u32,
}

impl Vertex {
    pub fn new(id: u32, class: u8) -> Self {
        assert!(class != 0, "vertex store: class id 0 is reserved for removed vertices");
        Self { id, class, first_out: 0, first_in: 0, first_attribute: 0 }
    }
}

impl Record for Vertex {
    const KIND: StoreKind = StoreKind::Vertex;
    const ID_KIND: StoreKind = StoreKind::VertexId;
    const SIZE: usize = 13;

    fn id(&self) -> u32 {
        self.id
    }

    fn decode(id: u32, bytes: &[u8]) -> Result<Self> {
        assert_eq!(bytes.len(), Self::SIZE, "vertex store: record must be {} bytes", Self::SIZE);
        let mut d = Decoder::new(StoreKind::Vertex, bytes);
        Ok(Self {
            id,
            class: d.u8("class")?,
            first_out: d.u32("first out")?,
            first_in: d.u32("first in")?,
            first_attribute: d.u32("first attribute")?,
        })
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.class;
        out[1..5].copy_from_slice(&self.first_out.to_le_bytes());
        out[5..9].copy_from_slice(&self.first_in.to_le_bytes());
        out[9..13].copy_from_slice(&self.first_attribute.to_le_bytes());
    }

    fn is_tombstone(&self) -> bool {
        self.class == 0
    }

    fn tombstone(id: u32) -> Self {
        Self { id, class: 0, first_out: 0, first_in: 0, first_attribute: 0 }
    }
}
