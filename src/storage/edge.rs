//! Edge record: 22 bytes (label u16, from u32, to u32, out next u32,
//! in next u32, first attribute u32)

use crate::error::{Result, StoreKind};
use crate::storage::codec::Decoder;
use crate::storage::record::{Record, RecordStore};

pub type EdgeStore = RecordStore<Edge>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: u32,
    /// Label id; 0 marks a removed edge
    pub label: u16,
    pub from: u32,
    pub to: u32,
    /// Next edge in `from`'s outbound list
    pub out_next: u32,
    /// Next edge in `to`'s inbound list
    pub in_next: u32,
    pub first_attribute: u32,
}

impl Edge {
    pub fn new(id: u32, label: u16, from: u32, to: u32) -> Self {
        Self { id, label, from, to, out_next: 0, in_next: 0, first_attribute: 0 }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl Record for Edge {
    const KIND: StoreKind = StoreKind::Edge;
    const ID_KIND: StoreKind = StoreKind::EdgeId;
    const SIZE: usize = 22;

    fn id(&self) -> u32 {
        self.id
    }

    fn decode(id: u32, bytes: &[u8]) -> Result<Self> {
        assert_eq!(bytes.len(), Self::SIZE, "edge store: record must be {} bytes", Self::SIZE);
        let mut d = Decoder::new(StoreKind::Edge, bytes);
        Ok(Self {
            id,
            label: d.u16("label")?,
            from: d.u32("from")?,
            to: d.u32("to")?,
            out_next: d.u32("out next")?,
            in_next: d.u32("in next")?,
            first_attribute: d.u32("first attribute")?,
        })
    }

    fn encode(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.label.to_le_bytes());
        out[2..6].copy_from_slice(&self.from.to_le_bytes());
        out[6..10].copy_from_slice(&self.to.to_le_bytes());
        out[10..14].copy_from_slice(&self.out_next.to_le_bytes());
        out[14..18].copy_from_slice(&self.in_next.to_le_bytes());
        out[18..22].copy_from_slice(&self.first_attribute.to_le_bytes());
    }

    fn is_tombstone(&self) -> bool {
        self.label == 0
    }

    fn tombstone(id: u32) -> Self {
        Self::new(id, 0, 0, 0)
    }
}
