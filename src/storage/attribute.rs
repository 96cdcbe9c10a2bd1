//! Attribute record: 15 bytes (label u16, type u8, data [u8; 8], next u32)
//!
//! Attributes form a singly linked list per owner through `next`. Scalar
//! values live inline in `data`; text values hold the row address of their
//! string in the text store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::codec::{f64_to_bytes, read_f64, read_u32, read_u64, Decoder};
use crate::storage::record::{Record, RecordStore};
use crate::storage::text_store::TextStore;

pub type AttributeStore = RecordStore<Attribute>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValueType {
    Empty = 0,
    Integer = 1,
    Real = 2,
    Boolean = 3,
    Text = 4,
    List = 5,
    Map = 6,
}

impl ValueType {
    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => ValueType::Empty,
            1 => ValueType::Integer,
            2 => ValueType::Real,
            3 => ValueType::Boolean,
            4 => ValueType::Text,
            5 => ValueType::List,
            6 => ValueType::Map,
            other => {
                return Err(GraphError::InvalidValue {
                    store: StoreKind::Attribute,
                    field: "type tag",
                    value: other as u64,
                })
            }
        })
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A decoded attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
    /// Reference into the list store
    List(u32),
    /// Reference into the map store
    Map(u32),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Real(_) => ValueType::Real,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Text(_) => ValueType::Text,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
        }
    }

    /// The 8 data bytes for values stored inline; `None` for text
    pub fn inline_data(&self) -> Option<[u8; 8]> {
        match self {
            Value::Integer(n) => Some(n.to_le_bytes()),
            Value::Real(x) => Some(f64_to_bytes(*x)),
            Value::Boolean(b) => Some((*b as u64).to_le_bytes()),
            Value::List(id) | Value::Map(id) => Some((*id as u64).to_le_bytes()),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::List(id) => write!(f, "list#{id}"),
            Value::Map(id) => write!(f, "map#{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub id: u32,
    /// Label id of the key
    pub label: u16,
    pub value_type: ValueType,
    pub data: [u8; 8],
    pub next: u32,
}

impl Attribute {
    pub fn new(id: u32, label: u16, value_type: ValueType, data: [u8; 8]) -> Self {
        Self { id, label, value_type, data, next: 0 }
    }

    /// Row address of the backing string, for text attributes
    pub fn text_address(&self) -> Option<u64> {
        match self.value_type {
            ValueType::Text => Some(u64::from_le_bytes(self.data)),
            _ => None,
        }
    }

    pub fn value(&self, texts: &TextStore) -> Result<Value> {
        let store = StoreKind::Attribute;
        Ok(match self.value_type {
            ValueType::Integer => Value::Integer(read_u64(store, "data", &self.data)? as i64),
            ValueType::Real => Value::Real(read_f64(store, "data", &self.data)?),
            ValueType::Boolean => Value::Boolean(read_u64(store, "data", &self.data)? != 0),
            ValueType::Text => {
                let text = texts.find(u64::from_le_bytes(self.data))?;
                Value::Text(text.as_str()?.to_string())
            }
            ValueType::List => Value::List(read_u32(store, "data", &self.data[..4])?),
            ValueType::Map => Value::Map(read_u32(store, "data", &self.data[..4])?),
            ValueType::Empty => {
                return Err(GraphError::InvalidValue { store, field: "empty attribute", value: self.id as u64 })
            }
        })
    }
}

impl Record for Attribute {
    const KIND: StoreKind = StoreKind::Attribute;
    const ID_KIND: StoreKind = StoreKind::AttributeId;
    const SIZE: usize = 15;

    fn id(&self) -> u32 {
        self.id
    }

    fn decode(id: u32, bytes: &[u8]) -> Result<Self> {
        assert_eq!(bytes.len(), Self::SIZE, "attribute store: record must be {} bytes", Self::SIZE);
        let mut d = Decoder::new(StoreKind::Attribute, bytes);
        Ok(Self {
            id,
            label: d.u16("label")?,
            value_type: ValueType::from_tag(d.u8("type")?)?,
            data: d.array8("data")?,
            next: d.u32("next")?,
        })
    }

    fn encode(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.label.to_le_bytes());
        out[2] = self.value_type.tag();
        out[3..11].copy_from_slice(&self.data);
        out[11..15].copy_from_slice(&self.next.to_le_bytes());
    }

    fn is_tombstone(&self) -> bool {
        self.value_type == ValueType::Empty
    }

    fn tombstone(id: u32) -> Self {
        Self::new(id, 0, ValueType::Empty, [0; 8])
    }
}
