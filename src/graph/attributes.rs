//! Attribute lists shared by vertices and edges
//!
//! Each owner anchors a singly linked list of attributes at its
//! `first_attribute`. New attributes are pushed at the head; the key map
//! (key string -> attribute id) is built from the list on first use and
//! kept in step by every mutation below.

use std::collections::HashMap;

use super::engine::Graph;
use crate::error::{GraphError, Result, StoreKind};
use crate::storage::{Attribute, Edge, Record, RecordStore, Text, Value, Vertex};

/// A record that anchors an attribute list
pub trait Attributable: Record {
    fn first_attribute(&self) -> u32;
    fn set_first_attribute(&mut self, id: u32);
}

impl Attributable for Vertex {
    fn first_attribute(&self) -> u32 {
        self.first_attribute
    }

    fn set_first_attribute(&mut self, id: u32) {
        self.first_attribute = id;
    }
}

impl Attributable for Edge {
    fn first_attribute(&self) -> u32 {
        self.first_attribute
    }

    fn set_first_attribute(&mut self, id: u32) {
        self.first_attribute = id;
    }
}

/// The vertex or edge an attribute belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Vertex(u32),
    Edge(u32),
}

fn head_of<R: Attributable>(store: &RecordStore<R>, id: u32) -> Result<Option<u32>> {
    Ok(store.find(id)?.map(|r| r.first_attribute()))
}

fn set_head_of<R: Attributable>(store: &mut RecordStore<R>, id: u32, head: u32) -> Result<bool> {
    match store.find(id)? {
        Some(mut record) => {
            record.set_first_attribute(head);
            store.track(record);
            Ok(true)
        }
        None => Ok(false),
    }
}

impl Graph {
    fn attribute_head(&self, owner: Owner) -> Result<u32> {
        match owner {
            Owner::Vertex(id) => head_of(&self.vertices, id)?.ok_or(GraphError::VertexNotFound(id)),
            Owner::Edge(id) => head_of(&self.edges, id)?.ok_or(GraphError::EdgeNotFound(id)),
        }
    }

    fn set_attribute_head(&mut self, owner: Owner, head: u32) -> Result<()> {
        let found = match owner {
            Owner::Vertex(id) => set_head_of(&mut self.vertices, id, head)?,
            Owner::Edge(id) => set_head_of(&mut self.edges, id, head)?,
        };
        if found {
            return Ok(());
        }
        Err(match owner {
            Owner::Vertex(id) => GraphError::VertexNotFound(id),
            Owner::Edge(id) => GraphError::EdgeNotFound(id),
        })
    }

    fn require_attribute(&self, id: u32) -> Result<Attribute> {
        self.attributes.find(id)?.ok_or(GraphError::InvalidValue {
            store: StoreKind::Attribute,
            field: "attribute link",
            value: id as u64,
        })
    }

    /// Attribute ids in list order, walking the `next` links
    pub fn attribute_chain(&self, owner: Owner) -> Result<Vec<u32>> {
        let mut out = Vec::new();
        let mut current = self.attribute_head(owner)?;
        while current != 0 {
            out.push(current);
            current = self.require_attribute(current)?.next;
        }
        Ok(out)
    }

    /// Key -> attribute id map for an owner
    pub fn attributes(&mut self, owner: Owner) -> Result<&HashMap<String, u32>> {
        Ok(&*self.attribute_map_mut(owner)?)
    }

    fn attribute_map_mut(&mut self, owner: Owner) -> Result<&mut HashMap<String, u32>> {
        if !self.attribute_maps.contains_key(&owner) {
            let mut map = HashMap::new();
            for id in self.attribute_chain(owner)? {
                let attr = self.require_attribute(id)?;
                map.insert(self.labels.value(attr.label, &self.texts)?, id);
            }
            self.attribute_maps.insert(owner, map);
        }
        Ok(self.attribute_maps.entry(owner).or_default())
    }

    /// Value stored under `key`, if any
    pub fn attribute(&mut self, owner: Owner, key: &str) -> Result<Option<Value>> {
        let Some(&id) = self.attribute_map_mut(owner)?.get(key) else {
            return Ok(None);
        };
        let attr = self.require_attribute(id)?;
        Ok(Some(attr.value(&self.texts)?))
    }

    /// Set `key` on an owner, overwriting an existing value in place
    pub fn set_attribute(&mut self, owner: Owner, key: &str, value: Value) -> Result<Attribute> {
        let existing = self.attribute_map_mut(owner)?.get(key).copied();

        let data = match &value {
            Value::Text(s) => {
                let mut text = Text::new(s.as_str());
                self.texts.add_text(&mut text).to_le_bytes()
            }
            inline => inline.inline_data().unwrap_or_default(),
        };

        if let Some(id) = existing {
            let mut attr = self.require_attribute(id)?;
            self.release_text(&attr)?;
            attr.value_type = value.value_type();
            attr.data = data;
            self.attributes.track(attr);
            return Ok(attr);
        }

        let label = self.labels.add_label(key, &mut self.texts)?;
        let mut attr = Attribute::new(self.attributes.next_id()?, label, value.value_type(), data);
        attr.next = self.attribute_head(owner)?;
        self.set_attribute_head(owner, attr.id)?;
        self.attributes.track(attr);
        self.attribute_map_mut(owner)?.insert(key.to_string(), attr.id);
        Ok(attr)
    }

    /// Unlink one attribute from its owner's list. Returns false if the
    /// owner has no such attribute.
    pub fn remove_attribute(&mut self, owner: Owner, id: u32) -> Result<bool> {
        let map = self.attribute_map_mut(owner)?;
        let Some(key) = map.iter().find(|(_, &v)| v == id).map(|(k, _)| k.clone()) else {
            return Ok(false);
        };
        let others: Vec<u32> = map.values().copied().filter(|&v| v != id).collect();

        let attr = self.require_attribute(id)?;
        if self.attribute_head(owner)? == id {
            self.set_attribute_head(owner, attr.next)?;
        } else {
            for other in others {
                let mut prev = self.require_attribute(other)?;
                if prev.next == id {
                    prev.next = attr.next;
                    self.attributes.track(prev);
                    break;
                }
            }
        }

        self.release_attribute(&attr)?;
        self.attributes.remove(id);
        self.attribute_map_mut(owner)?.remove(&key);
        Ok(true)
    }

    pub fn remove_attribute_by_key(&mut self, owner: Owner, key: &str) -> Result<bool> {
        match self.attribute_map_mut(owner)?.get(key).copied() {
            Some(id) => self.remove_attribute(owner, id),
            None => Ok(false),
        }
    }

    /// Remove every attribute of an owner that is about to be removed
    pub(super) fn clear_attributes(&mut self, owner: Owner) -> Result<()> {
        for id in self.attribute_chain(owner)? {
            let attr = self.require_attribute(id)?;
            self.release_attribute(&attr)?;
            self.attributes.remove(id);
        }
        self.set_attribute_head(owner, 0)?;
        self.attribute_maps.remove(&owner);
        Ok(())
    }

    fn release_attribute(&mut self, attr: &Attribute) -> Result<()> {
        self.release_text(attr)?;
        self.labels.release(attr.label, &mut self.texts)?;
        Ok(())
    }

    fn release_text(&mut self, attr: &Attribute) -> Result<()> {
        if let Some(address) = attr.text_address() {
            let mut text = self.texts.find(address)?;
            self.texts.remove_text(&mut text);
        }
        Ok(())
    }
}
