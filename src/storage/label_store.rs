//! Label store: interned, reference-counted strings kept in an AVL tree
//!
//! File layout: 2-byte root id header, then 21-byte label records at
//! `2 + (id - 1) * 21`. Each label is also a tree node ordered by the
//! byte-lexicographic order of its string value.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::codec::{read_u16, Decoder};
use crate::storage::file::StoreFile;
use crate::storage::id_store::Uint16IdStore;
use crate::storage::text_store::{Text, TextStore};

pub const LABEL_HEADER_SIZE: u64 = 2;
pub const LABEL_RECORD_SIZE: usize = 21;

/// Interned string node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub id: u16,
    /// Row address of the label's text
    pub text: u64,
    pub refs: u64,
    pub left: u16,
    pub right: u16,
    pub height: u8,
}

impl Label {
    fn decode(id: u16, bytes: &[u8]) -> Result<Self> {
        assert_eq!(bytes.len(), LABEL_RECORD_SIZE, "label store: record must be {} bytes", LABEL_RECORD_SIZE);
        let mut d = Decoder::new(StoreKind::Label, bytes);
        Ok(Self {
            id,
            text: d.u64("text")?,
            refs: d.u64("refs")?,
            left: d.u16("left")?,
            right: d.u16("right")?,
            height: d.u8("height")?,
        })
    }

    fn data(&self) -> [u8; LABEL_RECORD_SIZE] {
        let mut out = [0u8; LABEL_RECORD_SIZE];
        out[0..8].copy_from_slice(&self.text.to_le_bytes());
        out[8..16].copy_from_slice(&self.refs.to_le_bytes());
        out[16..18].copy_from_slice(&self.left.to_le_bytes());
        out[18..20].copy_from_slice(&self.right.to_le_bytes());
        out[20] = self.height;
        out
    }
}

#[derive(Debug)]
pub struct LabelStore {
    file: StoreFile,
    ids: Uint16IdStore,
    /// Dirty labels; also the authoritative copy until the next write
    writes: HashMap<u16, Label>,
    /// Decoded string values by label id
    values: HashMap<u16, String>,
    root: u16,
}

impl LabelStore {
    pub fn create(path: &Path, id_path: &Path) -> Result<Self> {
        let store = Self {
            file: StoreFile::create(StoreKind::Label, path)?,
            ids: Uint16IdStore::create(StoreKind::LabelId, id_path)?,
            writes: HashMap::new(),
            values: HashMap::new(),
            root: 0,
        };
        store.write_header()?;
        Ok(store)
    }

    pub fn open(path: &Path, id_path: &Path) -> Result<Self> {
        let file = StoreFile::open(StoreKind::Label, path)?;
        let ids = Uint16IdStore::open(StoreKind::LabelId, id_path)?;

        let mut header = [0u8; LABEL_HEADER_SIZE as usize];
        file.read_exact_at(0, &mut header, 0)?;
        let root = read_u16(StoreKind::Label, "root", &header)?;

        Ok(Self { file, ids, writes: HashMap::new(), values: HashMap::new(), root })
    }

    fn write_header(&self) -> Result<()> {
        self.file.write_at(0, &self.root.to_le_bytes())
    }

    pub fn root(&self) -> u16 {
        self.root
    }

    pub fn last_id(&self) -> u16 {
        self.ids.last_id()
    }

    pub fn dirty_count(&self) -> usize {
        self.writes.len()
    }

    /// Label by id, dirty copy first
    pub fn find(&self, id: u16) -> Result<Label> {
        assert!(id != 0, "label store: cannot find label with id 0");

        if let Some(label) = self.writes.get(&id) {
            return Ok(*label);
        }

        let offset = LABEL_HEADER_SIZE + (id as u64 - 1) * LABEL_RECORD_SIZE as u64;
        let mut bytes = [0u8; LABEL_RECORD_SIZE];
        self.file.read_exact_at(offset, &mut bytes, id as u64)?;
        Label::decode(id, &bytes)
    }

    fn put(&mut self, label: Label) {
        self.writes.insert(label.id, label);
    }

    /// String value of a label
    pub fn value(&mut self, id: u16, texts: &TextStore) -> Result<String> {
        if let Some(value) = self.values.get(&id) {
            return Ok(value.clone());
        }

        let label = self.find(id)?;
        let value = texts.find(label.text)?.as_str()?.to_string();
        self.values.insert(id, value.clone());
        Ok(value)
    }

    /// Binary search down the tree for `value`
    pub fn find_by_value(&mut self, value: &str, texts: &TextStore) -> Result<Option<Label>> {
        let mut current = self.root;
        while current != 0 {
            let node = self.find(current)?;
            match self.value(current, texts)?.as_str().cmp(value) {
                Ordering::Equal => return Ok(Some(node)),
                Ordering::Less => current = node.right,
                Ordering::Greater => current = node.left,
            }
        }
        Ok(None)
    }

    /// Intern `value`: bump the existing label's refs or insert a new node
    pub fn add_label(&mut self, value: &str, texts: &mut TextStore) -> Result<u16> {
        if let Some(mut label) = self.find_by_value(value, texts)? {
            label.refs += 1;
            self.put(label);
            return Ok(label.id);
        }

        let id = self.ids.next_id()?;
        let mut text = Text::new(value);
        let label = Label {
            id,
            text: texts.add_text(&mut text),
            refs: 1,
            left: 0,
            right: 0,
            height: 0,
        };
        self.put(label);
        self.values.insert(id, value.to_string());

        self.root = self.insert_node(self.root, id, value, texts)?;
        Ok(id)
    }

    /// Drop one reference; the label is deleted when none remain.
    /// Returns the remaining count, or `None` if `value` is not interned.
    pub fn remove_label(&mut self, value: &str, texts: &mut TextStore) -> Result<Option<u64>> {
        let Some(mut label) = self.find_by_value(value, texts)? else {
            return Ok(None);
        };

        label.refs = label.refs.saturating_sub(1);
        self.put(label);
        if label.refs == 0 {
            self.delete_label(label, value, texts)?;
        }
        Ok(Some(label.refs))
    }

    /// Remove a reference by label id
    pub fn release(&mut self, id: u16, texts: &mut TextStore) -> Result<Option<u64>> {
        let value = self.value(id, texts)?;
        self.remove_label(&value, texts)
    }

    fn delete_label(&mut self, label: Label, value: &str, texts: &mut TextStore) -> Result<()> {
        self.root = self.remove_node(self.root, label.id, value, texts)?;

        let mut text = texts.find(label.text)?;
        texts.remove_text(&mut text);

        self.put(Label { id: label.id, text: 0, refs: 0, left: 0, right: 0, height: 0 });
        self.values.remove(&label.id);
        self.ids.add_id(label.id);
        Ok(())
    }

    /// Change a label's string in place; every user of the id follows
    pub fn rename_label(&mut self, from: &str, to: &str, texts: &mut TextStore) -> Result<u16> {
        if from == to {
            return self
                .find_by_value(from, texts)?
                .map(|l| l.id)
                .ok_or_else(|| GraphError::LabelNotFound(from.to_string()));
        }
        if self.find_by_value(to, texts)?.is_some() {
            return Err(GraphError::LabelExists(to.to_string()));
        }
        let label = self
            .find_by_value(from, texts)?
            .ok_or_else(|| GraphError::LabelNotFound(from.to_string()))?;

        self.root = self.remove_node(self.root, label.id, from, texts)?;

        let mut text = texts.find(label.text)?;
        text.set_value(to);
        let address = texts.save_text(&mut text);

        let mut label = self.find(label.id)?;
        label.text = address;
        label.left = 0;
        label.right = 0;
        label.height = 0;
        self.put(label);
        self.values.insert(label.id, to.to_string());

        self.root = self.insert_node(self.root, label.id, to, texts)?;
        Ok(label.id)
    }

    /// Every label in sorted order with its reference count
    pub fn in_order(&mut self, texts: &TextStore) -> Result<Vec<(u16, String, u64)>> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut current = self.root;

        while current != 0 || !stack.is_empty() {
            while current != 0 {
                stack.push(current);
                current = self.find(current)?.left;
            }
            if let Some(id) = stack.pop() {
                let node = self.find(id)?;
                out.push((id, self.value(id, texts)?, node.refs));
                current = node.right;
            }
        }
        Ok(out)
    }

    /// Flush dirty labels, the root header and the id allocator
    pub fn write(&mut self) -> Result<()> {
        for label in self.writes.values() {
            let offset = LABEL_HEADER_SIZE + (label.id as u64 - 1) * LABEL_RECORD_SIZE as u64;
            self.file.write_at(offset, &label.data())?;
        }
        self.write_header()?;
        self.ids.write()?;

        tracing::debug!(
            "label store: wrote {} labels, root {}, {} free ids",
            self.writes.len(),
            self.root,
            self.ids.free_count()
        );
        self.writes.clear();
        Ok(())
    }

    // === AVL ===

    fn height(&self, id: u16) -> Result<i32> {
        if id == 0 {
            return Ok(-1);
        }
        Ok(self.find(id)?.height as i32)
    }

    fn fixed_height(&self, left: u16, right: u16) -> Result<u8> {
        Ok((1 + self.height(left)?.max(self.height(right)?)) as u8)
    }

    fn balance_factor(&self, id: u16) -> Result<i32> {
        let node = self.find(id)?;
        Ok(self.height(node.right)? - self.height(node.left)?)
    }

    fn insert_node(&mut self, at: u16, new_id: u16, value: &str, texts: &TextStore) -> Result<u16> {
        if at == 0 {
            return Ok(new_id);
        }

        let mut node = self.find(at)?;
        if value < self.value(at, texts)?.as_str() {
            let left = self.insert_node(node.left, new_id, value, texts)?;
            if left != node.left {
                node.left = left;
                self.put(node);
            }
        } else {
            let right = self.insert_node(node.right, new_id, value, texts)?;
            if right != node.right {
                node.right = right;
                self.put(node);
            }
        }

        self.rebalance(at)
    }

    /// Unlink `target` from the subtree at `at`, rebalancing every node on
    /// the way back up. Returns the new subtree root.
    fn remove_node(&mut self, at: u16, target: u16, value: &str, texts: &TextStore) -> Result<u16> {
        if at == 0 {
            return Ok(0);
        }

        let mut node = self.find(at)?;
        if at == target {
            return match (node.left, node.right) {
                (0, 0) => Ok(0),
                (0, right) => Ok(right),
                (left, 0) => Ok(left),
                (left, right) => {
                    let replacement = if self.height(left)? > self.height(right)? {
                        let max = self.rightmost(left)?;
                        let rest = self.remove_max(left)?;
                        let mut repl = self.find(max)?;
                        repl.left = rest;
                        repl.right = right;
                        repl
                    } else {
                        let min = self.leftmost(right)?;
                        let rest = self.remove_min(right)?;
                        let mut repl = self.find(min)?;
                        repl.left = left;
                        repl.right = rest;
                        repl
                    };
                    self.put(replacement);
                    self.rebalance(replacement.id)
                }
            };
        }

        if value < self.value(at, texts)?.as_str() {
            let left = self.remove_node(node.left, target, value, texts)?;
            if left != node.left {
                node.left = left;
                self.put(node);
            }
        } else {
            let right = self.remove_node(node.right, target, value, texts)?;
            if right != node.right {
                node.right = right;
                self.put(node);
            }
        }

        self.rebalance(at)
    }

    fn leftmost(&self, mut id: u16) -> Result<u16> {
        loop {
            let node = self.find(id)?;
            if node.left == 0 {
                return Ok(id);
            }
            id = node.left;
        }
    }

    fn rightmost(&self, mut id: u16) -> Result<u16> {
        loop {
            let node = self.find(id)?;
            if node.right == 0 {
                return Ok(id);
            }
            id = node.right;
        }
    }

    fn remove_min(&mut self, at: u16) -> Result<u16> {
        let mut node = self.find(at)?;
        if node.left == 0 {
            return Ok(node.right);
        }
        node.left = self.remove_min(node.left)?;
        self.put(node);
        self.rebalance(at)
    }

    fn remove_max(&mut self, at: u16) -> Result<u16> {
        let mut node = self.find(at)?;
        if node.right == 0 {
            return Ok(node.left);
        }
        node.right = self.remove_max(node.right)?;
        self.put(node);
        self.rebalance(at)
    }

    /// Fix the height of `id` and rotate if it is out of balance
    fn rebalance(&mut self, id: u16) -> Result<u16> {
        let mut node = self.find(id)?;
        let height = self.fixed_height(node.left, node.right)?;
        if height != node.height {
            node.height = height;
            self.put(node);
        }

        let balance = self.height(node.right)? - self.height(node.left)?;
        if balance < -1 {
            if self.balance_factor(node.left)? > 0 {
                node.left = self.rotate_left(node.left)?;
                self.put(node);
            }
            return self.rotate_right(id);
        }
        if balance > 1 {
            if self.balance_factor(node.right)? < 0 {
                node.right = self.rotate_right(node.right)?;
                self.put(node);
            }
            return self.rotate_left(id);
        }

        Ok(id)
    }

    fn rotate_right(&mut self, id: u16) -> Result<u16> {
        let mut node = self.find(id)?;
        let mut pivot = self.find(node.left)?;

        node.left = pivot.right;
        node.height = self.fixed_height(node.left, node.right)?;
        self.put(node);

        pivot.right = node.id;
        pivot.height = self.fixed_height(pivot.left, pivot.right)?;
        self.put(pivot);

        Ok(pivot.id)
    }

    fn rotate_left(&mut self, id: u16) -> Result<u16> {
        let mut node = self.find(id)?;
        let mut pivot = self.find(node.right)?;

        node.right = pivot.left;
        node.height = self.fixed_height(node.left, node.right)?;
        self.put(node);

        pivot.left = node.id;
        pivot.height = self.fixed_height(pivot.left, pivot.right)?;
        self.put(pivot);

        Ok(pivot.id)
    }
}
