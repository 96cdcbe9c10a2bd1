//! Graph: one named graph directory and the stores inside it

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::attributes::Owner;
use super::db::check_name;
use super::options::{GraphMetadata, GraphOptions};
use crate::error::{GraphError, Result, StoreKind};
use crate::storage::{
    AttributeStore, Class, ClassStore, Edge, EdgeStore, Label, LabelStore, TextStore, Vertex, VertexStore,
};

/// Name of the root class every graph starts with
pub const ROOT_CLASS: &str = "Vertex";

/// Edge ids leaving (or entering) a vertex, grouped by label
pub type EdgeMap = HashMap<String, BTreeSet<u32>>;

/// Which of a vertex's two edge lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    fn head(self, vertex: &Vertex) -> u32 {
        match self {
            Direction::Out => vertex.first_out,
            Direction::In => vertex.first_in,
        }
    }

    fn set_head(self, vertex: &mut Vertex, id: u32) {
        match self {
            Direction::Out => vertex.first_out = id,
            Direction::In => vertex.first_in = id,
        }
    }

    fn next(self, edge: &Edge) -> u32 {
        match self {
            Direction::Out => edge.out_next,
            Direction::In => edge.in_next,
        }
    }

    fn set_next(self, edge: &mut Edge, id: u32) {
        match self {
            Direction::Out => edge.out_next = id,
            Direction::In => edge.in_next = id,
        }
    }

    /// The vertex whose list holds `edge` in this direction
    fn anchor(self, edge: &Edge) -> u32 {
        match self {
            Direction::Out => edge.from,
            Direction::In => edge.to,
        }
    }
}

/// Allocator high-water marks and free-space counters
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub vertex_last_id: u32,
    pub vertex_free_ids: usize,
    pub edge_last_id: u32,
    pub edge_free_ids: usize,
    pub attribute_last_id: u32,
    pub attribute_free_ids: usize,
    pub label_last_id: u16,
    pub text_next_row: u64,
    pub text_free_runs: usize,
    pub classes: usize,
}

#[derive(Debug)]
pub struct Graph {
    pub(super) name: String,
    pub(super) path: PathBuf,
    pub(super) metadata: GraphMetadata,

    pub(super) texts: TextStore,
    pub(super) labels: LabelStore,
    pub(super) classes: ClassStore,
    pub(super) vertices: VertexStore,
    pub(super) edges: EdgeStore,
    pub(super) attributes: AttributeStore,

    /// Key -> attribute id, built on first use per owner
    pub(super) attribute_maps: HashMap<Owner, HashMap<String, u32>>,
    out_maps: HashMap<u32, EdgeMap>,
    in_maps: HashMap<u32, EdgeMap>,

    /// Class table changed since the last write
    classes_dirty: bool,
    /// Set by `destroy`; skips the unflushed-state warning
    discarded: bool,
}

fn store_path(dir: &Path, kind: StoreKind, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", kind.stem(), extension))
}

impl Graph {
    /// Create a new graph directory with empty stores and the root class
    pub fn create(path: impl AsRef<Path>, name: &str, options: GraphOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        options.validate()?;
        if path.exists() {
            return Err(GraphError::GraphExists(path));
        }
        fs::create_dir_all(&path).map_err(GraphError::io(StoreKind::Graph, "create dir"))?;

        let ext = options.extension.as_str();
        let texts = TextStore::create(
            &store_path(&path, StoreKind::Text, ext),
            &store_path(&path, StoreKind::TextId, ext),
            options.row_size,
        )?;
        let labels = LabelStore::create(
            &store_path(&path, StoreKind::Label, ext),
            &store_path(&path, StoreKind::LabelId, ext),
        )?;
        let classes = ClassStore::create(&store_path(&path, StoreKind::Class, ext), &path.join("idx"), ext)?;
        let vertices = VertexStore::create(
            &store_path(&path, StoreKind::Vertex, ext),
            &store_path(&path, StoreKind::VertexId, ext),
        )?;
        let edges = EdgeStore::create(
            &store_path(&path, StoreKind::Edge, ext),
            &store_path(&path, StoreKind::EdgeId, ext),
        )?;
        let attributes = AttributeStore::create(
            &store_path(&path, StoreKind::Attribute, ext),
            &store_path(&path, StoreKind::AttributeId, ext),
        )?;

        let mut graph = Self::assemble(
            name,
            path,
            GraphMetadata::new(name, options),
            (texts, labels, classes, vertices, edges, attributes),
        );

        let root_label = graph.labels.add_label(ROOT_CLASS, &mut graph.texts)?;
        let root = graph.classes.add_class(root_label, None)?;
        graph.classes.index(root.id, ROOT_CLASS)?;
        graph.classes_dirty = true;
        graph.write()?;

        tracing::info!("Created graph {:?} at {:?}", graph.name, graph.path);
        Ok(graph)
    }

    /// Open an existing graph with the options it was created with
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(GraphError::GraphNotFound(path));
        }

        let metadata = GraphMetadata::load(&path, name)?;
        let options = metadata.options.clone();
        let ext = options.extension.as_str();

        let texts = TextStore::open(
            &store_path(&path, StoreKind::Text, ext),
            &store_path(&path, StoreKind::TextId, ext),
            options.row_size,
        )?;
        let labels = LabelStore::open(
            &store_path(&path, StoreKind::Label, ext),
            &store_path(&path, StoreKind::LabelId, ext),
        )?;
        let classes = ClassStore::open(&store_path(&path, StoreKind::Class, ext), &path.join("idx"), ext)?;
        let vertices = VertexStore::open(
            &store_path(&path, StoreKind::Vertex, ext),
            &store_path(&path, StoreKind::VertexId, ext),
        )?;
        let edges = EdgeStore::open(
            &store_path(&path, StoreKind::Edge, ext),
            &store_path(&path, StoreKind::EdgeId, ext),
        )?;
        let attributes = AttributeStore::open(
            &store_path(&path, StoreKind::Attribute, ext),
            &store_path(&path, StoreKind::AttributeId, ext),
        )?;

        let graph = Self::assemble(name, path, metadata, (texts, labels, classes, vertices, edges, attributes));
        tracing::info!(
            "Opened graph {:?} at {:?}: {} vertex ids, {} edge ids, {} labels",
            graph.name,
            graph.path,
            graph.vertices.last_id(),
            graph.edges.last_id(),
            graph.labels.last_id()
        );
        Ok(graph)
    }

    #[allow(clippy::type_complexity)]
    fn assemble(
        name: &str,
        path: PathBuf,
        metadata: GraphMetadata,
        stores: (TextStore, LabelStore, ClassStore, VertexStore, EdgeStore, AttributeStore),
    ) -> Self {
        let (texts, labels, classes, vertices, edges, attributes) = stores;
        Self {
            name: name.to_string(),
            path,
            metadata,
            texts,
            labels,
            classes,
            vertices,
            edges,
            attributes,
            attribute_maps: HashMap::new(),
            out_maps: HashMap::new(),
            in_maps: HashMap::new(),
            classes_dirty: false,
            discarded: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &GraphOptions {
        &self.metadata.options
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            vertex_last_id: self.vertices.last_id(),
            vertex_free_ids: self.vertices.free_count(),
            edge_last_id: self.edges.last_id(),
            edge_free_ids: self.edges.free_count(),
            attribute_last_id: self.attributes.last_id(),
            attribute_free_ids: self.attributes.free_count(),
            label_last_id: self.labels.last_id(),
            text_next_row: self.texts.id_store().next_row(),
            text_free_runs: self.texts.id_store().free_runs().len(),
            classes: self.classes.classes().count(),
        }
    }

    /// Whether any store holds changes not yet written
    pub fn has_unflushed(&self) -> bool {
        self.classes_dirty
            || self.vertices.tracked_count() > 0
            || self.edges.tracked_count() > 0
            || self.attributes.tracked_count() > 0
            || self.labels.dirty_count() > 0
            || self.texts.pending_count() > 0
    }

    /// Flush every store: records, classes, labels, texts, then metadata
    pub fn write(&mut self) -> Result<()> {
        self.vertices.write()?;
        self.edges.write()?;
        self.attributes.write()?;
        self.classes.write()?;
        self.labels.write()?;
        self.texts.write()?;
        self.metadata.save(&self.path)?;
        self.classes_dirty = false;

        tracing::debug!("Flushed graph {:?}", self.name);
        Ok(())
    }

    /// Flush and release every file handle
    pub fn close(mut self) -> Result<()> {
        self.write()
    }

    /// Drop all unflushed state and delete the graph directory
    pub fn destroy(mut self) -> Result<()> {
        self.discarded = true;
        let path = self.path.clone();
        drop(self);
        Self::remove_files(&path)?;
        tracing::info!("Destroyed graph at {:?}", path);
        Ok(())
    }

    /// Delete a graph directory, whatever state it was left in
    pub fn remove_files(path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GraphError::io(StoreKind::Graph, "remove dir")(e)),
        }
    }

    // === LABELS ===

    /// Intern a string, adding one reference
    pub fn add_label(&mut self, value: &str) -> Result<u16> {
        self.labels.add_label(value, &mut self.texts)
    }

    /// Drop one reference; `None` if the string is not interned
    pub fn remove_label(&mut self, value: &str) -> Result<Option<u64>> {
        self.labels.remove_label(value, &mut self.texts)
    }

    pub fn find_label(&mut self, value: &str) -> Result<Option<Label>> {
        self.labels.find_by_value(value, &self.texts)
    }

    pub fn label(&self, id: u16) -> Result<Label> {
        self.labels.find(id)
    }

    pub fn label_value(&mut self, id: u16) -> Result<String> {
        self.labels.value(id, &self.texts)
    }

    /// Rename an interned string everywhere it is used
    pub fn rename_label(&mut self, from: &str, to: &str) -> Result<u16> {
        if self.find_class(from)?.is_some() {
            check_name(to)?;
        }
        let id = self.labels.rename_label(from, to, &mut self.texts)?;

        // cached maps are keyed by label value
        self.attribute_maps.clear();
        self.out_maps.clear();
        self.in_maps.clear();

        if let Some(class) = self.classes.find_by_label(id) {
            self.classes.release_index(class.id)?;
            let old = self.classes.index_path(from);
            if old.exists() {
                fs::rename(&old, self.classes.index_path(to)).map_err(GraphError::io(StoreKind::ClassIndex, "rename"))?;
            }
        }
        Ok(id)
    }

    /// Every label in sorted order with its reference count
    pub fn labels(&mut self) -> Result<Vec<(u16, String, u64)>> {
        self.labels.in_order(&self.texts)
    }

    // === CLASSES ===

    pub fn find_class(&mut self, name: &str) -> Result<Option<Class>> {
        Ok(self
            .labels
            .find_by_value(name, &self.texts)?
            .and_then(|label| self.classes.find_by_label(label.id)))
    }

    fn require_class(&mut self, name: &str) -> Result<Class> {
        self.find_class(name)?.ok_or_else(|| GraphError::ClassNotFound(name.to_string()))
    }

    pub fn class(&self, id: u8) -> Option<Class> {
        self.classes.find(id)
    }

    pub fn class_name(&mut self, id: u8) -> Result<String> {
        let class = self.classes.find(id).ok_or_else(|| GraphError::ClassNotFound(format!("#{id}")))?;
        self.labels.value(class.label, &self.texts)
    }

    pub fn classes(&self) -> Vec<Class> {
        self.classes.classes().collect()
    }

    /// Add a class under `parent`
    pub fn add_class(&mut self, name: &str, parent: &str) -> Result<Class> {
        check_name(name)?;
        if self.find_class(name)?.is_some() {
            return Err(GraphError::ClassExists(name.to_string()));
        }
        let parent = self.require_class(parent)?;

        let label = self.labels.add_label(name, &mut self.texts)?;
        let class = match self.classes.add_class(label, Some(parent.id)) {
            Ok(class) => class,
            Err(e) => {
                self.labels.remove_label(name, &mut self.texts)?;
                return Err(e);
            }
        };
        self.classes_dirty = true;
        if let Err(e) = self.classes.index(class.id, name) {
            self.classes.remove_class(class.id);
            self.labels.remove_label(name, &mut self.texts)?;
            return Err(e);
        }
        Ok(class)
    }

    /// Remove a class that has no vertices and no sub-classes
    pub fn remove_class(&mut self, name: &str) -> Result<()> {
        let class = self.require_class(name)?;
        if class.super_class == 0 || class.count > 0 || class.first_sub != 0 {
            return Err(GraphError::ClassInUse(name.to_string()));
        }

        let index_path = self.classes.index_path(name);
        self.classes.remove_class(class.id);
        match fs::remove_file(&index_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(GraphError::io(StoreKind::ClassIndex, "remove")(e)),
        }
        self.labels.remove_label(name, &mut self.texts)?;
        self.classes_dirty = true;
        Ok(())
    }

    /// Direct sub-classes, most recently added first
    pub fn sub_classes(&mut self, name: &str) -> Result<Vec<Class>> {
        let class = self.require_class(name)?;
        Ok(self
            .classes
            .sub_classes(class.id)
            .into_iter()
            .filter_map(|id| self.classes.find(id))
            .collect())
    }

    /// Vertices belonging directly to a class
    pub fn class_vertices(&mut self, name: &str) -> Result<Vec<u32>> {
        let class = self.require_class(name)?;
        Ok(self.classes.index(class.id, name)?.ids().collect())
    }

    /// Whether a vertex belongs to the class or any class below it
    pub fn has_vertex(&mut self, class: &str, vertex: u32) -> Result<bool> {
        let class = self.require_class(class)?;
        self.class_has_vertex(class.id, vertex)
    }

    fn class_has_vertex(&mut self, id: u8, vertex: u32) -> Result<bool> {
        let name = self.class_name(id)?;
        if self.classes.index(id, &name)?.contains(vertex) {
            return Ok(true);
        }
        for sub in self.classes.sub_classes(id) {
            if self.class_has_vertex(sub, vertex)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // === VERTICES ===

    /// Create a vertex of the named class
    pub fn add_vertex(&mut self, class: &str) -> Result<Vertex> {
        let class = self.require_class(class)?;
        let name = self.class_name(class.id)?;

        let vertex = Vertex::new(self.vertices.next_id()?, class.id);
        self.vertices.track(vertex);

        self.classes.adjust_count(class.id, 1);
        self.classes.index(class.id, &name)?.insert(vertex.id);
        self.classes_dirty = true;
        Ok(vertex)
    }

    pub fn vertex(&self, id: u32) -> Result<Option<Vertex>> {
        self.vertices.find(id)
    }

    pub(super) fn require_vertex(&self, id: u32) -> Result<Vertex> {
        self.vertices.find(id)?.ok_or(GraphError::VertexNotFound(id))
    }

    /// Remove a vertex with all of its edges and attributes
    pub fn remove_vertex(&mut self, id: u32) -> Result<()> {
        let vertex = self.require_vertex(id)?;

        let mut attached: BTreeSet<u32> = self.edge_chain(id, Direction::Out)?.into_iter().collect();
        attached.extend(self.edge_chain(id, Direction::In)?);
        for edge in attached {
            self.remove_edge(edge)?;
        }

        self.clear_attributes(Owner::Vertex(id))?;

        let name = self.class_name(vertex.class)?;
        self.classes.adjust_count(vertex.class, -1);
        self.classes.index(vertex.class, &name)?.remove(id);
        self.classes_dirty = true;

        self.vertices.remove(id);
        self.out_maps.remove(&id);
        self.in_maps.remove(&id);
        Ok(())
    }

    // === EDGES ===

    /// Create an edge and push it onto the head of both endpoint lists
    pub fn add_edge(&mut self, from: u32, to: u32, label: &str) -> Result<Edge> {
        self.require_vertex(from)?;
        self.require_vertex(to)?;

        let label_id = self.labels.add_label(label, &mut self.texts)?;
        let mut edge = Edge::new(self.edges.next_id()?, label_id, from, to);

        let mut source = self.require_vertex(from)?;
        edge.out_next = source.first_out;
        source.first_out = edge.id;
        self.vertices.track(source);

        let mut target = self.require_vertex(to)?;
        edge.in_next = target.first_in;
        target.first_in = edge.id;
        self.vertices.track(target);

        self.edges.track(edge);

        if let Some(map) = self.out_maps.get_mut(&from) {
            map.entry(label.to_string()).or_default().insert(edge.id);
        }
        if let Some(map) = self.in_maps.get_mut(&to) {
            map.entry(label.to_string()).or_default().insert(edge.id);
        }
        Ok(edge)
    }

    pub fn edge(&self, id: u32) -> Result<Option<Edge>> {
        self.edges.find(id)
    }

    pub(super) fn require_edge(&self, id: u32) -> Result<Edge> {
        self.edges.find(id)?.ok_or(GraphError::EdgeNotFound(id))
    }

    pub fn edge_label(&mut self, edge: &Edge) -> Result<String> {
        self.labels.value(edge.label, &self.texts)
    }

    /// Unlink an edge from both endpoint lists and remove it
    pub fn remove_edge(&mut self, id: u32) -> Result<()> {
        let edge = self.require_edge(id)?;

        self.unlink_edge(&edge, Direction::Out)?;
        self.unlink_edge(&edge, Direction::In)?;

        self.clear_attributes(Owner::Edge(id))?;
        self.labels.release(edge.label, &mut self.texts)?;
        self.edges.remove(id);
        Ok(())
    }

    fn unlink_edge(&mut self, edge: &Edge, dir: Direction) -> Result<()> {
        let anchor = dir.anchor(edge);
        let key = self.labels.value(edge.label, &self.texts)?;
        let members: Vec<u32> = self.edge_map_mut(anchor, dir)?.values().flatten().copied().collect();

        let mut vertex = self.require_vertex(anchor)?;
        let next = dir.next(edge);
        if dir.head(&vertex) == edge.id {
            dir.set_head(&mut vertex, next);
            self.vertices.track(vertex);
        } else {
            for member in members.into_iter().filter(|&m| m != edge.id) {
                let mut prev = self.require_edge(member)?;
                if dir.next(&prev) == edge.id {
                    dir.set_next(&mut prev, next);
                    self.edges.track(prev);
                    break;
                }
            }
        }

        let map = self.edge_map_mut(anchor, dir)?;
        if let Some(ids) = map.get_mut(&key) {
            ids.remove(&edge.id);
            if ids.is_empty() {
                map.remove(&key);
            }
        }
        Ok(())
    }

    /// Edge ids in list order, walking the intrusive links
    pub fn edge_chain(&self, vertex: u32, dir: Direction) -> Result<Vec<u32>> {
        let mut out = Vec::new();
        let mut current = dir.head(&self.require_vertex(vertex)?);
        while current != 0 {
            out.push(current);
            current = dir.next(&self.require_edge(current)?);
        }
        Ok(out)
    }

    /// Outbound edges grouped by label
    pub fn out_edges(&mut self, vertex: u32) -> Result<&EdgeMap> {
        Ok(&*self.edge_map_mut(vertex, Direction::Out)?)
    }

    /// Inbound edges grouped by label
    pub fn in_edges(&mut self, vertex: u32) -> Result<&EdgeMap> {
        Ok(&*self.edge_map_mut(vertex, Direction::In)?)
    }

    fn edge_map_mut(&mut self, vertex: u32, dir: Direction) -> Result<&mut EdgeMap> {
        let built = match dir {
            Direction::Out => self.out_maps.contains_key(&vertex),
            Direction::In => self.in_maps.contains_key(&vertex),
        };
        if !built {
            let mut map = EdgeMap::new();
            for id in self.edge_chain(vertex, dir)? {
                let edge = self.require_edge(id)?;
                let key = self.labels.value(edge.label, &self.texts)?;
                map.entry(key).or_default().insert(id);
            }
            match dir {
                Direction::Out => self.out_maps.insert(vertex, map),
                Direction::In => self.in_maps.insert(vertex, map),
            };
        }

        let maps = match dir {
            Direction::Out => &mut self.out_maps,
            Direction::In => &mut self.in_maps,
        };
        Ok(maps.entry(vertex).or_default())
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        if !self.discarded && self.has_unflushed() {
            tracing::warn!(
                "Graph {:?} dropped with unflushed changes ({} vertices, {} edges, {} attributes, {} labels, {} texts)",
                self.name,
                self.vertices.tracked_count(),
                self.edges.tracked_count(),
                self.attributes.tracked_count(),
                self.labels.dirty_count(),
                self.texts.pending_count()
            );
        }
    }
}
