//! Database: named graphs under one root directory

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::engine::Graph;
use super::options::GraphOptions;
use crate::error::{GraphError, Result, StoreKind};

pub struct Database {
    path: PathBuf,
    /// Graphs opened so far
    graphs: HashMap<String, Graph>,
}

/// Names become file or directory names, so they must be single path components
pub(crate) fn check_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidName(name.to_string()))
    }
}

impl Database {
    /// Create a new, empty database directory
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(GraphError::DatabaseExists(path));
        }
        fs::create_dir_all(&path).map_err(GraphError::io(StoreKind::Graph, "create dir"))?;

        tracing::info!("Created database at {:?}", path);
        Ok(Self { path, graphs: HashMap::new() })
    }

    /// Open an existing database directory; graphs open on first use
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(GraphError::DatabaseNotFound(path));
        }

        tracing::info!("Opened database at {:?}", path);
        Ok(Self { path, graphs: HashMap::new() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn graph_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Names of every graph directory, sorted
    pub fn graph_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.path).map_err(GraphError::io(StoreKind::Graph, "list"))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(GraphError::io(StoreKind::Graph, "list"))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn create_graph(&mut self, name: &str) -> Result<&mut Graph> {
        self.create_graph_with(name, GraphOptions::default())
    }

    pub fn create_graph_with(&mut self, name: &str, options: GraphOptions) -> Result<&mut Graph> {
        check_name(name)?;
        let path = self.graph_path(name);
        match self.graphs.entry(name.to_string()) {
            Entry::Occupied(_) => Err(GraphError::GraphExists(path)),
            Entry::Vacant(entry) => Ok(entry.insert(Graph::create(&path, name, options)?)),
        }
    }

    /// A graph by name, opened on first access and cached after
    pub fn graph(&mut self, name: &str) -> Result<&mut Graph> {
        check_name(name)?;
        let path = self.graph_path(name);
        match self.graphs.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Graph::open(&path, name)?)),
        }
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    /// Close a graph if open and delete its directory. Works on graphs
    /// whose creation failed part way.
    pub fn destroy_graph(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        let path = self.graph_path(name);

        if let Some(graph) = self.graphs.remove(name) {
            return graph.destroy();
        }
        if !path.exists() {
            return Err(GraphError::GraphNotFound(path));
        }
        Graph::remove_files(&path)?;
        tracing::info!("Destroyed graph at {:?}", path);
        Ok(())
    }

    /// Flush every open graph
    pub fn write(&mut self) -> Result<()> {
        for graph in self.graphs.values_mut() {
            graph.write()?;
        }
        Ok(())
    }

    /// Flush and close every open graph
    pub fn shutdown(mut self) -> Result<()> {
        for (_, graph) in self.graphs.drain() {
            graph.close()?;
        }
        Ok(())
    }

    /// Discard every open graph and delete the database directory
    pub fn destroy(mut self) -> Result<()> {
        for (_, graph) in self.graphs.drain() {
            graph.destroy()?;
        }
        Graph::remove_files(&self.path)?;
        tracing::info!("Destroyed database at {:?}", self.path);
        Ok(())
    }
}
