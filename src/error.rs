//! Error types for the storage engine

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Which store file an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Label,
    LabelId,
    Text,
    TextId,
    Vertex,
    VertexId,
    Edge,
    EdgeId,
    Attribute,
    AttributeId,
    Class,
    ClassIndex,
    Metadata,
    Graph,
}

impl StoreKind {
    /// File stem used on disk (`label`, `label.id`, ...)
    pub fn stem(self) -> &'static str {
        match self {
            StoreKind::Label => "label",
            StoreKind::LabelId => "label.id",
            StoreKind::Text => "text",
            StoreKind::TextId => "text.id",
            StoreKind::Vertex => "vertex",
            StoreKind::VertexId => "vertex.id",
            StoreKind::Edge => "edge",
            StoreKind::EdgeId => "edge.id",
            StoreKind::Attribute => "attribute",
            StoreKind::AttributeId => "attribute.id",
            StoreKind::Class => "class",
            StoreKind::ClassIndex => "idx",
            StoreKind::Metadata => "metadata",
            StoreKind::Graph => "graph",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{store} store: {op} failed: {source}")]
    Io {
        store: StoreKind,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{store} store: cannot decode {field}: expected {expected} bytes, found {found}")]
    Decode {
        store: StoreKind,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{store} store: cannot decode utf-8 text at row {id}: {source}")]
    DecodeText {
        store: StoreKind,
        id: u64,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{store} store: invalid {field} value {value}")]
    InvalidValue {
        store: StoreKind,
        field: &'static str,
        value: u64,
    },

    #[error("{store} store: short read at {id} (record runs past end of file)")]
    ShortRead { store: StoreKind, id: u64 },

    #[error("{store} store: id space exhausted")]
    IdSpaceExhausted { store: StoreKind },

    #[error("Vertex not found: {0}")]
    VertexNotFound(u32),

    #[error("Edge not found: {0}")]
    EdgeNotFound(u32),

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Class limit reached ({0} classes)")]
    ClassLimit(usize),

    #[error("Class still in use: {0}")]
    ClassInUse(String),

    #[error("Class already exists: {0}")]
    ClassExists(String),

    #[error("Label already exists: {0}")]
    LabelExists(String),

    #[error("Label not found: {0}")]
    LabelNotFound(String),

    #[error("Graph already exists: {0:?}")]
    GraphExists(PathBuf),

    #[error("Graph not found: {0:?}")]
    GraphNotFound(PathBuf),

    #[error("Database already exists: {0:?}")]
    DatabaseExists(PathBuf),

    #[error("Database not found: {0:?}")]
    DatabaseNotFound(PathBuf),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    pub(crate) fn io(store: StoreKind, op: &'static str) -> impl FnOnce(std::io::Error) -> GraphError {
        move |source| GraphError::Io { store, op, source }
    }
}
