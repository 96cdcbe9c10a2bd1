//! Per-graph configuration and `metadata.json`

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result, StoreKind};
use crate::storage::text_id_store::LENGTH_PREFIX;

pub const METADATA_FILE: &str = "metadata.json";
pub const FORMAT_VERSION: u32 = 1;

/// Settings fixed when a graph is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Text store row size in bytes
    pub row_size: u32,
    /// Store file extension
    pub extension: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { row_size: 16, extension: "gl".to_string() }
    }
}

impl GraphOptions {
    pub fn row_size(mut self, row_size: u32) -> Self {
        assert!(row_size > 4, "graph options: row size must exceed the 4-byte length prefix");
        self.row_size = row_size;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Reject settings no store can work with; the fields are public and
    /// also come from `metadata.json`
    pub fn validate(&self) -> Result<()> {
        if self.row_size <= LENGTH_PREFIX {
            return Err(GraphError::InvalidFormat(format!(
                "row size {} must exceed the {}-byte length prefix",
                self.row_size, LENGTH_PREFIX
            )));
        }
        if self.extension.is_empty() || self.extension.contains(['/', '\\', '\0']) {
            return Err(GraphError::InvalidFormat(format!("invalid store file extension {:?}", self.extension)));
        }
        Ok(())
    }
}

/// Graph metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub format_version: u32,
    pub name: String,
    pub options: GraphOptions,
    pub created_at: u64,
    pub updated_at: u64,
}

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl GraphMetadata {
    pub fn new(name: &str, options: GraphOptions) -> Self {
        let now = now();
        Self {
            format_version: FORMAT_VERSION,
            name: name.to_string(),
            options,
            created_at: now,
            updated_at: now,
        }
    }

    /// Read `metadata.json` from a graph directory; defaults when absent
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(METADATA_FILE);
        if !path.exists() {
            return Ok(Self::new(name, GraphOptions::default()));
        }

        let file = fs::File::open(&path).map_err(GraphError::io(StoreKind::Metadata, "open"))?;
        let metadata: GraphMetadata = serde_json::from_reader(file)?;
        if metadata.format_version != FORMAT_VERSION {
            return Err(GraphError::InvalidFormat(format!(
                "{:?}: format version {} (supported: {})",
                path, metadata.format_version, FORMAT_VERSION
            )));
        }
        metadata.options.validate()?;
        Ok(metadata)
    }

    pub fn save(&mut self, dir: &Path) -> Result<()> {
        self.updated_at = now();
        let file = fs::File::create(dir.join(METADATA_FILE)).map_err(GraphError::io(StoreKind::Metadata, "create"))?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
