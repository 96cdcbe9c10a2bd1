//! gldb - embedded file-backed graph storage engine
//!
//! # Architecture
//!
//! - **Fixed-size records**: vertices, edges and attributes in their own files,
//!   addressed by id, with recyclable id allocators
//! - **Intrusive lists**: edges and attributes chained through `next` ids
//! - **Interned labels**: edge labels, attribute keys and class names stored once
//!   in an AVL tree with reference counts
//! - **Text store**: length-prefixed strings over fixed-size rows with free-run reuse
//! - **Explicit flush**: stores buffer changes in memory until `write`
//!
//! # Usage example
//!
//! ```no_run
//! use gldb::{Database, Owner, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = Database::create("./data")?;
//! let g = db.create_graph("social")?;
//!
//! g.add_class("user", "Vertex")?;
//! let alice = g.add_vertex("user")?;
//! let bob = g.add_vertex("user")?;
//! g.add_edge(alice.id, bob.id, "knows")?;
//! g.set_attribute(Owner::Vertex(alice.id), "name", Value::Text("alice".into()))?;
//!
//! db.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod storage;

pub use error::{GraphError, Result, StoreKind};
pub use graph::{Attributable, Database, Direction, Graph, GraphMetadata, GraphOptions, Owner};
pub use storage::{Attribute, Class, Edge, Label, Value, ValueType, Vertex};
