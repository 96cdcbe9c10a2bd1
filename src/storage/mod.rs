//! File-backed stores
//!
//! Every store owns its file handle and, where it allocates ids, its own
//! allocator file. Nothing reaches disk until the store's `write`.

pub mod codec;
pub mod file;
pub mod id_store;
pub mod text_id_store;
pub mod text_store;
pub mod label_store;
pub mod record;
pub mod attribute;
pub mod vertex;
pub mod edge;
pub mod class_index;
pub mod class_store;

pub use attribute::{Attribute, AttributeStore, Value, ValueType};
pub use class_index::ClassIndex;
pub use class_store::{Class, ClassStore};
pub use edge::{Edge, EdgeStore};
pub use id_store::{IdStore, Uint16IdStore, Uint32IdStore};
pub use label_store::{Label, LabelStore};
pub use record::{Record, RecordStore};
pub use text_id_store::{FreeRun, TextIdStore};
pub use text_store::{Text, TextStore};
pub use vertex::{Vertex, VertexStore};
