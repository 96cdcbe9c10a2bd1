//! Graph API: per-graph orchestration of the stores

pub mod attributes;
pub mod db;
pub mod engine;
pub mod options;

#[cfg(test)]
mod tests;

pub use attributes::{Attributable, Owner};
pub use db::Database;
pub use engine::{Direction, EdgeMap, Graph, GraphStats, ROOT_CLASS};
pub use options::{GraphMetadata, GraphOptions};
