//! Hierarchy Core
//!
//! An in-memory engine for hierarchies of identifiable nodes linked by
//! parent/child relations. It provides:
//!
//! - Node and relation storage with both directions kept in sync
//! - Memoized ancestor and descendant queries
//! - Roots and topological ordering with cycle detection
//! - Subgraph extraction
//! - JSON and MessagePack snapshots
//!
//! # Architecture
//!
//! - `graph`: the engine and the node handle
//! - `attributes`: the shared per-node payload
//! - `codec`: snapshot encoding and decoding
//! - `config`: per-graph options
//! - `error`: the error type shared by every operation
//!
//! # Example
//!
//! ```rust
//! use hierarchy_core::HierarchicalGraph;
//!
//! let mut graph = HierarchicalGraph::new();
//! for id in 1..=4 {
//!     graph.add_node(id)?;
//! }
//! graph.add_relation(&1, &2)?;
//! graph.add_relation(&1, &3)?;
//! graph.add_relation(&3, &4)?;
//!
//! let ancestors: Vec<i32> = graph.ancestors_of(&4)?.iter().map(|n| *n.id()).collect();
//! assert_eq!(ancestors, [1, 3]);
//!
//! let order: Vec<i32> = graph.tsort()?.iter().map(|n| *n.id()).collect();
//! assert_eq!(order, [2, 4, 3, 1]);
//! # Ok::<(), hierarchy_core::GraphError>(())
//! ```

pub mod attributes;
pub mod codec;
pub mod config;
pub mod error;
pub mod graph;

pub use attributes::{AttributeMap, Attributes, Value};
pub use codec::{GraphSnapshot, NodeSnapshot};
pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use graph::{HierarchicalGraph, NodeKey, NodeRef};
