//! Hierarchical Graph
//!
//! This module implements the node hierarchy: a directed graph where an edge
//! from P to C reads "P is a parent of C".
//!
//! # Overview
//!
//! - Nodes are identified by caller-chosen keys and carry an opaque
//!   attribute payload.
//! - Relations are stored on both endpoints, so parents and children are
//!   both a single lookup away.
//! - Ancestors and descendants are transitive closures, memoized per node
//!   and dropped on any structural change.
//! - Subgraphs copy structure and share attribute payloads.
//!
//! # Design Decisions
//!
//! 1. Nodes live in one table keyed by id, and adjacency holds ids rather
//!    than references, so there are no ownership cycles.
//!
//! 2. Adjacency sets are insertion ordered. Traversal order is part of the
//!    observable behaviour and follows the order relations were added.
//!
//! 3. Cache invalidation is all-or-nothing. Any structural mutation clears
//!    both the ancestor and the descendant cache.
//!
//! 4. Acyclicity is not enforced on mutation. Lineage queries and the
//!    topological sort report a cycle when their walk runs into one.

mod cache;
mod hierarchy;
mod node;
mod subgraph;
mod traversal;

pub use hierarchy::HierarchicalGraph;
pub use node::{NodeKey, NodeRef};
