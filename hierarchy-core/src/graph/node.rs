//! Graph Nodes
//!
//! This module defines the node key bound, the record the graph stores per
//! node, and the [`NodeRef`] handle callers navigate with.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use indexmap::IndexSet;
use serde_json::Value;

use super::hierarchy::HierarchicalGraph;
use crate::attributes::Attributes;
use crate::error::Result;

/// Bound for node identifiers.
///
/// Keys are compared and hashed for lookup, cloned into adjacency sets, and
/// displayed in error messages and renderings.
pub trait NodeKey: Clone + Eq + Hash + Display + Debug {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + Display + Debug {}

/// A node as stored in the graph's node table.
///
/// The record owns both adjacency buckets for its node. They are created
/// with the record, so a known id always has them.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord<K> {
    pub(crate) id: K,
    pub(crate) attributes: Attributes,

    /// Nodes this node hangs under, in relation insertion order.
    pub(crate) parents: IndexSet<K>,

    /// Nodes hanging under this node, in relation insertion order.
    pub(crate) children: IndexSet<K>,
}

impl<K: NodeKey> NodeRecord<K> {
    pub(crate) fn new(id: K, attributes: Attributes) -> Self {
        Self {
            id,
            attributes,
            parents: IndexSet::new(),
            children: IndexSet::new(),
        }
    }

    /// Append a parent unless already present. Existing order is untouched.
    pub(crate) fn add_parent(&mut self, id: K) {
        self.parents.insert(id);
    }

    pub(crate) fn remove_parent(&mut self, id: &K) {
        self.parents.shift_remove(id);
    }

    /// Append a child unless already present. Existing order is untouched.
    pub(crate) fn add_child(&mut self, id: K) {
        self.children.insert(id);
    }

    pub(crate) fn remove_child(&mut self, id: &K) {
        self.children.shift_remove(id);
    }
}

/// Handle onto a node of a [`HierarchicalGraph`].
///
/// A handle holds nothing but borrows of the graph and the node record; every
/// query forwards to the engine. While a handle is alive the graph cannot be
/// mutated, so the node it names always exists.
pub struct NodeRef<'g, K: NodeKey> {
    graph: &'g HierarchicalGraph<K>,
    record: &'g NodeRecord<K>,
}

impl<'g, K: NodeKey> NodeRef<'g, K> {
    pub(crate) fn new(graph: &'g HierarchicalGraph<K>, record: &'g NodeRecord<K>) -> Self {
        Self { graph, record }
    }

    /// The node's id.
    pub fn id(&self) -> &'g K {
        &self.record.id
    }

    /// The graph this handle belongs to.
    pub fn graph(&self) -> &'g HierarchicalGraph<K> {
        self.graph
    }

    /// The node's attribute payload.
    pub fn attributes(&self) -> &'g Attributes {
        &self.record.attributes
    }

    /// Read one attribute.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.record.attributes.get(key)
    }

    /// Write one attribute, returning the value it replaced.
    ///
    /// Payloads are shared with subgraphs, so the write is visible there too.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.record.attributes.set(key, value)
    }

    pub fn parents(&self) -> Result<Vec<NodeRef<'g, K>>> {
        self.graph.parents_of(self.id())
    }

    pub fn children(&self) -> Result<Vec<NodeRef<'g, K>>> {
        self.graph.children_of(self.id())
    }

    pub fn ancestors(&self) -> Result<Vec<NodeRef<'g, K>>> {
        self.graph.ancestors_of(self.id())
    }

    pub fn descendants(&self) -> Result<Vec<NodeRef<'g, K>>> {
        self.graph.descendants_of(self.id())
    }

    /// True when the node has no parents.
    pub fn is_root(&self) -> bool {
        self.record.parents.is_empty()
    }

    /// Independent graph of this node and everything below it.
    pub fn descendants_subgraph(&self) -> Result<HierarchicalGraph<K>> {
        self.graph.descendants_subgraph_from(self.id())
    }

    fn write_ids(f: &mut fmt::Formatter<'_>, ids: impl Iterator<Item = &'g K>) -> fmt::Result {
        for (i, id) in ids.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl<K: NodeKey> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: NodeKey> Copy for NodeRef<'_, K> {}

/// Two handles are equal when they name the same node of the same graph.
impl<K: NodeKey> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.record.id == other.record.id
    }
}

impl<K: NodeKey> Eq for NodeRef<'_, K> {}

/// Renders `<HierarchicalGraph::Node 1 parents:[] children:[2, 3]>`, ids in
/// adjacency order.
impl<'g, K: NodeKey> Display for NodeRef<'g, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<HierarchicalGraph::Node {} parents:[", self.id())?;
        Self::write_ids(f, self.record.parents.iter())?;
        f.write_str("] children:[")?;
        Self::write_ids(f, self.record.children.iter())?;
        f.write_str("]>")
    }
}

impl<K: NodeKey> Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", self.id())
            .field("attributes", self.attributes())
            .finish()
    }
}
