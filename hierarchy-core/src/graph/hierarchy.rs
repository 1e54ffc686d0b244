//! Hierarchical Graph
//!
//! The engine that owns every node of a hierarchy. It keeps the node table,
//! both directions of every relation, and the memoized lineage cache.
//!
//! # Invariants
//!
//! - `c` is a child of `p` exactly when `p` is a parent of `c`.
//! - Every structural mutation clears the lineage cache before returning.
//! - Validation runs before any mutation, so a failed call changes nothing.

use std::fmt::{self, Debug, Display};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::cache::LineageCache;
use super::node::{NodeKey, NodeRecord, NodeRef};
use crate::attributes::Attributes;
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

/// An in-memory hierarchy of nodes linked by parent/child relations.
///
/// Relations are not required to be acyclic. Ancestor and descendant queries
/// and the topological sort fail with `CyclicGraph` when they run into a
/// cycle.
pub struct HierarchicalGraph<K: NodeKey> {
    config: GraphConfig,

    /// Node table in insertion order. Iteration order is observable.
    pub(crate) nodes: IndexMap<K, NodeRecord<K>>,

    /// Memoized ancestor/descendant lists, filled from `&self` queries.
    pub(crate) cache: Mutex<LineageCache<K>>,
}

impl<K: NodeKey> HierarchicalGraph<K> {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            nodes: IndexMap::new(),
            cache: Mutex::new(LineageCache::new()),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.nodes.contains_key(id)
    }

    /// Handle to a node, if it exists.
    pub fn get(&self, id: &K) -> Option<NodeRef<'_, K>> {
        self.nodes.get(id).map(|record| NodeRef::new(self, record))
    }

    /// Handles to every node, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, K>> + '_ {
        self.nodes.values().map(move |record| NodeRef::new(self, record))
    }

    /// Every node id, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &K> + '_ {
        self.nodes.keys()
    }

    /// Add a node with an empty attribute payload.
    pub fn add_node(&mut self, id: K) -> Result<NodeRef<'_, K>> {
        self.add_node_with(id, Attributes::new())
    }

    /// Add a node carrying the given attribute payload.
    ///
    /// Fails with `NodeAlreadyExists` if the id is taken.
    pub fn add_node_with(&mut self, id: K, attributes: Attributes) -> Result<NodeRef<'_, K>> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::already_exists(&id));
        }

        trace!(node = %id, "adding node");
        let record = NodeRecord::new(id.clone(), attributes);
        let (index, _) = self.nodes.insert_full(id, record);
        self.invalidate();

        let this: &Self = self;
        Ok(NodeRef::new(this, &this.nodes[index]))
    }

    /// Remove a node and every relation it takes part in.
    pub fn remove_node(&mut self, id: &K) -> Result<()> {
        let record = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| GraphError::not_found([id]))?;

        for child_id in &record.children {
            if let Some(child) = self.nodes.get_mut(child_id) {
                child.remove_parent(id);
            }
        }

        for parent_id in &record.parents {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.remove_child(id);
            }
        }

        trace!(
            node = %id,
            parents = record.parents.len(),
            children = record.children.len(),
            "removed node"
        );
        self.invalidate();
        Ok(())
    }

    /// Relate `parent_id` to `child_id`.
    ///
    /// Adding a relation that already exists leaves adjacency order as it was.
    pub fn add_relation(&mut self, parent_id: &K, child_id: &K) -> Result<()> {
        self.validate(&[parent_id, child_id])?;
        if self.config.reject_self_loops && parent_id == child_id {
            return Err(GraphError::self_loop(parent_id));
        }

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.add_child(child_id.clone());
        }
        if let Some(child) = self.nodes.get_mut(child_id) {
            child.add_parent(parent_id.clone());
        }

        trace!(parent = %parent_id, child = %child_id, "added relation");
        self.invalidate();
        Ok(())
    }

    /// Drop the relation between `parent_id` and `child_id`.
    ///
    /// Removing a relation that does not exist is not an error.
    pub fn remove_relation(&mut self, parent_id: &K, child_id: &K) -> Result<()> {
        self.validate(&[parent_id, child_id])?;

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.remove_child(child_id);
        }
        if let Some(child) = self.nodes.get_mut(child_id) {
            child.remove_parent(parent_id);
        }

        trace!(parent = %parent_id, child = %child_id, "removed relation");
        self.invalidate();
        Ok(())
    }

    /// Direct parents, in the order the relations were added.
    pub fn parents_of(&self, id: &K) -> Result<Vec<NodeRef<'_, K>>> {
        let record = self.record(id)?;
        Ok(self.handles(&record.parents))
    }

    /// Direct children, in the order the relations were added.
    pub fn children_of(&self, id: &K) -> Result<Vec<NodeRef<'_, K>>> {
        let record = self.record(id)?;
        Ok(self.handles(&record.children))
    }

    /// Nodes without parents, in insertion order.
    pub fn roots(&self) -> Vec<NodeRef<'_, K>> {
        self.nodes
            .values()
            .filter(|record| record.parents.is_empty())
            .map(|record| NodeRef::new(self, record))
            .collect()
    }

    pub(crate) fn record(&self, id: &K) -> Result<&NodeRecord<K>> {
        self.nodes.get(id).ok_or_else(|| GraphError::not_found([id]))
    }

    /// Fail with every unknown id, in argument order.
    pub(crate) fn validate(&self, ids: &[&K]) -> Result<()> {
        let missing: Vec<&K> = ids
            .iter()
            .copied()
            .filter(|id| !self.nodes.contains_key(*id))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GraphError::not_found(missing))
        }
    }

    pub(crate) fn handles<'g, 'a, I>(&'g self, ids: I) -> Vec<NodeRef<'g, K>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    /// Drop all memoized lineage. Called by every structural mutation.
    pub(crate) fn invalidate(&mut self) {
        let dropped = self.cache.get_mut().clear();
        if dropped > 0 {
            debug!(entries = dropped, "lineage cache cleared");
        }
    }
}

impl<K: NodeKey> Default for HierarchicalGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `<HierarchicalGraph nodes:[<HierarchicalGraph::Node ..>, ..]>` in insertion order.
impl<K: NodeKey> Display for HierarchicalGraph<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<HierarchicalGraph nodes:[")?;
        for (i, node) in self.nodes().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("]>")
    }
}

impl<K: NodeKey> Debug for HierarchicalGraph<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchicalGraph")
            .field("config", &self.config)
            .field("node_count", &self.nodes.len())
            .field("cached_entries", &self.cache.lock().len())
            .finish()
    }
}
