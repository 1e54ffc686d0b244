//! Subgraph Induction
//!
//! Builds independent graphs out of a selection of nodes. A relation is kept
//! only when both of its endpoints were selected; nothing is inferred from
//! paths through unselected nodes.
//!
//! Subgraph nodes share their attribute payload with the source nodes, so
//! attribute writes show up on both sides. Relations are copied, so
//! structural changes on one side never affect the other.

use std::collections::HashSet;

use tracing::debug;

use super::hierarchy::HierarchicalGraph;
use super::node::NodeKey;
use crate::error::Result;

impl<K: NodeKey> HierarchicalGraph<K> {
    /// Graph made of the given nodes and the relations among them.
    ///
    /// Nodes are added in the order given; repeated ids are added once.
    /// Fails with `NodeNotFound` listing every unknown id.
    pub fn subgraph_of<'a, I>(&self, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let requested: Vec<&K> = ids.into_iter().collect();
        self.validate(&requested)?;

        let mut subgraph = Self::with_config(*self.config());
        let mut selected: Vec<&K> = Vec::with_capacity(requested.len());
        let mut seen: HashSet<&K> = HashSet::with_capacity(requested.len());
        for id in requested {
            if !seen.insert(id) {
                continue;
            }
            let record = self.record(id)?;
            subgraph.add_node_with(id.clone(), record.attributes.clone())?;
            selected.push(id);
        }

        let mut relations = 0;
        for parent_id in &selected {
            let record = self.record(parent_id)?;
            for child_id in &record.children {
                if seen.contains(child_id) {
                    subgraph.add_relation(parent_id, child_id)?;
                    relations += 1;
                }
            }
        }

        debug!(nodes = selected.len(), relations, "subgraph built");
        Ok(subgraph)
    }

    /// Graph made of `id` and all of its descendants.
    pub fn descendants_subgraph_from(&self, id: &K) -> Result<Self> {
        let mut ids = vec![id.clone()];
        ids.extend(self.descendant_ids(id)?);
        self.subgraph_of(&ids)
    }
}
