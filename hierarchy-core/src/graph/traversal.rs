//! Traversals
//!
//! Transitive queries over a [`HierarchicalGraph`].
//!
//! # Lineage order
//!
//! Ancestors of a node are built parent by parent: for each parent `p` in
//! adjacency order the sequence `ancestors(p)` followed by `p`. Descendants
//! mirror this: for each child `c`, `c` followed by `descendants(c)`. The
//! concatenation is deduplicated keeping the first occurrence of each id.
//! Results are memoized per node until the next structural mutation.
//!
//! # Topological order
//!
//! A depth-first post-order walk over the node table: every child is emitted
//! before any of its parents. Running into a node that is still on the walk's
//! stack means the relations contain a cycle.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use tracing::{trace, warn};

use super::cache::Lineage;
use super::hierarchy::HierarchicalGraph;
use super::node::{NodeKey, NodeRecord, NodeRef};
use crate::error::{GraphError, Result};

/// Visit state of a node during the topological walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// On the walk's stack; its children are being visited.
    Active,
    /// Emitted.
    Done,
}

impl<K: NodeKey> HierarchicalGraph<K> {
    /// Every node above `id`, nearest-last along each parent chain.
    ///
    /// Fails with `CyclicGraph` if a cycle is reachable upwards from `id`.
    pub fn ancestors_of(&self, id: &K) -> Result<Vec<NodeRef<'_, K>>> {
        let ids = self.ancestor_ids(id)?;
        Ok(self.handles(&ids))
    }

    /// Every node below `id`, nearest-first along each child chain.
    ///
    /// Fails with `CyclicGraph` if a cycle is reachable downwards from `id`.
    pub fn descendants_of(&self, id: &K) -> Result<Vec<NodeRef<'_, K>>> {
        let ids = self.descendant_ids(id)?;
        Ok(self.handles(&ids))
    }

    /// Ids of [`ancestors_of`](Self::ancestors_of).
    pub fn ancestor_ids(&self, id: &K) -> Result<Vec<K>> {
        self.lineage(Lineage::Ancestors, id)
    }

    /// Ids of [`descendants_of`](Self::descendants_of).
    pub fn descendant_ids(&self, id: &K) -> Result<Vec<K>> {
        self.lineage(Lineage::Descendants, id)
    }

    /// Memoized transitive closure in one direction.
    ///
    /// Walks with an explicit stack so depth is bounded by memory, not by
    /// the thread's stack. A node's entry is written once all of its
    /// neighbours have entries, so every node on the walk is cached on the
    /// way out. The cache lock is never held across iterations.
    fn lineage(&self, direction: Lineage, id: &K) -> Result<Vec<K>> {
        let root = self.record(id)?;
        if let Some(ids) = self.cache.lock().get(direction, id) {
            return Ok(ids);
        }

        let mut stack: Vec<(&NodeRecord<K>, usize)> = vec![(root, 0)];
        let mut on_stack: HashSet<&K> = HashSet::from([&root.id]);
        let mut result = Vec::new();

        while let Some(top) = stack.last_mut() {
            let record = top.0;
            let next = neighbours(record, direction).get_index(top.1);
            top.1 += 1;

            if let Some(next) = next {
                if on_stack.contains(next) {
                    let from = stack
                        .iter()
                        .position(|(r, _)| &r.id == next)
                        .unwrap_or(0);
                    let cycle: Vec<&K> = stack[from..].iter().map(|(r, _)| &r.id).collect();
                    warn!(node = %id, ?direction, len = cycle.len(), "cycle found during lineage query");
                    return Err(GraphError::cyclic(cycle));
                }
                if self.cache.lock().peek(direction, next).is_none() {
                    let next = self.record(next)?;
                    on_stack.insert(&next.id);
                    stack.push((next, 0));
                }
                continue;
            }

            stack.pop();
            on_stack.remove(&record.id);

            let ids = self.closure(direction, record);
            trace!(node = %record.id, ?direction, len = ids.len(), "lineage computed");
            if stack.is_empty() {
                result = ids.clone();
            }
            self.cache.lock().insert(direction, record.id.clone(), ids);
        }

        Ok(result)
    }

    /// Assemble a node's closure from its neighbours' cached entries.
    fn closure(&self, direction: Lineage, record: &NodeRecord<K>) -> Vec<K> {
        let cache = self.cache.lock();
        let mut closure = IndexSet::new();
        for next in neighbours(record, direction) {
            let further = cache.peek(direction, next).unwrap_or_default();
            match direction {
                Lineage::Ancestors => {
                    closure.extend(further.iter().cloned());
                    closure.insert(next.clone());
                }
                Lineage::Descendants => {
                    closure.insert(next.clone());
                    closure.extend(further.iter().cloned());
                }
            }
        }
        closure.into_iter().collect()
    }

    /// All nodes, each child before its parents.
    ///
    /// Fails with `CyclicGraph` naming the nodes of the first cycle found,
    /// in walk order.
    pub fn topological_order(&self) -> Result<Vec<NodeRef<'_, K>>> {
        let mut visits: HashMap<&K, Visit> = HashMap::with_capacity(self.nodes.len());
        let mut order = Vec::with_capacity(self.nodes.len());

        for start in self.nodes.values() {
            if visits.contains_key(&start.id) {
                continue;
            }

            let mut stack: Vec<(&NodeRecord<K>, usize)> = vec![(start, 0)];
            visits.insert(&start.id, Visit::Active);

            while let Some(top) = stack.last_mut() {
                let record = top.0;
                let next_child = record.children.get_index(top.1);
                top.1 += 1;

                let Some(child_id) = next_child else {
                    stack.pop();
                    visits.insert(&record.id, Visit::Done);
                    order.push(NodeRef::new(self, record));
                    continue;
                };

                match visits.get(child_id) {
                    Some(Visit::Done) => {}
                    Some(Visit::Active) => {
                        let from = stack
                            .iter()
                            .position(|(r, _)| &r.id == child_id)
                            .unwrap_or(0);
                        let cycle: Vec<&K> = stack[from..].iter().map(|(r, _)| &r.id).collect();
                        warn!(len = cycle.len(), "cycle found during topological sort");
                        return Err(GraphError::cyclic(cycle));
                    }
                    None => {
                        if let Some(child) = self.nodes.get(child_id) {
                            visits.insert(&child.id, Visit::Active);
                            stack.push((child, 0));
                        }
                    }
                }
            }
        }

        Ok(order)
    }

    /// Alias of [`topological_order`](Self::topological_order).
    pub fn tsort(&self) -> Result<Vec<NodeRef<'_, K>>> {
        self.topological_order()
    }
}

fn neighbours<K: NodeKey>(record: &NodeRecord<K>, direction: Lineage) -> &IndexSet<K> {
    match direction {
        Lineage::Ancestors => &record.parents,
        Lineage::Descendants => &record.children,
    }
}
