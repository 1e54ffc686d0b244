//! Lineage Cache
//!
//! Memoized ancestor and descendant lists. Entries are filled lazily on first
//! query and dropped wholesale on any structural mutation; there is no
//! incremental invalidation. Both directions are always cleared together.

use std::collections::HashMap;

use super::node::NodeKey;

/// Which transitive closure an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lineage {
    Ancestors,
    Descendants,
}

#[derive(Debug)]
pub(crate) struct LineageCache<K> {
    ancestors: HashMap<K, Vec<K>>,
    descendants: HashMap<K, Vec<K>>,
}

impl<K: NodeKey> LineageCache<K> {
    pub(crate) fn new() -> Self {
        Self {
            ancestors: HashMap::new(),
            descendants: HashMap::new(),
        }
    }

    fn table(&self, lineage: Lineage) -> &HashMap<K, Vec<K>> {
        match lineage {
            Lineage::Ancestors => &self.ancestors,
            Lineage::Descendants => &self.descendants,
        }
    }

    pub(crate) fn get(&self, lineage: Lineage, id: &K) -> Option<Vec<K>> {
        self.peek(lineage, id).map(<[K]>::to_vec)
    }

    /// Borrow an entry without cloning it.
    pub(crate) fn peek(&self, lineage: Lineage, id: &K) -> Option<&[K]> {
        self.table(lineage).get(id).map(Vec::as_slice)
    }

    pub(crate) fn insert(&mut self, lineage: Lineage, id: K, ids: Vec<K>) {
        let table = match lineage {
            Lineage::Ancestors => &mut self.ancestors,
            Lineage::Descendants => &mut self.descendants,
        };
        table.insert(id, ids);
    }

    /// Drop every entry. Returns how many were held.
    pub(crate) fn clear(&mut self) -> usize {
        let held = self.len();
        self.ancestors.clear();
        self.descendants.clear();
        held
    }

    pub(crate) fn len(&self) -> usize {
        self.ancestors.len() + self.descendants.len()
    }
}
