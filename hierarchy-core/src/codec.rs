//! Snapshot Codec
//!
//! Round-trips a [`HierarchicalGraph`] through JSON or MessagePack.
//!
//! A snapshot lists nodes in table order. Each entry carries the node's id,
//! a copy of its attributes, and both adjacency lists in their own order:
//! parent order cannot be derived from child order once relations have been
//! added out of node order, so both are stored. Lineage caches are not
//! stored; they refill on demand after loading.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::Attributes;
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::graph::{HierarchicalGraph, NodeKey};

/// Serializable form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>"))]
pub struct NodeSnapshot<K> {
    pub id: K,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub parents: Vec<K>,
    #[serde(default)]
    pub children: Vec<K>,
}

/// Serializable form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>"))]
pub struct GraphSnapshot<K> {
    #[serde(default)]
    pub config: GraphConfig,
    pub nodes: Vec<NodeSnapshot<K>>,
}

impl<K: NodeKey> HierarchicalGraph<K> {
    /// Capture the graph's structure and a copy of every attribute map.
    ///
    /// The snapshot does not share attribute payloads with the graph.
    pub fn snapshot(&self) -> GraphSnapshot<K> {
        let nodes = self
            .nodes
            .values()
            .map(|record| NodeSnapshot {
                id: record.id.clone(),
                attributes: Attributes::from(record.attributes.to_map()),
                parents: record.parents.iter().cloned().collect(),
                children: record.children.iter().cloned().collect(),
            })
            .collect();

        GraphSnapshot {
            config: *self.config(),
            nodes,
        }
    }

    /// Rebuild a graph from a snapshot.
    ///
    /// Fails with `InvalidSnapshot` if ids repeat, if a relation names an
    /// unknown node, if the two directions of a relation disagree, or if a
    /// self-loop is present while the snapshot's config rejects them.
    pub fn from_snapshot(snapshot: GraphSnapshot<K>) -> Result<Self> {
        check_snapshot(&snapshot)?;

        let mut graph = Self::with_config(snapshot.config);
        for node in &snapshot.nodes {
            graph.add_node_with(node.id.clone(), node.attributes.clone())?;
        }

        for node in snapshot.nodes {
            if let Some(record) = graph.nodes.get_mut(&node.id) {
                record.parents = node.parents.into_iter().collect();
                record.children = node.children.into_iter().collect();
            }
        }

        debug!(nodes = graph.len(), "graph restored from snapshot");
        Ok(graph)
    }
}

fn check_snapshot<K: NodeKey>(snapshot: &GraphSnapshot<K>) -> Result<()> {
    let mut ids = HashSet::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        if !ids.insert(&node.id) {
            return Err(GraphError::invalid_snapshot(format!(
                "duplicate node {}",
                node.id
            )));
        }
    }

    let mut parent_edges = HashSet::new();
    let mut child_edges = HashSet::new();
    for node in &snapshot.nodes {
        for parent in &node.parents {
            if !ids.contains(parent) {
                return Err(GraphError::invalid_snapshot(format!(
                    "node {} names unknown parent {parent}",
                    node.id
                )));
            }
            if !parent_edges.insert((parent, &node.id)) {
                return Err(GraphError::invalid_snapshot(format!(
                    "node {} lists parent {parent} twice",
                    node.id
                )));
            }
        }
        for child in &node.children {
            if !ids.contains(child) {
                return Err(GraphError::invalid_snapshot(format!(
                    "node {} names unknown child {child}",
                    node.id
                )));
            }
            if !child_edges.insert((&node.id, child)) {
                return Err(GraphError::invalid_snapshot(format!(
                    "node {} lists child {child} twice",
                    node.id
                )));
            }
        }
    }

    if let Some((parent, child)) = child_edges.symmetric_difference(&parent_edges).next() {
        return Err(GraphError::invalid_snapshot(format!(
            "relation {parent} -> {child} is only recorded on one side"
        )));
    }

    if snapshot.config.reject_self_loops {
        if let Some((id, _)) = child_edges.iter().find(|(parent, child)| parent == child) {
            return Err(GraphError::invalid_snapshot(format!(
                "self-referencing relation on {id}"
            )));
        }
    }

    Ok(())
}

/// Encode a graph as JSON.
pub fn to_json<K>(graph: &HierarchicalGraph<K>) -> Result<String>
where
    K: NodeKey + Serialize,
{
    serde_json::to_string(&graph.snapshot()).map_err(GraphError::codec)
}

/// Decode a graph from JSON produced by [`to_json`].
pub fn from_json<K>(json: &str) -> Result<HierarchicalGraph<K>>
where
    K: NodeKey + DeserializeOwned,
{
    let snapshot: GraphSnapshot<K> = serde_json::from_str(json).map_err(GraphError::codec)?;
    HierarchicalGraph::from_snapshot(snapshot)
}

/// Encode a graph as MessagePack.
pub fn to_msgpack<K>(graph: &HierarchicalGraph<K>) -> Result<Vec<u8>>
where
    K: NodeKey + Serialize,
{
    rmp_serde::to_vec_named(&graph.snapshot()).map_err(GraphError::codec)
}

/// Decode a graph from bytes produced by [`to_msgpack`].
pub fn from_msgpack<K>(bytes: &[u8]) -> Result<HierarchicalGraph<K>>
where
    K: NodeKey + DeserializeOwned,
{
    let snapshot: GraphSnapshot<K> = rmp_serde::from_slice(bytes).map_err(GraphError::codec)?;
    HierarchicalGraph::from_snapshot(snapshot)
}
