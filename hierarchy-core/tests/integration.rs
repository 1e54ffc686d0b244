//! Integration Tests for the Hierarchy Engine
//!
//! These tests drive the public API end to end: building hierarchies,
//! querying them through the engine and through node handles, extracting
//! subgraphs and round-tripping snapshots.

use hierarchy_core::codec::{from_json, from_msgpack, to_json, to_msgpack};
use hierarchy_core::{Attributes, GraphConfig, GraphError, HierarchicalGraph, NodeRef, Value};

fn ids<K: Clone + hierarchy_core::NodeKey>(nodes: Vec<NodeRef<'_, K>>) -> Vec<K> {
    nodes.into_iter().map(|n| n.id().clone()).collect()
}

fn build(nodes: impl IntoIterator<Item = u32>, relations: &[(u32, u32)]) -> HierarchicalGraph<u32> {
    let mut graph = HierarchicalGraph::new();
    for id in nodes {
        graph.add_node(id).unwrap();
    }
    for (parent, child) in relations {
        graph.add_relation(parent, child).unwrap();
    }
    graph
}

/// Every relation is visible from both of its endpoints.
fn assert_symmetric(graph: &HierarchicalGraph<u32>) {
    for node in graph.nodes() {
        for child in node.children().unwrap() {
            assert!(ids(child.parents().unwrap()).contains(node.id()));
        }
        for parent in node.parents().unwrap() {
            assert!(ids(parent.children().unwrap()).contains(node.id()));
        }
    }
}

/// Lineage from a warm cache equals lineage computed on an identical fresh graph.
fn assert_cache_coherent(graph: &HierarchicalGraph<u32>) {
    let fresh = HierarchicalGraph::from_snapshot(graph.snapshot()).unwrap();
    for id in graph.ids() {
        assert_eq!(graph.ancestor_ids(id).unwrap(), fresh.ancestor_ids(id).unwrap());
        assert_eq!(graph.descendant_ids(id).unwrap(), fresh.descendant_ids(id).unwrap());
    }
}

/// Ordering example: children, ancestors and topological order.
#[test]
fn ordering_of_small_tree() {
    let graph = build(1..=4, &[(1, 2), (1, 3), (3, 4)]);

    assert_eq!(ids(graph.children_of(&1).unwrap()), [2, 3]);
    assert_eq!(ids(graph.ancestors_of(&4).unwrap()), [1, 3]);
    assert_eq!(ids(graph.tsort().unwrap()), [2, 4, 3, 1]);
}

/// Removing a node in the middle of the graph drops all of its relations.
#[test]
fn removal_mid_graph() {
    let mut graph = build(
        0..=7,
        &[(0, 3), (1, 3), (1, 2), (3, 4), (3, 5), (2, 4), (4, 5), (4, 6), (6, 7)],
    );
    graph.descendants_of(&0).unwrap();
    graph.ancestors_of(&7).unwrap();

    graph.remove_node(&3).unwrap();

    assert_eq!(ids(graph.ancestors_of(&4).unwrap()), [1, 2]);
    assert_eq!(ids(graph.parents_of(&4).unwrap()), [2]);
    assert_eq!(ids(graph.children_of(&4).unwrap()), [5, 6]);
    assert_eq!(ids(graph.descendants_of(&4).unwrap()), [5, 6, 7]);
    assert!(graph.descendants_of(&0).unwrap().is_empty());
    assert_symmetric(&graph);
    assert_cache_coherent(&graph);
}

/// A warm ancestor cache is discarded when a relation is added above it.
#[test]
fn cache_invalidation() {
    let mut graph = build(0..=4, &[(1, 2), (1, 3), (3, 4)]);
    assert_eq!(ids(graph.ancestors_of(&4).unwrap()), [1, 3]);

    graph.add_relation(&0, &1).unwrap();

    assert_eq!(ids(graph.ancestors_of(&4).unwrap()), [0, 1, 3]);
    assert_cache_coherent(&graph);
}

/// Symmetry and cache coherence hold across a mixed sequence of mutations.
#[test]
fn invariants_hold_across_mutations() {
    let mut graph = build(1..=8, &[]);
    let steps: [(&str, u32, u32); 12] = [
        ("add", 1, 2),
        ("add", 1, 3),
        ("add", 2, 4),
        ("add", 3, 4),
        ("add", 4, 5),
        ("add", 5, 6),
        ("remove", 1, 3),
        ("add", 7, 4),
        ("add", 1, 2),
        ("remove", 9, 9),
        ("add", 6, 8),
        ("remove", 2, 4),
    ];

    for (op, parent, child) in steps {
        let result = match op {
            "add" => graph.add_relation(&parent, &child),
            _ => graph.remove_relation(&parent, &child),
        };
        if parent == 9 {
            assert!(result.is_err());
        } else {
            result.unwrap();
        }
        for id in 1..=8 {
            graph.ancestors_of(&id).unwrap();
            graph.descendants_of(&id).unwrap();
        }
        assert_symmetric(&graph);
        assert_cache_coherent(&graph);
    }

    graph.remove_node(&4).unwrap();
    assert_symmetric(&graph);
    assert_cache_coherent(&graph);
    assert_eq!(ids(graph.roots()), [1, 3, 5, 7]);
}

/// The descendants subgraph keeps only relations among the descendants.
#[test]
fn descendants_subgraph() {
    let graph = build(1..=6, &[(1, 2), (1, 3), (3, 4), (3, 5), (4, 5), (5, 6)]);

    let subgraph = graph.get(&3).unwrap().descendants_subgraph().unwrap();

    assert_eq!(subgraph.ids().copied().collect::<Vec<_>>(), [3, 4, 5, 6]);
    assert_eq!(ids(subgraph.children_of(&3).unwrap()), [4, 5]);
    assert_eq!(ids(subgraph.parents_of(&5).unwrap()), [3, 4]);
    assert_eq!(ids(subgraph.children_of(&5).unwrap()), [6]);
    assert_eq!(ids(subgraph.roots()), [3]);
}

/// Lineage queries and subgraph extraction work on hierarchies thousands of levels deep.
#[test]
fn deep_chain() {
    const DEPTH: u32 = 4000;
    let relations: Vec<(u32, u32)> = (1..DEPTH).map(|id| (id - 1, id)).collect();
    let graph = build(0..DEPTH, &relations);

    let ancestors = ids(graph.ancestors_of(&(DEPTH - 1)).unwrap());
    assert_eq!(ancestors.len(), DEPTH as usize - 1);
    assert_eq!((ancestors[0], ancestors[ancestors.len() - 1]), (0, DEPTH - 2));

    let middle = DEPTH / 2;
    let descendants = ids(graph.descendants_of(&middle).unwrap());
    assert_eq!(descendants, (middle + 1..DEPTH).collect::<Vec<_>>());

    let subgraph = graph.descendants_subgraph_from(&middle).unwrap();
    assert_eq!(subgraph.len(), (DEPTH - middle) as usize);
    assert_eq!(ids(subgraph.roots()), [middle]);
    assert_eq!(subgraph.descendant_ids(&middle).unwrap(), descendants);
    assert_eq!(ids(subgraph.tsort().unwrap()), (middle..DEPTH).rev().collect::<Vec<_>>());
}

/// Missing endpoints are reported in argument order and nothing changes.
#[test]
fn errors_leave_graph_untouched() {
    let mut graph = build(1..=2, &[(1, 2)]);
    let before = graph.to_string();

    let err = graph.add_relation(&3, &4).unwrap_err();
    assert_eq!(err.to_string(), "Nodes not found: 3, 4");

    assert_eq!(graph.add_node(1).unwrap_err(), GraphError::NodeAlreadyExists(vec!["1".into()]));
    assert!(graph.remove_relation(&1, &5).is_err());
    assert!(graph.remove_node(&5).is_err());
    assert!(graph.subgraph_of(&[1, 5]).is_err());

    assert_eq!(graph.to_string(), before);
}

/// Cycles are tolerated structurally and reported by the topological sort.
#[test]
fn cycle_reported_by_topological_sort() {
    let mut graph = build(1..=3, &[(1, 2), (2, 3)]);
    assert_eq!(ids(graph.topological_order().unwrap()), [3, 2, 1]);

    graph.add_relation(&3, &1).unwrap();

    match graph.topological_order() {
        Err(GraphError::CyclicGraph(members)) => assert_eq!(members, ["1", "2", "3"]),
        other => panic!("expected a cycle, got {other:?}"),
    }
}

/// Rejecting self-loops is opt-in.
#[test]
fn self_loop_policy() {
    let mut permissive = build(1..=1, &[]);
    permissive.add_relation(&1, &1).unwrap();
    assert!(permissive.tsort().is_err());
    assert_eq!(
        permissive.ancestors_of(&1).unwrap_err(),
        GraphError::CyclicGraph(vec!["1".into()])
    );

    let mut strict = HierarchicalGraph::with_config(GraphConfig::new().with_reject_self_loops(true));
    strict.add_node(1u32).unwrap();
    assert_eq!(
        strict.add_relation(&1, &1).unwrap_err().to_string(),
        "Self-referencing relation: 1"
    );
}

/// Node handles read and write the shared attribute payload.
#[test]
fn node_attributes() {
    let mut graph = HierarchicalGraph::new();
    let attrs: Attributes = [("name", "Node 1"), ("code", "node_1")].into_iter().collect();
    graph.add_node_with("a".to_string(), attrs).unwrap();
    graph.add_node("b".to_string()).unwrap();

    let a = graph.get(&"a".to_string()).unwrap();
    assert_eq!(a.get("name"), Some(Value::from("Node 1")));

    let b = graph.get(&"b".to_string()).unwrap();
    assert!(b.attributes().is_empty());
    b.set("name", "Node 2");
    assert_eq!(graph.get(&"b".to_string()).unwrap().get("name"), Some(Value::from("Node 2")));
}

/// Rendering lists each node with its neighbours in adjacency order.
#[test]
fn rendering() {
    let graph = build(1..=2, &[(1, 2)]);

    assert_eq!(
        graph.to_string(),
        "<HierarchicalGraph nodes:[\
         <HierarchicalGraph::Node 1 parents:[] children:[2]>, \
         <HierarchicalGraph::Node 2 parents:[1] children:[]>]>"
    );
}

/// Both codecs reproduce the graph, including non-node-order parent lists.
#[test]
fn snapshot_round_trips() {
    let mut graph = build(1..=4, &[(3, 4), (1, 4), (1, 2), (2, 3)]);
    graph.get(&1).unwrap().set("label", "top");
    graph.ancestors_of(&4).unwrap();

    let from_text: HierarchicalGraph<u32> = from_json(&to_json(&graph).unwrap()).unwrap();
    let from_bytes: HierarchicalGraph<u32> = from_msgpack(&to_msgpack(&graph).unwrap()).unwrap();

    for loaded in [&from_text, &from_bytes] {
        assert_eq!(loaded.to_string(), graph.to_string());
        assert_eq!(ids(loaded.parents_of(&4).unwrap()), [3, 1]);
        assert_eq!(loaded.get(&1).unwrap().get("label"), Some(Value::from("top")));
        assert_eq!(loaded.ancestor_ids(&4).unwrap(), graph.ancestor_ids(&4).unwrap());
    }

    graph.remove_node(&1).unwrap();
    assert_eq!(from_text.len(), 4);
}
