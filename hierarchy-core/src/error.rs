//! Graph Errors
//!
//! Every fallible engine operation reports one of these variants. Ids are
//! rendered to strings when the error is built so the error type stays
//! independent of the key type.

use std::fmt::Display;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// One or more referenced ids are not in the graph.
    #[error("Nodes not found: {}", .0.join(", "))]
    NodeNotFound(Vec<String>),

    /// The id passed to `add_node` is already taken.
    #[error("Nodes already exist: {}", .0.join(", "))]
    NodeAlreadyExists(Vec<String>),

    /// The topological sort walked back into a node still on its stack.
    #[error("Graph contains a cycle: {}", .0.join(", "))]
    CyclicGraph(Vec<String>),

    /// A relation from a node to itself while self-loops are rejected.
    #[error("Self-referencing relation: {0}")]
    SelfLoop(String),

    /// A decoded snapshot does not describe a consistent graph.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Codec error: {0}")]
    Codec(String),
}

impl GraphError {
    pub fn not_found<'a, K, I>(ids: I) -> Self
    where
        K: Display + 'a,
        I: IntoIterator<Item = &'a K>,
    {
        GraphError::NodeNotFound(ids.into_iter().map(ToString::to_string).collect())
    }

    pub fn already_exists<K: Display>(id: &K) -> Self {
        GraphError::NodeAlreadyExists(vec![id.to_string()])
    }

    pub fn cyclic<'a, K, I>(ids: I) -> Self
    where
        K: Display + 'a,
        I: IntoIterator<Item = &'a K>,
    {
        GraphError::CyclicGraph(ids.into_iter().map(ToString::to_string).collect())
    }

    pub fn self_loop<K: Display>(id: &K) -> Self {
        GraphError::SelfLoop(id.to_string())
    }

    pub fn invalid_snapshot<T: Into<String>>(msg: T) -> Self {
        GraphError::InvalidSnapshot(msg.into())
    }

    pub fn codec<T: Display>(err: T) -> Self {
        GraphError::Codec(err.to_string())
    }
}
