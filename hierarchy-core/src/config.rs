//! Graph Configuration
//!
//! Options that change how the engine validates mutations. A graph keeps its
//! configuration for its whole life, and subgraphs inherit it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Fail `add_relation(x, x)` with `SelfLoop` instead of storing it.
    ///
    /// Off by default. A stored self-loop makes ancestor and descendant
    /// queries on that node fail with `CyclicGraph`.
    pub reject_self_loops: bool,
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reject_self_loops(mut self, reject: bool) -> Self {
        self.reject_self_loops = reject;
        self
    }
}
