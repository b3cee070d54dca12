//! Options for one topology update.

use serde::{Deserialize, Serialize};

/// Knobs of [`TopologyDriver::run_topology_update`](crate::engine::TopologyDriver::run_topology_update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyUpdateOptions {
    /// Merge phantom nodes across uncut boundaries when both sides were
    /// duplicated from the same node. `false` keeps them apart (partial
    /// node duplication).
    pub merge_phantom_edges: bool,
    /// Give every child after the first its own copy of the cut points on
    /// boundaries that have no neighbor.
    pub duplicate_embedded_nodes: bool,
}

impl Default for TopologyUpdateOptions {
    fn default() -> Self {
        Self {
            merge_phantom_edges: true,
            duplicate_embedded_nodes: false,
        }
    }
}

impl TopologyUpdateOptions {
    pub fn with_merge_phantom_edges(mut self, yes: bool) -> Self {
        self.merge_phantom_edges = yes;
        self
    }

    pub fn with_duplicate_embedded_nodes(mut self, yes: bool) -> Self {
        self.duplicate_embedded_nodes = yes;
        self
    }
}
