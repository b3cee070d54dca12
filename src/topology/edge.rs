//! Boundary edges with embedded cut points.

use crate::topology::TOL;
use crate::topology::node::NodeKey;
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};

/// An edge between two nodes, carrying the cut points recorded on it.
///
/// Intersection positions are stored relative to `nodes[0]`, in `[0, 1]`.
/// The optional interior node is the mid-side node of a quadratic element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    nodes: [NodeKey; 2],
    interior: Option<NodeKey>,
    embedded: Vec<NodeKey>,
    intersection_x: Vec<f64>,
}

impl Edge {
    pub fn new(n0: NodeKey, n1: NodeKey) -> Self {
        Self {
            nodes: [n0, n1],
            interior: None,
            embedded: Vec::new(),
            intersection_x: Vec::new(),
        }
    }

    #[inline]
    pub fn node(&self, i: usize) -> NodeKey {
        self.nodes[i]
    }

    #[inline]
    pub fn nodes(&self) -> [NodeKey; 2] {
        self.nodes
    }

    pub fn interior_node(&self) -> Option<NodeKey> {
        self.interior
    }

    pub fn set_interior_node(&mut self, node: Option<NodeKey>) {
        self.interior = node;
    }

    /// Same endpoints, either direction.
    pub fn equivalent(&self, other: &Edge) -> bool {
        (self.nodes[0] == other.nodes[0] && self.nodes[1] == other.nodes[1])
            || (self.nodes[0] == other.nodes[1] && self.nodes[1] == other.nodes[0])
    }

    /// Endpoint or embedded node.
    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.nodes[0] == node || self.nodes[1] == node || self.is_embedded_node(node)
    }

    /// Both endpoints of `other` lie on this edge.
    pub fn contains_edge(&self, other: &Edge) -> bool {
        self.contains_node(other.nodes[0]) && self.contains_node(other.nodes[1])
    }

    pub fn is_partial_overlap(&self, other: &Edge) -> bool {
        self.contains_edge(other) || other.contains_edge(self)
    }

    fn local_position(&self, position: f64, from_node: NodeKey) -> Result<f64, TopologyError> {
        if from_node == self.nodes[0] {
            Ok(position)
        } else if from_node == self.nodes[1] {
            Ok(1.0 - position)
        } else {
            Err(TopologyError::NodeNotOnBoundary { node: from_node })
        }
    }

    /// Record `embedded` at `position` measured from `from_node`.
    pub fn add_intersection(
        &mut self,
        position: f64,
        embedded: NodeKey,
        from_node: NodeKey,
    ) -> Result<(), TopologyError> {
        let x = self.local_position(position, from_node)?;
        self.embedded.push(embedded);
        self.intersection_x.push(x);
        Ok(())
    }

    /// Move an already recorded `embedded` node to `position`.
    pub fn reset_intersection(
        &mut self,
        position: f64,
        embedded: NodeKey,
        from_node: NodeKey,
    ) -> Result<(), TopologyError> {
        let x = self.local_position(position, from_node)?;
        let idx = self.embedded_node_index(embedded)?;
        self.intersection_x[idx] = x;
        Ok(())
    }

    /// Take over the cuts of `other`; `from_node` names which endpoint of
    /// `other` corresponds to this edge's first node.
    pub fn copy_intersection(&mut self, other: &Edge, from_node: usize) -> Result<(), TopologyError> {
        self.embedded = other.embedded.clone();
        self.intersection_x = match from_node {
            0 => other.intersection_x.clone(),
            1 => other.intersection_x.iter().map(|x| 1.0 - x).collect(),
            _ => return Err(TopologyError::NodeNotOnBoundary { node: other.nodes[0] }),
        };
        Ok(())
    }

    pub fn has_intersection(&self) -> bool {
        !self.embedded.is_empty()
    }

    pub fn has_intersection_at_position(
        &self,
        position: f64,
        from_node: NodeKey,
    ) -> Result<bool, TopologyError> {
        if !self.has_intersection() {
            return Ok(false);
        }
        let x = self.local_position(position, from_node)?;
        Ok(self.intersection_x.iter().any(|xi| (x - xi).abs() < TOL))
    }

    /// Position of embedded node `idx` measured from `from_node`.
    pub fn intersection(&self, idx: usize, from_node: NodeKey) -> Result<f64, TopologyError> {
        let x = *self
            .intersection_x
            .get(idx)
            .ok_or(TopologyError::NodeNotOnBoundary { node: from_node })?;
        self.local_position(x, from_node)
    }

    /// Position of `node` measured from the first endpoint.
    pub fn distance_from_node0(&self, node: NodeKey) -> Result<f64, TopologyError> {
        if node == self.nodes[0] {
            Ok(0.0)
        } else if node == self.nodes[1] {
            Ok(1.0)
        } else {
            let idx = self.embedded_node_index(node)?;
            Ok(self.intersection_x[idx])
        }
    }

    pub fn is_embedded_node(&self, node: NodeKey) -> bool {
        self.embedded.contains(&node)
    }

    pub fn embedded_node_index(&self, node: NodeKey) -> Result<usize, TopologyError> {
        self.embedded
            .iter()
            .position(|&n| n == node)
            .ok_or(TopologyError::NodeNotOnBoundary { node })
    }

    /// Index of the embedded node sitting at `position` (from `from_node`).
    pub fn embedded_node_index_at(
        &self,
        position: f64,
        from_node: NodeKey,
    ) -> Result<Option<usize>, TopologyError> {
        let x = self.local_position(position, from_node)?;
        Ok(self
            .intersection_x
            .iter()
            .position(|xi| (x - xi).abs() < TOL))
    }

    pub fn embedded_node(&self, idx: usize) -> Option<NodeKey> {
        self.embedded.get(idx).copied()
    }

    pub fn embedded_nodes(&self) -> &[NodeKey] {
        &self.embedded
    }

    pub fn num_embedded_nodes(&self) -> usize {
        self.embedded.len()
    }

    /// Replace `old` wherever it occurs (endpoints, interior, embedded).
    pub fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for n in self.nodes.iter_mut() {
            if *n == old {
                *n = new;
            }
        }
        if self.interior == Some(old) {
            self.interior = Some(new);
        }
        for n in self.embedded.iter_mut() {
            if *n == old {
                *n = new;
            }
        }
    }

    pub fn remove_embedded_node(&mut self, node: NodeKey) {
        if let Some(idx) = self.embedded.iter().position(|&n| n == node) {
            self.embedded.remove(idx);
            self.intersection_x.remove(idx);
        }
    }

    pub fn remove_embedded_nodes(&mut self) {
        self.embedded.clear();
        self.intersection_x.clear();
    }

    /// Flip direction; positions are re-measured from the new first node.
    pub fn reverse_nodes(&mut self) {
        self.nodes.swap(0, 1);
        for x in self.intersection_x.iter_mut() {
            *x = 1.0 - *x;
        }
    }

    /// Masters reproducing `node` on this edge: itself for an endpoint,
    /// the endpoints weighted `(1 - x, x)` for an embedded node.
    pub fn node_masters(&self, node: NodeKey) -> Option<Vec<(NodeKey, f64)>> {
        if node == self.nodes[0] || node == self.nodes[1] {
            return Some(vec![(node, 1.0)]);
        }
        let idx = self.embedded.iter().position(|&n| n == node)?;
        let x = self.intersection_x[idx];
        Some(vec![(self.nodes[0], 1.0 - x), (self.nodes[1], x)])
    }
}
