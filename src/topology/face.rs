//! Boundary faces of 3D elements and fragments.
//!
//! A face is a closed loop: `nodes[i]` is the first node of `edges[i]` and
//! `edges[i]` ends where `edges[i + 1]` starts. Faces own their edges, so
//! the two faces sharing an element edge each carry a copy of its cuts.

use crate::topology::edge::Edge;
use crate::topology::fragment::Fragment2D;
use crate::topology::interior::FaceNode;
use crate::topology::node::NodeKey;
use crate::topology::parametric::shape_functions_2d;
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    nodes: Vec<NodeKey>,
    edges: Vec<Edge>,
    /// Non-vertex nodes of a quadratic face (mid-edges, centre).
    face_interior_nodes: Vec<NodeKey>,
    /// Cut-created nodes inside the face.
    interior_nodes: Vec<FaceNode>,
}

impl Face {
    /// Face over `nodes` with edges `(nodes[i], nodes[i + 1])`.
    pub fn new(nodes: Vec<NodeKey>) -> Self {
        let n = nodes.len();
        let edges = (0..n)
            .map(|i| Edge::new(nodes[i], nodes[(i + 1) % n]))
            .collect();
        Self {
            nodes,
            edges,
            face_interior_nodes: Vec::new(),
            interior_nodes: Vec::new(),
        }
    }

    /// Face over an already closed edge loop.
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        let nodes = edges.iter().map(|e| e.node(0)).collect();
        Self {
            nodes,
            edges,
            face_interior_nodes: Vec::new(),
            interior_nodes: Vec::new(),
        }
    }

    /// Face taking over the boundary loop of a planar fragment.
    pub fn from_fragment(frag: &Fragment2D) -> Self {
        Self::from_edges(frag.edges().to_vec())
    }

    /// Build a face from unordered loop edges: chain them head to tail,
    /// then reverse the loop.
    ///
    /// Used for the cutting face of a solid fragment, where the chained
    /// loop follows the neighbouring sub-faces and the reversed one points
    /// out of the fragment.
    pub fn from_loose_edges(mut loose: Vec<Edge>) -> Result<Self, TopologyError> {
        if loose.len() < 3 {
            return Err(TopologyError::OpenBoundaryLoop);
        }
        let mut ordered = vec![loose.swap_remove(0)];
        while !loose.is_empty() {
            let tail = ordered[ordered.len() - 1].node(1);
            let idx = loose
                .iter()
                .position(|e| e.contains_node(tail))
                .ok_or(TopologyError::OpenBoundaryLoop)?;
            let mut next = loose.swap_remove(idx);
            if next.node(0) != tail {
                next.reverse_nodes();
            }
            ordered.push(next);
        }
        if ordered[ordered.len() - 1].node(1) != ordered[0].node(0) {
            return Err(TopologyError::OpenBoundaryLoop);
        }
        ordered.reverse();
        for e in ordered.iter_mut() {
            e.reverse_nodes();
        }
        Ok(Self::from_edges(ordered))
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, i: usize) -> NodeKey {
        self.nodes[i]
    }

    pub fn nodes(&self) -> &[NodeKey] {
        &self.nodes
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, i: usize) -> &Edge {
        &self.edges[i]
    }

    pub fn edge_mut(&mut self, i: usize) -> &mut Edge {
        &mut self.edges[i]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn face_interior_nodes(&self) -> &[NodeKey] {
        &self.face_interior_nodes
    }

    pub fn set_face_interior_nodes(&mut self, nodes: Vec<NodeKey>) {
        self.face_interior_nodes = nodes;
    }

    pub fn interior_nodes(&self) -> &[FaceNode] {
        &self.interior_nodes
    }

    pub fn add_interior_node(&mut self, node: FaceNode) {
        self.interior_nodes.push(node);
    }

    /// Same node set, in any order or orientation.
    pub fn equivalent(&self, other: &Face) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.nodes.iter().all(|n| other.nodes.contains(n))
    }

    /// Node on an edge (endpoint or cut point) or cut-created interior node.
    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.edges.iter().any(|e| e.contains_node(node))
            || self.interior_nodes.iter().any(|fnode| fnode.node() == node)
    }

    /// Every node of `other` lies on this face.
    pub fn contains_face(&self, other: &Face) -> bool {
        other.nodes.iter().all(|&n| self.contains_node(n))
    }

    pub fn owns_edge(&self, edge: &Edge) -> bool {
        self.edges.iter().any(|e| e.equivalent(edge))
    }

    /// Exactly one edge in common.
    pub fn is_adjacent(&self, other: &Face) -> bool {
        self.edges.iter().filter(|e| other.owns_edge(e)).count() == 1
    }

    /// Index of this face's edge shared with an adjacent `other`.
    pub fn adjacent_common_edge(&self, other: &Face) -> Option<usize> {
        if !self.is_adjacent(other) {
            return None;
        }
        self.edges.iter().position(|e| other.owns_edge(e))
    }

    /// For equivalent faces: `true` when both loops run the same way.
    pub fn has_same_orientation(&self, other: &Face) -> Result<bool, TopologyError> {
        if !self.equivalent(other) {
            log::warn!("orientation compared between faces that do not overlap");
            return Ok(false);
        }
        let n = self.nodes.len();
        for i in 0..n {
            if self.nodes[i] == other.nodes[0] {
                let next = self.nodes[(i + 1) % n];
                if next == other.nodes[1] {
                    return Ok(true);
                }
                if next != other.nodes[n - 1] {
                    return Err(TopologyError::OpenBoundaryLoop);
                }
            }
        }
        Ok(false)
    }

    /// Number of edges carrying a cut.
    pub fn num_cuts(&self) -> usize {
        self.edges.iter().filter(|e| e.has_intersection()).count()
    }

    /// A face counts as cut through once two of its edges are cut.
    pub fn has_intersection(&self) -> bool {
        self.num_cuts() > 1
    }

    pub fn has_edge_cut(&self) -> bool {
        self.num_cuts() > 0
    }

    /// Copy the cuts of the matching face of another element, edge by edge.
    pub fn copy_intersection(&mut self, from: &Face) -> Result<(), TopologyError> {
        for (mine, theirs) in self.edges.iter_mut().zip(from.edges.iter()) {
            if theirs.has_intersection() {
                mine.copy_intersection(theirs, 0)?;
            }
        }
        if !from.interior_nodes.is_empty() {
            self.interior_nodes = from.interior_nodes.clone();
        }
        Ok(())
    }

    pub fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for n in self.nodes.iter_mut() {
            if *n == old {
                *n = new;
            }
        }
        for e in self.edges.iter_mut() {
            e.switch_node(new, old);
        }
        for n in self.face_interior_nodes.iter_mut() {
            if *n == old {
                *n = new;
            }
        }
        for fnode in self.interior_nodes.iter_mut() {
            fnode.switch_node(new, old);
        }
    }

    pub fn remove_embedded_node(&mut self, node: NodeKey) {
        for e in self.edges.iter_mut() {
            e.remove_embedded_node(node);
        }
        self.interior_nodes.retain(|fnode| fnode.node() != node);
    }

    /// Split along the cuts on this face's edges (see [`Fragment2D::split`]).
    pub fn split(&self) -> Result<Vec<Face>, TopologyError> {
        let frag = Fragment2D::from_edges(self.edges.clone());
        let pieces = frag.split(|_| false)?;
        if pieces.is_empty() {
            return Ok(vec![self.clone()]);
        }
        Ok(pieces.iter().map(Face::from_fragment).collect())
    }

    /// Merge with an adjacent face lying in the same element face.
    ///
    /// The shared edge disappears; its two endpoints become cuts on the
    /// merged edges, with placeholder positions until
    /// [`reset_edge_intersection`](Self::reset_edge_intersection) runs.
    pub fn combine_with(&self, other: &Face) -> Result<Face, TopologyError> {
        let this_common = self
            .adjacent_common_edge(other)
            .ok_or(TopologyError::OpenBoundaryLoop)?;
        let other_common = other
            .adjacent_common_edge(self)
            .ok_or(TopologyError::OpenBoundaryLoop)?;
        let n1 = self.edges.len();
        let n2 = other.edges.len();
        let common0 = self.edges[this_common].node(0);
        let common1 = self.edges[this_common].node(1);

        let this_prev = (this_common + n1 - 1) % n1;
        let this_next = (this_common + 1) % n1;
        let other_next = (other_common + 1) % n2;
        let other_prev = (other_common + n2 - 1) % n2;

        let mut edges = Vec::with_capacity(n1 + n2 - 4);
        let mut first = Edge::new(self.edges[this_prev].node(0), other.edges[other_next].node(1));
        first.add_intersection(-1.0, common0, first.node(0))?;
        edges.push(first);
        let mut k = (other_next + 1) % n2;
        while k != other_prev {
            edges.push(other.edges[k].clone());
            k = (k + 1) % n2;
        }
        let mut second = Edge::new(other.edges[other_prev].node(0), self.edges[this_next].node(1));
        second.add_intersection(-1.0, common1, second.node(0))?;
        edges.push(second);
        let mut k = (this_next + 1) % n1;
        while k != this_prev {
            edges.push(self.edges[k].clone());
            k = (k + 1) % n1;
        }
        let merged = Face::from_edges(edges);
        if merged.num_nodes() != n1 + n2 - 4 {
            return Err(TopologyError::OpenBoundaryLoop);
        }
        Ok(merged)
    }

    /// Replace placeholder cut positions (negative) by their position along
    /// the edge of `reference` that contains the merged edge.
    pub fn reset_edge_intersection(&mut self, reference: &Face) -> Result<(), TopologyError> {
        for edge in self.edges.iter_mut() {
            if !edge.has_intersection() {
                continue;
            }
            let n0 = edge.node(0);
            let n1 = edge.node(1);
            let Some(emb) = edge.embedded_node(0) else {
                continue;
            };
            if edge.intersection(0, n0)? >= 0.0 {
                continue;
            }
            let host = reference
                .edges
                .iter()
                .find(|e| e.contains_node(n0) && e.contains_node(n1) && e.contains_node(emb))
                .ok_or(TopologyError::NodeNotOnBoundary { node: emb })?;
            let d0 = host.distance_from_node0(n0)?;
            let d1 = host.distance_from_node0(n1)?;
            let de = host.distance_from_node0(emb)?;
            edge.reset_intersection((de - d0) / (d1 - d0), emb, n0)?;
        }
        Ok(())
    }

    /// Masters reproducing `node` from this face's nodes.
    pub fn node_masters(&self, node: NodeKey) -> Option<Vec<(NodeKey, f64)>> {
        if let Some(masters) = self.edges.iter().find_map(|e| e.node_masters(node)) {
            return Some(masters);
        }
        let fnode = self.interior_nodes.iter().find(|f| f.node() == node)?;
        let weights = shape_functions_2d(self.nodes.len(), fnode.xi())?;
        Some(self.nodes.iter().copied().zip(weights).collect())
    }
}
