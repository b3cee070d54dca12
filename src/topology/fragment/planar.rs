//! Planar fragments: closed loops of boundary edges.

use crate::topology::edge::Edge;
use crate::topology::interior::FaceNode;
use crate::topology::node::NodeKey;
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The physically real part of a 2D element (or of a 3D face), as a
/// closed loop of edges in the host's winding order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment2D {
    edges: Vec<Edge>,
}

impl Fragment2D {
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Closed loop through `nodes`.
    pub fn from_loop(nodes: &[NodeKey]) -> Self {
        let n = nodes.len();
        Self {
            edges: (0..n)
                .map(|i| Edge::new(nodes[i], nodes[(i + 1) % n]))
                .collect(),
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, i: usize) -> &Edge {
        &self.edges[i]
    }

    pub fn edge_mut(&mut self, i: usize) -> &mut Edge {
        &mut self.edges[i]
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Loop vertices: the first node of every edge.
    pub fn loop_nodes(&self) -> Vec<NodeKey> {
        self.edges.iter().map(|e| e.node(0)).collect()
    }

    /// Edge endpoints.
    pub fn all_nodes(&self) -> BTreeSet<NodeKey> {
        self.edges.iter().flat_map(|e| e.nodes()).collect()
    }

    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.edges.iter().any(|e| e.contains_node(node))
    }

    /// Two fragments are connected when they share an edge.
    pub fn is_connected(&self, other: &Fragment2D) -> bool {
        self.edges
            .iter()
            .any(|a| other.edges.iter().any(|b| a.equivalent(b)))
    }

    pub fn common_nodes(&self, other: &Fragment2D) -> Vec<NodeKey> {
        let mine = self.all_nodes();
        other
            .all_nodes()
            .into_iter()
            .filter(|n| mine.contains(n))
            .collect()
    }

    /// Endpoints of `edge` that belong to this fragment.
    pub fn common_nodes_with_edge(&self, edge: &Edge) -> usize {
        edge.nodes()
            .iter()
            .filter(|&&n| self.contains_node(n))
            .count()
    }

    /// Cut points on the loop's edges.
    pub fn num_cuts(&self) -> usize {
        self.edges.iter().map(Edge::num_embedded_nodes).sum()
    }

    /// Loop vertices that are cut nodes.
    pub fn num_cut_nodes(&self, is_cut_node: impl Fn(NodeKey) -> bool) -> usize {
        self.edges.iter().filter(|e| is_cut_node(e.node(0))).count()
    }

    /// `true` when edge `i` does not lie on any host edge.
    pub fn is_edge_interior(&self, i: usize, host_edges: &[Edge]) -> bool {
        !host_edges.iter().any(|h| h.contains_edge(&self.edges[i]))
    }

    pub fn num_interior_edges(&self, host_edges: &[Edge]) -> usize {
        (0..self.edges.len())
            .filter(|&i| self.is_edge_interior(i, host_edges))
            .count()
    }

    /// An interior edge touching one of the host's interior nodes was made
    /// by an earlier secondary cut.
    pub fn is_secondary_interior_edge(&self, i: usize, host_interior: &[FaceNode]) -> bool {
        host_interior
            .iter()
            .any(|fnode| self.edges[i].contains_node(fnode.node()))
    }

    /// Host edge holding two consecutive fragment edges that meet at a cut
    /// point: the crack-tip configuration.
    pub fn tip_edge(&self, host_edges: &[Edge]) -> Option<usize> {
        host_edges.iter().position(|h| {
            h.has_intersection() && self.edges.iter().filter(|e| h.contains_edge(e)).count() == 2
        })
    }

    /// Merge the two fragment edges lying on a tip host edge back into one
    /// edge cut at their shared node.
    pub fn combine_tip_edges(&mut self, host_edges: &[Edge]) -> Result<(), TopologyError> {
        let Some(host_idx) = self.tip_edge(host_edges) else {
            return Ok(());
        };
        let host = &host_edges[host_idx];
        let ids: Vec<usize> = (0..self.edges.len())
            .filter(|&j| host.contains_edge(&self.edges[j]))
            .collect();
        let (first, second) = (ids[0], ids[1]);
        if (first + 1) % self.edges.len() != second {
            return Err(TopologyError::InvalidFragment {
                detail: "tip edges are not consecutive",
            });
        }
        let n0 = self.edges[first].node(0);
        let emb = self.edges[first].node(1);
        let n1 = self.edges[second].node(1);
        if emb != self.edges[second].node(0) {
            return Err(TopologyError::InvalidFragment {
                detail: "tip edges do not meet at the cut point",
            });
        }
        let x0 = host.distance_from_node0(n0)?;
        let x1 = host.distance_from_node0(n1)?;
        let xe = host.distance_from_node0(emb)?;
        let mut full = Edge::new(n0, n1);
        full.add_intersection((xe - x0) / (x1 - x0), emb, n0)?;
        self.edges[first] = full;
        self.edges.remove(second);
        Ok(())
    }

    /// Split along the cuts on the loop.
    ///
    /// The walk starts at the first edge and toggles between two node lists
    /// at every cut point (edge cut or cut node), so both lists keep the
    /// loop's winding:
    /// - no cut: no pieces (the fragment stays as it is);
    /// - one edge cut: one piece with the cut point inserted as a vertex
    ///   (crack tip);
    /// - one cut node: one piece identical to the loop;
    /// - two cuts: two pieces, each closed by a new edge joining the cuts.
    ///
    /// A boundary edge holding more than one cut is an error.
    pub fn split(
        &self,
        is_cut_node: impl Fn(NodeKey) -> bool,
    ) -> Result<Vec<Fragment2D>, TopologyError> {
        let mut lists: [Vec<NodeKey>; 2] = [Vec::new(), Vec::new()];
        let mut cur = 0;
        let mut edge_cuts = 0;
        let mut node_cuts = 0;
        for edge in &self.edges {
            let head = edge.node(0);
            lists[cur].push(head);
            if is_cut_node(head) {
                node_cuts += 1;
                cur = 1 - cur;
                lists[cur].push(head);
            }
            if edge.num_embedded_nodes() > 1 {
                return Err(TopologyError::InvalidFragment {
                    detail: "a fragment edge holds more than one cut",
                });
            }
            if let Some(emb) = edge.embedded_node(0) {
                if is_cut_node(edge.node(0)) || is_cut_node(edge.node(1)) {
                    return Err(TopologyError::InvalidFragment {
                        detail: "a cut node lies on a cut edge",
                    });
                }
                edge_cuts += 1;
                lists[cur].push(emb);
                cur = 1 - cur;
                lists[cur].push(emb);
            }
        }

        let mut pieces = Vec::new();
        if edge_cuts + node_cuts > 1 {
            for nodes in &lists {
                if nodes.len() >= 3 {
                    pieces.push(Fragment2D::from_loop(nodes));
                }
            }
        } else if edge_cuts == 1 {
            let mut nodes = lists[0].clone();
            nodes.extend(lists[1].iter().skip(1).copied());
            pieces.push(Fragment2D::from_loop(&nodes));
        } else if node_cuts == 1 {
            let nodes = self.loop_nodes();
            pieces.push(Fragment2D::from_loop(&nodes));
        }
        Ok(pieces)
    }

    pub fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for e in self.edges.iter_mut() {
            e.switch_node(new, old);
        }
    }

    pub fn remove_embedded_node(&mut self, node: NodeKey) {
        for e in self.edges.iter_mut() {
            e.remove_embedded_node(node);
        }
    }
}
