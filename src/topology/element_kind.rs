//! Supported element types.

use serde::{Deserialize, Serialize};

/// Element type, identified at ingestion by dimension and node count.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Bilinear quadrilateral.
    Quad4,
    /// Serendipity quadrilateral (mid-side nodes 4..7).
    Quad8,
    /// Biquadratic quadrilateral (mid-side nodes 4..7, centre node 8).
    Quad9,
    /// Linear triangle.
    Tri3,
    /// Quadratic triangle (mid-side nodes 3..5).
    Tri6,
    Hex8,
    Hex20,
    Hex27,
    Tet4,
    Tet10,
}

impl ElementKind {
    /// Identify a kind from its dimension and node count.
    pub fn from_node_count(dimension: u8, num_nodes: usize) -> Option<Self> {
        match (dimension, num_nodes) {
            (2, 4) => Some(ElementKind::Quad4),
            (2, 8) => Some(ElementKind::Quad8),
            (2, 9) => Some(ElementKind::Quad9),
            (2, 3) => Some(ElementKind::Tri3),
            (2, 6) => Some(ElementKind::Tri6),
            (3, 8) => Some(ElementKind::Hex8),
            (3, 20) => Some(ElementKind::Hex20),
            (3, 27) => Some(ElementKind::Hex27),
            (3, 4) => Some(ElementKind::Tet4),
            (3, 10) => Some(ElementKind::Tet10),
            _ => None,
        }
    }

    pub fn dimension(self) -> u8 {
        match self {
            ElementKind::Quad4
            | ElementKind::Quad8
            | ElementKind::Quad9
            | ElementKind::Tri3
            | ElementKind::Tri6 => 2,
            ElementKind::Hex8
            | ElementKind::Hex20
            | ElementKind::Hex27
            | ElementKind::Tet4
            | ElementKind::Tet10 => 3,
        }
    }

    pub fn num_nodes(self) -> usize {
        match self {
            ElementKind::Quad4 => 4,
            ElementKind::Quad8 => 8,
            ElementKind::Quad9 => 9,
            ElementKind::Tri3 => 3,
            ElementKind::Tri6 => 6,
            ElementKind::Hex8 => 8,
            ElementKind::Hex20 => 20,
            ElementKind::Hex27 => 27,
            ElementKind::Tet4 => 4,
            ElementKind::Tet10 => 10,
        }
    }

    /// Corner nodes; they come first in the node list.
    pub fn num_vertices(self) -> usize {
        match self {
            ElementKind::Quad4 | ElementKind::Quad8 | ElementKind::Quad9 => 4,
            ElementKind::Tri3 | ElementKind::Tri6 => 3,
            ElementKind::Hex8 | ElementKind::Hex20 | ElementKind::Hex27 => 8,
            ElementKind::Tet4 | ElementKind::Tet10 => 4,
        }
    }

    /// Edges (2D) or faces (3D).
    pub fn num_boundaries(self) -> usize {
        match self {
            ElementKind::Quad4 | ElementKind::Quad8 | ElementKind::Quad9 => 4,
            ElementKind::Tri3 | ElementKind::Tri6 => 3,
            ElementKind::Hex8 | ElementKind::Hex20 | ElementKind::Hex27 => 6,
            ElementKind::Tet4 | ElementKind::Tet10 => 4,
        }
    }

    /// `true` for the hexahedral family.
    pub fn is_hex(self) -> bool {
        matches!(
            self,
            ElementKind::Hex8 | ElementKind::Hex20 | ElementKind::Hex27
        )
    }

    /// 2D kinds whose edges carry a mid-side node.
    pub fn has_edge_interior_nodes(self) -> bool {
        matches!(
            self,
            ElementKind::Quad8 | ElementKind::Quad9 | ElementKind::Tri6
        )
    }

    /// Nodes of each 3D face that are not face vertices.
    pub fn num_face_interior_nodes(self) -> usize {
        match self {
            ElementKind::Hex20 => 4,
            ElementKind::Hex27 => 5,
            ElementKind::Tet10 => 3,
            _ => 0,
        }
    }
}
