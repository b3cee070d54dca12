//! Solid fragments: closed shells of boundary faces.

use crate::topology::face::Face;
use crate::topology::node::NodeKey;
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The physically real part of a 3D element as a closed shell of faces.
///
/// `adjacent[i][j]` is the face sharing edge `j` of face `i`, if any.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment3D {
    faces: Vec<Face>,
    adjacent: Vec<Vec<Option<usize>>>,
}

impl Fragment3D {
    pub fn from_faces(faces: Vec<Face>) -> Self {
        let mut frag = Self {
            faces,
            adjacent: Vec::new(),
        };
        frag.find_faces_adjacent_to_faces();
        frag
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, i: usize) -> &Face {
        &self.faces[i]
    }

    pub fn face_mut(&mut self, i: usize) -> &mut Face {
        &mut self.faces[i]
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn adjacent_face(&self, face: usize, edge: usize) -> Option<usize> {
        self.adjacent.get(face).and_then(|a| a.get(edge).copied().flatten())
    }

    fn find_faces_adjacent_to_faces(&mut self) {
        self.adjacent = (0..self.faces.len())
            .map(|i| {
                let mut adj = vec![None; self.faces[i].num_edges()];
                for j in 0..self.faces.len() {
                    if i == j {
                        continue;
                    }
                    if let Some(edge) = self.faces[i].adjacent_common_edge(&self.faces[j]) {
                        adj[edge] = Some(j);
                    }
                }
                adj
            })
            .collect();
    }

    pub fn all_nodes(&self) -> BTreeSet<NodeKey> {
        self.faces
            .iter()
            .flat_map(|f| f.nodes().iter().copied())
            .collect()
    }

    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.faces.iter().any(|f| f.contains_node(node))
    }

    /// Two fragments are connected when they share a face.
    pub fn is_connected(&self, other: &Fragment3D) -> bool {
        self.faces
            .iter()
            .any(|a| other.faces.iter().any(|b| a.equivalent(b)))
    }

    /// Two fragments are edge-connected when they share a face edge.
    pub fn is_edge_connected(&self, other: &Fragment3D) -> bool {
        self.faces.iter().any(|a| {
            a.edges()
                .iter()
                .any(|e| other.faces.iter().any(|b| b.owns_edge(e)))
        })
    }

    pub fn common_nodes(&self, other: &Fragment3D) -> Vec<NodeKey> {
        let mine = self.all_nodes();
        other
            .all_nodes()
            .into_iter()
            .filter(|n| mine.contains(n))
            .collect()
    }

    /// `true` when face `i` lies in no host face.
    pub fn is_face_interior(&self, i: usize, host_faces: &[Face]) -> bool {
        !host_faces.iter().any(|h| h.contains_face(&self.faces[i]))
    }

    /// Faces cut through (two or more cut edges).
    pub fn num_cuts(&self) -> usize {
        self.faces.iter().filter(|f| f.has_intersection()).count()
    }

    pub fn has_face_with_one_cut(&self) -> bool {
        self.faces.iter().any(|f| f.num_cuts() == 1)
    }

    /// Host face holding two fragment faces: the crack-tip configuration.
    pub fn tip_face(&self, host_faces: &[Face]) -> Option<usize> {
        host_faces.iter().position(|h| {
            h.has_intersection() && self.faces.iter().filter(|f| h.contains_face(f)).count() == 2
        })
    }

    /// Merge the fragment faces lying pairwise on a host face back into one.
    pub fn combine_tip_faces(&mut self, host_faces: &[Face]) -> Result<(), TopologyError> {
        for host in host_faces {
            let ids: Vec<usize> = (0..self.faces.len())
                .filter(|&j| host.contains_face(&self.faces[j]))
                .collect();
            if ids.len() != 2 {
                continue;
            }
            let mut full = self.faces[ids[0]].combine_with(&self.faces[ids[1]])?;
            full.reset_edge_intersection(host)?;
            self.faces[ids[0]] = full;
            self.faces.remove(ids[1]);
        }
        self.find_faces_adjacent_to_faces();
        Ok(())
    }

    /// Split every face along its cuts and regroup the pieces.
    ///
    /// With a face cut only once the crack stops inside the element: all
    /// pieces form a single fragment. Otherwise the pieces are gathered into
    /// two connected shells, each closed by a new cutting face.
    pub fn split(&self) -> Result<Vec<Fragment3D>, TopologyError> {
        let subfaces = self
            .faces
            .iter()
            .map(Face::split)
            .collect::<Result<Vec<_>, _>>()?;

        if self.has_face_with_one_cut() {
            let faces = subfaces.into_iter().flatten().collect();
            return Ok(vec![Fragment3D::from_faces(faces)]);
        }

        let start = subfaces
            .iter()
            .position(|s| s.len() == 2)
            .ok_or(TopologyError::InvalidFragment {
                detail: "no face is cut through",
            })?;
        let first = Self::connect_subfaces(&subfaces[start][0], start, &subfaces)?;
        let second = Self::connect_subfaces(&subfaces[start][1], start, &subfaces)?;
        Ok(vec![first, second])
    }

    /// Grow a shell from `start_face` by repeatedly taking, from each
    /// not yet used original face, the piece adjacent to the shell; then
    /// close it with a face over the edges left without a partner.
    fn connect_subfaces(
        start_face: &Face,
        start_id: usize,
        subfaces: &[Vec<Face>],
    ) -> Result<Fragment3D, TopologyError> {
        let mut used = vec![false; subfaces.len()];
        used[start_id] = true;
        let mut faces = vec![start_face.clone()];
        loop {
            let before = faces.len();
            for (i, pieces) in subfaces.iter().enumerate() {
                if used[i] {
                    continue;
                }
                if let Some(piece) = pieces
                    .iter()
                    .find(|p| faces.iter().any(|f| p.is_adjacent(f)))
                {
                    used[i] = true;
                    faces.push(piece.clone());
                }
            }
            if faces.len() == before {
                break;
            }
        }

        let shell = Fragment3D::from_faces(faces);
        let mut lonely = Vec::new();
        for (i, face) in shell.faces.iter().enumerate() {
            for (j, edge) in face.edges().iter().enumerate() {
                if shell.adjacent_face(i, j).is_none() {
                    lonely.push(edge.clone());
                }
            }
        }
        let cut_face = Face::from_loose_edges(lonely)?;
        let mut faces = shell.faces;
        faces.push(cut_face);
        Ok(Fragment3D::from_faces(faces))
    }

    pub fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for f in self.faces.iter_mut() {
            f.switch_node(new, old);
        }
    }

    pub fn remove_embedded_node(&mut self, node: NodeKey) {
        for f in self.faces.iter_mut() {
            f.remove_embedded_node(node);
        }
    }
}
