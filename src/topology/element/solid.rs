//! 3D element body: faces, face and face-edge neighbors, shell fragments.

use super::{Body, BoundaryTopology, CutPlane, Element, ElementId};
use crate::topology::element_kind::ElementKind;
use crate::topology::face::Face;
use crate::topology::fragment::Fragment3D;
use crate::topology::interior::VolumeNode;
use crate::topology::node::{NodeKey, NodeRegistry};
use crate::topology::parametric::{add, cross, face_interior, face_vertices, normalize, scale, sub};
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidBody {
    faces: Vec<Face>,
    /// `adjacent_faces[i][j]`: the face sharing edge `j` of face `i`.
    adjacent_faces: Vec<Vec<Option<usize>>>,
    face_neighbors: Vec<Vec<ElementId>>,
    /// Elements touching edge `j` of face `i` without sharing a face.
    face_edge_neighbors: Vec<Vec<Vec<ElementId>>>,
    fragments: Vec<Fragment3D>,
    interior_nodes: Vec<VolumeNode>,
}

impl SolidBody {
    pub(crate) fn new(kind: ElementKind, nodes: &[NodeKey]) -> Self {
        let faces: Vec<Face> = (0..kind.num_boundaries())
            .map(|i| {
                let mut face = Face::new(face_vertices(kind, i).iter().map(|&k| nodes[k]).collect());
                face.set_face_interior_nodes(
                    face_interior(kind, i).iter().map(|&k| nodes[k]).collect(),
                );
                face
            })
            .collect();
        let face_edge_neighbors = faces
            .iter()
            .map(|f| vec![Vec::new(); f.num_edges()])
            .collect();
        let mut body = Self {
            face_neighbors: vec![Vec::new(); faces.len()],
            face_edge_neighbors,
            adjacent_faces: Vec::new(),
            faces,
            fragments: Vec::new(),
            interior_nodes: Vec::new(),
        };
        body.find_faces_adjacent_to_faces();
        body
    }

    fn find_faces_adjacent_to_faces(&mut self) {
        self.adjacent_faces = (0..self.faces.len())
            .map(|i| {
                let mut adj = vec![None; self.faces[i].num_edges()];
                for j in 0..self.faces.len() {
                    if i != j {
                        if let Some(edge) = self.faces[i].adjacent_common_edge(&self.faces[j]) {
                            adj[edge] = Some(j);
                        }
                    }
                }
                adj
            })
            .collect();
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, i: usize) -> &Face {
        &self.faces[i]
    }

    pub fn adjacent_face(&self, face: usize, edge: usize) -> Option<usize> {
        self.adjacent_faces
            .get(face)
            .and_then(|a| a.get(edge).copied().flatten())
    }

    pub fn face_neighbors(&self, face: usize) -> &[ElementId] {
        &self.face_neighbors[face]
    }

    pub fn face_edge_neighbors(&self, face: usize, edge: usize) -> &[ElementId] {
        &self.face_edge_neighbors[face][edge]
    }

    pub(crate) fn push_face_edge_neighbor(&mut self, face: usize, edge: usize, neighbor: ElementId) {
        self.face_edge_neighbors[face][edge].push(neighbor);
    }

    pub fn fragments(&self) -> &[Fragment3D] {
        &self.fragments
    }

    pub fn interior_nodes(&self) -> &[VolumeNode] {
        &self.interior_nodes
    }

    /// Index of the face equivalent to `face`.
    pub fn face_id(&self, face: &Face) -> Option<usize> {
        self.faces.iter().position(|f| f.equivalent(face))
    }

    /// Faces of this element equivalent to some face of `other`.
    pub fn common_face_ids(&self, other: &SolidBody) -> Vec<usize> {
        (0..self.faces.len())
            .filter(|&i| other.faces.iter().any(|f| self.faces[i].equivalent(f)))
            .collect()
    }

    /// `(face, edge)` pairs whose edge is shared with a face of `other`
    /// that is not itself a shared face.
    pub fn common_edge_ids(&self, other: &SolidBody) -> Vec<(usize, usize)> {
        let mut ids = Vec::new();
        for (i, face) in self.faces.iter().enumerate() {
            for (j, edge) in face.edges().iter().enumerate() {
                let shared = other.faces.iter().any(|of| {
                    !face.equivalent(of) && of.edges().iter().any(|oe| edge.equivalent(oe))
                });
                if shared {
                    ids.push((i, j));
                }
            }
        }
        ids
    }

    /// One shared face with the same orientation, or more than one shared
    /// face.
    pub fn overlays(&self, other: &SolidBody) -> Result<bool, TopologyError> {
        let common = self.common_face_ids(other);
        match common.as_slice() {
            [] => Ok(false),
            [i] => {
                let mine = &self.faces[*i];
                let Some(j) = other.face_id(mine) else {
                    return Ok(false);
                };
                mine.has_same_orientation(&other.faces[j])
            }
            _ => Ok(true),
        }
    }

    /// Face and edge of `other` carrying edge `edge` of face `face`.
    pub fn neighbor_edge_index(&self, face: usize, edge: usize, other: &SolidBody) -> Option<(usize, usize)> {
        let target = self.faces[face].edge(edge);
        other.faces.iter().enumerate().find_map(|(k, of)| {
            of.edges()
                .iter()
                .position(|oe| oe.equivalent(target))
                .map(|l| (k, l))
        })
    }

    /// First fragment face lying in element face `face` (single fragment only).
    pub fn fragment_face_on(&self, face: usize) -> Option<usize> {
        match self.fragments.as_slice() {
            [frag] => frag
                .faces()
                .iter()
                .position(|ff| self.faces[face].contains_face(ff)),
            _ => None,
        }
    }

    /// Fragment face and its edge lying on edge `edge` of element face `face`.
    pub fn fragment_face_edge(&self, face: usize, edge: usize) -> Option<(usize, usize)> {
        let ff = self.fragment_face_on(face)?;
        let host_edge = self.faces[face].edge(edge);
        self.fragments[0]
            .face(ff)
            .edges()
            .iter()
            .position(|fe| host_edge.contains_edge(fe))
            .map(|fe| (ff, fe))
    }

    pub fn face_contains_tip(&self, face: usize) -> bool {
        match self.fragments.as_slice() {
            [frag] => {
                self.faces[face].has_intersection()
                    && frag
                        .faces()
                        .iter()
                        .filter(|ff| self.faces[face].contains_face(ff))
                        .count()
                        == 2
            }
            _ => false,
        }
    }

    pub fn fragment_face_already_cut(&self, face: usize) -> bool {
        self.face_contains_tip(face)
            || self
                .fragment_face_on(face)
                .is_some_and(|ff| self.fragments[0].face(ff).has_intersection())
    }

    /// A cut at `position` on edge `edge` of face `face` falls in the real
    /// part of the element.
    pub fn is_physical_edge_cut(&self, face: usize, edge: usize, position: f64) -> Result<bool, TopologyError> {
        if self.fragments.is_empty() {
            return Ok(true);
        }
        let Some((ff, fe)) = self.fragment_face_edge(face, edge) else {
            return Ok(false);
        };
        let host = self.faces[face].edge(edge);
        let frag_edge = self.fragments[0].face(ff).edge(fe);
        let x0 = host.distance_from_node0(frag_edge.node(0))?;
        let x1 = host.distance_from_node0(frag_edge.node(1))?;
        Ok((position - x0) * (position - x1) < 0.0)
    }

    /// Embedded node already at `position` on edge `edge` of face `face`.
    pub(crate) fn existing_face_edge_cut(
        &self,
        id: ElementId,
        face: usize,
        edge: usize,
        position: f64,
        embedded: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, TopologyError> {
        let cut_edge = self.faces[face].edge(edge);
        let n0 = cut_edge.node(0);
        let Some(idx) = cut_edge.embedded_node_index_at(position, n0)? else {
            return Ok(None);
        };
        let old = cut_edge.embedded_node(idx);
        if embedded.is_some() && embedded != old {
            return Err(TopologyError::ConflictingEmbeddedNode {
                elem: id,
                boundary: face,
            });
        }
        Ok(old)
    }

    /// A face edge holds at most two embedded nodes.
    pub(crate) fn check_face_edge_capacity(
        &self,
        id: ElementId,
        face: usize,
        edge: usize,
    ) -> Result<(), TopologyError> {
        if self.faces[face].edge(edge).num_embedded_nodes() >= 2 {
            return Err(TopologyError::TooManyEmbeddedNodes {
                elem: id,
                boundary: face,
                cap: 2,
            });
        }
        Ok(())
    }

    /// Record `emb` at `position` on edge `edge` of face `face`, and on the
    /// fragment face edge beneath it when that edge is still uncut.
    pub(crate) fn apply_face_edge_cut(
        &mut self,
        id: ElementId,
        face: usize,
        edge: usize,
        position: f64,
        emb: NodeKey,
    ) -> Result<(), TopologyError> {
        let frag_target = match self.fragment_face_edge(face, edge) {
            Some((ff, fe)) => {
                let host = self.faces[face].edge(edge);
                let frag_edge = self.fragments[0].face(ff).edge(fe);
                let x0 = host.distance_from_node0(frag_edge.node(0))?;
                let x1 = host.distance_from_node0(frag_edge.node(1))?;
                Some((ff, fe, (position - x0) / (x1 - x0), frag_edge.node(0)))
            }
            None => None,
        };

        self.check_face_edge_capacity(id, face, edge)?;
        let cut_edge = self.faces[face].edge_mut(edge);
        let n0 = cut_edge.node(0);
        cut_edge.add_intersection(position, emb, n0)?;

        if let Some((ff, fe, frag_pos, frag_n0)) = frag_target {
            let frag_edge = self.fragments[0].face_mut(ff).edge_mut(fe);
            if !frag_edge.has_intersection() {
                frag_edge.add_intersection(frag_pos, emb, frag_n0)?;
            }
        }
        Ok(())
    }

    /// Plane through the interior face of fragment `ichild`; the normal
    /// points away from the fragment.
    pub(crate) fn cut_plane(&self, elem: &Element, ichild: usize) -> Result<CutPlane, TopologyError> {
        let frag = &self.fragments[ichild];
        let mut plane = CutPlane::default();
        let Some(cut_face) = (0..frag.num_faces()).find(|&i| frag.is_face_interior(i, &self.faces))
        else {
            return Ok(plane);
        };
        let points = frag
            .face(cut_face)
            .nodes()
            .iter()
            .map(|&n| elem.local_coords(n))
            .collect::<Result<Vec<_>, _>>()?;
        let n = points.len() as f64;
        let center = scale(points.iter().fold([0.0; 3], |acc, &p| add(acc, p)), 1.0 / n);
        let mut normal = [0.0; 3];
        for (i, &p) in points.iter().enumerate() {
            let next = points[(i + 1) % points.len()];
            normal = add(normal, cross(sub(p, center), sub(next, center)));
        }
        plane.origin = center;
        plane.normal = normalize(scale(normal, 1.0 / n));
        Ok(plane)
    }

    pub(crate) fn inherit(&mut self, from: &SolidBody, ichild: usize) -> Result<(), TopologyError> {
        let frag = from
            .fragments
            .get(ichild)
            .cloned()
            .ok_or(TopologyError::InvalidFragment {
                detail: "child index beyond the parent's fragments",
            })?;
        self.fragments = vec![frag];
        for (mine, theirs) in self.faces.iter_mut().zip(&from.faces) {
            mine.copy_intersection(theirs)?;
        }
        self.interior_nodes = from.interior_nodes.clone();
        Ok(())
    }

    pub(crate) fn restore_from(&mut self, from: &SolidBody) -> Result<(), TopologyError> {
        self.fragments = from.fragments.clone();
        self.interior_nodes = from.interior_nodes.clone();
        for (mine, theirs) in self.faces.iter_mut().zip(&from.faces) {
            mine.copy_intersection(theirs)?;
        }
        Ok(())
    }

    /// Cut points on interior faces cut only once, that lie on no element
    /// face: the crack stopped inside the element and they cannot be split on.
    fn remove_invalid_embedded_nodes(&mut self) -> Vec<NodeKey> {
        let Some(frag) = self.fragments.first_mut() else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        for i in 0..frag.num_faces() {
            let face = frag.face(i);
            if face.num_cuts() != 1 || !frag.is_face_interior(i, &self.faces) {
                continue;
            }
            for e in face.edges() {
                for &n in e.embedded_nodes() {
                    if !removed.contains(&n) && !self.faces.iter().any(|f| f.contains_node(n)) {
                        removed.push(n);
                    }
                }
            }
        }
        for &n in &removed {
            frag.remove_embedded_node(n);
        }
        removed
    }

    fn fragment_sanity_check(
        &self,
        id: ElementId,
        old_faces: usize,
        old_cuts: usize,
    ) -> Result<(), TopologyError> {
        if self.interior_nodes.len() > 1 {
            return Err(TopologyError::FragmentSanity {
                elem: id,
                detail: format!("{} interior nodes after the split", self.interior_nodes.len()),
            });
        }
        let sizes: Vec<usize> = self.fragments.iter().map(Fragment3D::num_faces).collect();
        let total: usize = sizes.iter().sum();
        let (frags, faces) = if old_cuts == 0 {
            (1, old_faces)
        } else if self.tip_boundary().is_some() {
            (1, old_faces + old_cuts)
        } else {
            (2, old_faces + old_cuts + 2)
        };
        if sizes.len() != frags || total != faces {
            return Err(TopologyError::FragmentSanity {
                elem: id,
                detail: format!(
                    "{old_cuts} cut face(s) on {old_faces} faces gave fragment sizes {sizes:?}"
                ),
            });
        }
        Ok(())
    }
}

impl BoundaryTopology for SolidBody {
    fn num_boundaries(&self) -> usize {
        self.faces.len()
    }

    fn boundary_vertices(&self, b: usize) -> Vec<NodeKey> {
        self.faces[b].nodes().to_vec()
    }

    fn boundary_neighbors(&self, b: usize) -> &[ElementId] {
        &self.face_neighbors[b]
    }

    fn push_boundary_neighbor(&mut self, b: usize, neighbor: ElementId) {
        self.face_neighbors[b].push(neighbor);
    }

    fn clear_neighbors(&mut self) {
        for n in self.face_neighbors.iter_mut() {
            n.clear();
        }
        for per_face in self.face_edge_neighbors.iter_mut() {
            for n in per_face.iter_mut() {
                n.clear();
            }
        }
    }

    fn boundary_has_intersection(&self, b: usize) -> bool {
        self.faces[b].has_intersection()
    }

    fn boundary_embedded_nodes(&self, b: usize) -> Vec<NodeKey> {
        let mut out: Vec<NodeKey> = Vec::new();
        for e in self.faces[b].edges() {
            for &n in e.embedded_nodes() {
                if !out.contains(&n) {
                    out.push(n);
                }
            }
        }
        out.extend(self.faces[b].interior_nodes().iter().map(|f| f.node()));
        out
    }

    fn num_fragments(&self) -> usize {
        self.fragments.len()
    }

    fn fragment_contains_node(&self, node: NodeKey) -> bool {
        self.fragments.iter().any(|f| f.contains_node(node))
    }

    fn fragment_node_lists(&self, i: usize) -> Vec<Vec<NodeKey>> {
        self.fragments[i]
            .faces()
            .iter()
            .map(|f| f.nodes().to_vec())
            .collect()
    }

    fn split_line_nodes(&self) -> Vec<NodeKey> {
        match self.fragments.as_slice() {
            [a, b] => a.common_nodes(b),
            _ => Vec::new(),
        }
    }

    fn boundary_takes_split(&self, b: usize, cut_nodes: &[NodeKey]) -> bool {
        cut_nodes
            .iter()
            .filter(|&&n| self.faces[b].contains_node(n))
            .count()
            == 2
    }

    fn tip_boundary(&self) -> Option<usize> {
        match self.fragments.as_slice() {
            [frag] => frag.tip_face(&self.faces),
            _ => None,
        }
    }

    fn is_final_cut(&self) -> bool {
        self.fragments.first().is_some_and(|f| {
            (0..f.num_faces())
                .filter(|&i| f.is_face_interior(i, &self.faces))
                .count()
                == 3
        })
    }

    fn num_cuts(&self) -> usize {
        self.faces.iter().filter(|f| f.has_intersection()).count()
    }

    fn interior_node_keys(&self) -> Vec<NodeKey> {
        self.interior_nodes.iter().map(VolumeNode::node).collect()
    }

    fn boundary_masters(&self, node: NodeKey) -> Option<Vec<(NodeKey, f64)>> {
        self.faces
            .iter()
            .filter(|f| f.contains_node(node))
            .find_map(|f| f.node_masters(node))
    }

    fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for f in self.faces.iter_mut() {
            f.switch_node(new, old);
        }
        for frag in self.fragments.iter_mut() {
            frag.switch_node(new, old);
        }
        for n in self.interior_nodes.iter_mut() {
            n.switch_node(new, old);
        }
    }

    fn remove_embedded_node(&mut self, node: NodeKey) {
        for f in self.faces.iter_mut() {
            f.remove_embedded_node(node);
        }
        for frag in self.fragments.iter_mut() {
            frag.remove_embedded_node(node);
        }
        self.interior_nodes.retain(|n| n.node() != node);
    }

    fn remove_phantom_embedded_nodes(&mut self) {
        let Some(frag) = self.fragments.first() else {
            return;
        };
        for face in self.faces.iter_mut() {
            let mut phantom: Vec<NodeKey> = face
                .edges()
                .iter()
                .flat_map(|e| e.embedded_nodes().iter().copied())
                .filter(|&n| !frag.contains_node(n))
                .collect();
            phantom.extend(
                face.interior_nodes()
                    .iter()
                    .map(|f| f.node())
                    .filter(|&n| !frag.contains_node(n)),
            );
            for n in phantom {
                face.remove_embedded_node(n);
            }
        }
    }
}

impl Element {
    fn solid_parts(&mut self) -> Result<(ElementId, &mut SolidBody), TopologyError> {
        let id = self.id;
        let dim = self.dimension();
        match &mut self.body {
            Body::Solid(b) => Ok((id, b)),
            Body::Planar(_) => Err(TopologyError::MixedDimension {
                elem: id,
                expected: 3,
                found: dim,
            }),
        }
    }

    /// Re-split the single shell fragment along the faces cut this cycle.
    pub(crate) fn update_solid_fragments(
        &mut self,
        in_tip_set: bool,
        registry: &mut NodeRegistry,
    ) -> Result<(), TopologyError> {
        let vertices: Vec<NodeKey> = self.vertices().to_vec();
        let (id, body) = self.solid_parts()?;

        if in_tip_set {
            if body.fragments.len() != 1 {
                return Err(TopologyError::FragmentCount {
                    elem: id,
                    expected: 1,
                    found: body.fragments.len(),
                });
            }
            body.fragments[0].combine_tip_faces(&body.faces)?;
        }
        if body.fragments.len() == 1 {
            for node in body.remove_invalid_embedded_nodes() {
                registry.remove(node)?;
            }
        }
        if body.fragments.is_empty() {
            body.fragments.push(Fragment3D::from_faces(body.faces.clone()));
        }
        if body.fragments.len() != 1 {
            return Err(TopologyError::FragmentCount {
                elem: id,
                expected: 1,
                found: body.fragments.len(),
            });
        }

        let frag = &body.fragments[0];
        let cuts = frag.num_cuts();
        let old_faces = frag.num_faces();
        if cuts > old_faces {
            return Err(TopologyError::TooManyCuts { elem: id, cuts });
        }
        if cuts == 0 {
            let partial = vertices.iter().any(|&n| !frag.contains_node(n));
            if !partial {
                body.fragments.clear();
            }
            return Ok(());
        }

        let pieces = frag.split()?;
        if !(1..=2).contains(&pieces.len()) {
            return Err(TopologyError::FragmentCount {
                elem: id,
                expected: 2,
                found: pieces.len(),
            });
        }
        body.fragments = pieces;
        body.fragment_sanity_check(id, old_faces, cuts)
    }

    /// Re-split the fragments of this element (2D or 3D).
    pub(crate) fn update_fragments(
        &mut self,
        in_tip_set: bool,
        registry: &mut NodeRegistry,
    ) -> Result<(), TopologyError> {
        match self.body {
            Body::Planar(_) => self.update_planar_fragments(in_tip_set, registry),
            Body::Solid(_) => self.update_solid_fragments(in_tip_set, registry),
        }
    }
}
