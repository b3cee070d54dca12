//! Cut recording with propagation to neighbors, and the fragment update.
//!
//! A 2D edge cut is recorded on the element and then on every edge
//! neighbor at the mirrored position `1 - x`, reusing the same embedded
//! node. A 3D face-edge cut additionally reaches the adjacent face of the
//! same element and every element sharing the face or only the edge.
//!
//! Skippable conditions on the element itself are reported to the caller
//! after propagation; on a neighbor they are logged and dropped.

use super::state::MeshState;
use crate::topology::element::ElementId;
use crate::topology::node::{NodeCategory, NodeKey};
use crate::topology_error::TopologyError;

/// Log and drop a skippable error raised on a neighbor.
fn drop_skippable(res: Result<(), TopologyError>, on: ElementId) -> Result<(), TopologyError> {
    match res {
        Err(e) if e.is_skippable() => {
            log::debug!("cut propagated to element {on} dropped: {e}");
            Ok(())
        }
        other => other,
    }
}

impl MeshState {
    fn check_dimension(&self, id: ElementId, dim: u8) -> Result<(), TopologyError> {
        let found = self.element(id)?.dimension();
        if found != dim {
            return Err(TopologyError::MixedDimension {
                elem: id,
                expected: dim,
                found,
            });
        }
        Ok(())
    }

    /// Refuse new cuts on an element that is already fully cut.
    fn check_cuttable(&self, id: ElementId) -> Result<(), TopologyError> {
        let elem = self.element(id)?;
        if elem.is_final_cut() || elem.num_fragments() > 1 {
            return Err(TopologyError::FinalCutReached { elem: id });
        }
        Ok(())
    }

    /// Cut edge `edge` of 2D element `id` at `position` (from the edge's
    /// first node) and mirror the cut onto its edge neighbors.
    pub fn mark_edge_cut(&mut self, id: ElementId, edge: usize, position: f64) -> Result<(), TopologyError> {
        self.check_dimension(id, 2)?;
        self.element(id)?.check_boundary(edge)?;
        self.check_cuttable(id)?;
        self.add_edge_cut(id, edge, position, None, true)
    }

    fn add_edge_cut(
        &mut self,
        id: ElementId,
        edge: usize,
        position: f64,
        embedded: Option<NodeKey>,
        add_to_neighbor: bool,
    ) -> Result<(), TopologyError> {
        let record = {
            let Self { elements, nodes, .. } = self;
            let elem = elements
                .get_mut(&id)
                .ok_or(TopologyError::ElementNotFound { id })?;
            elem.record_edge_cut(edge, position, embedded, nodes)?
        };

        if add_to_neighbor {
            let elem = self.element(id)?;
            let n0 = elem
                .planar()
                .map(|b| b.edge(edge).node(0))
                .ok_or(TopologyError::NodeNotFound { node: NodeKey::Local(0) })?;
            let neighbors = elem.boundary_neighbors(edge).to_vec();
            for nb in neighbors {
                let other = self.element(nb)?;
                let nb_edge = other.neighbor_index(id)?;
                let same_direction = other
                    .planar()
                    .is_some_and(|b| b.edge(nb_edge).node(0) == n0);
                if same_direction {
                    return Err(TopologyError::SameEdgeDirection { elem: id, neighbor: nb });
                }
                let res = self.add_edge_cut(nb, nb_edge, 1.0 - position, record.embedded, false);
                drop_skippable(res, nb)?;
            }
        }

        match record.skipped {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Turn corner `local_node` of 2D element `id` into a cut point.
    ///
    /// The node keeps its id and becomes embedded-permanent for every
    /// element sharing it. Only accepted before the element has fragments.
    pub fn mark_node_cut(&mut self, id: ElementId, local_node: usize) -> Result<(), TopologyError> {
        self.check_dimension(id, 2)?;
        let elem = self.element(id)?;
        if local_node >= elem.num_nodes() {
            return Err(TopologyError::NodeNotFound {
                node: NodeKey::Local(local_node as u32),
            });
        }
        if elem.num_fragments() != 0 {
            return Err(TopologyError::NodeCutAfterFragment { elem: id });
        }
        let node = elem.node(local_node);
        self.nodes.promote_to_embedded_permanent(node)
    }

    /// Cut interior edge `frag_edge` of the single fragment of 2D element
    /// `id` at `position`.
    pub fn mark_fragment_edge_cut(
        &mut self,
        id: ElementId,
        frag_edge: usize,
        position: f64,
    ) -> Result<(), TopologyError> {
        self.check_dimension(id, 2)?;
        self.check_cuttable(id)?;
        let Self { elements, nodes, .. } = self;
        let elem = elements
            .get_mut(&id)
            .ok_or(TopologyError::ElementNotFound { id })?;
        elem.record_fragment_edge_cut(frag_edge, position, nodes)
    }

    /// Cut face `face` of 3D element `id` through two of its edges.
    ///
    /// Each edge cut is shared with the adjacent face of the element and
    /// propagated to every element touching that face or edge.
    pub fn mark_face_cut(
        &mut self,
        id: ElementId,
        face: usize,
        edges: [usize; 2],
        positions: [f64; 2],
    ) -> Result<(), TopologyError> {
        self.check_dimension(id, 3)?;
        self.element(id)?.check_boundary(face)?;
        self.check_cuttable(id)?;
        let first = self.add_face_edge_cut(id, face, edges[0], positions[0], None, true, true);
        if first.as_ref().is_err_and(|e| !e.is_skippable()) {
            return first;
        }
        let second = self.add_face_edge_cut(id, face, edges[1], positions[1], None, true, true);
        if second.as_ref().is_err_and(|e| !e.is_skippable()) {
            return second;
        }
        first.and(second)
    }

    /// Cuts on interior fragment faces of a 3D element are not recorded;
    /// the element is only checked.
    pub fn mark_fragment_face_cut(
        &mut self,
        id: ElementId,
        frag_face: usize,
    ) -> Result<(), TopologyError> {
        self.check_dimension(id, 3)?;
        self.check_cuttable(id)?;
        log::debug!("element {id}: fragment face {frag_face} cut ignored");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn add_face_edge_cut(
        &mut self,
        id: ElementId,
        face: usize,
        edge: usize,
        position: f64,
        embedded: Option<NodeKey>,
        add_to_neighbor: bool,
        add_to_adjacent: bool,
    ) -> Result<(), TopologyError> {
        let invalid = |detail| TopologyError::InvalidCut { elem: id, detail };
        let elem = self.element(id)?;
        elem.check_boundary(face)?;
        let body = elem.solid().ok_or(TopologyError::MixedDimension {
            elem: id,
            expected: 3,
            found: elem.dimension(),
        })?;
        let count = body.face(face).num_edges();
        if edge >= count {
            return Err(TopologyError::BoundaryOutOfRange { elem: id, index: edge, count });
        }
        let n0 = body.face(face).edge(edge).node(0);
        let adj = body
            .adjacent_face(face, edge)
            .ok_or_else(|| invalid("face edge has no adjacent face"))?;
        let adj_edge = body
            .face(adj)
            .adjacent_common_edge(body.face(face))
            .ok_or_else(|| invalid("adjacent faces share no edge"))?;

        let existing = body.existing_face_edge_cut(id, face, edge, position, embedded)?;
        let mut local = embedded.or(existing);
        let mut skipped = None;
        if existing.is_none() {
            if body.fragment_face_already_cut(face) {
                skipped = Some(TopologyError::FragmentAlreadyCut { elem: id, edge: face });
            } else if !body.is_physical_edge_cut(face, edge, position)? {
                skipped = Some(TopologyError::PhantomIntersection { elem: id, edge: face });
            } else {
                body.check_face_edge_capacity(id, face, edge)?;
                local = self.neighbor_face_cut(id, face, edge, position, n0, embedded, local)?;
                local = self.neighbor_face_cut(id, adj, adj_edge, position, n0, embedded, local)?;
                let emb = match local {
                    Some(e) => e,
                    None => self.nodes.create(NodeCategory::Embedded, None),
                };
                local = Some(emb);
                self.element_mut(id)?
                    .solid_mut()
                    .ok_or_else(|| invalid("element lost its solid body"))?
                    .apply_face_edge_cut(id, face, edge, position, emb)?;
                if add_to_adjacent {
                    let res = self.add_face_edge_cut(id, adj, adj_edge, 1.0 - position, Some(emb), false, false);
                    drop_skippable(res, id)?;
                }
            }
        }

        if add_to_neighbor {
            let elem = self.element(id)?;
            let body = elem.solid().ok_or_else(|| invalid("element lost its solid body"))?;
            let mine = body.face(face).edge(edge).clone();
            let mut targets = Vec::new();
            for &nb in body.face_neighbors(face) {
                let other = self.element(nb)?;
                let nb_face = other.neighbor_index(id)?;
                let nb_body = other.solid().ok_or_else(|| invalid("neighbor is not solid"))?;
                let nb_edge = nb_body
                    .face(nb_face)
                    .edges()
                    .iter()
                    .position(|e| e.equivalent(&mine))
                    .ok_or(TopologyError::NodeNotOnBoundary { node: n0 })?;
                targets.push((nb, nb_face, nb_edge, 1.0 - position));
            }
            for &nb in body.face_edge_neighbors(face, edge) {
                let other = self.element(nb)?;
                let nb_body = other.solid().ok_or_else(|| invalid("neighbor is not solid"))?;
                let (nf, ne) = body
                    .neighbor_edge_index(face, edge, nb_body)
                    .ok_or(TopologyError::AsymmetricNeighbor { elem: nb, neighbor: id })?;
                let theirs = nb_body.face(nf).edge(ne);
                let pos = if mine.node(0) == theirs.node(0) {
                    position
                } else if mine.node(1) == theirs.node(0) {
                    1.0 - position
                } else {
                    return Err(TopologyError::InvalidCut {
                        elem: nb,
                        detail: "shared edge nodes do not match",
                    });
                };
                targets.push((nb, nf, ne, pos));
            }
            for (nb, nf, ne, pos) in targets {
                let res = self.add_face_edge_cut(nb, nf, ne, pos, local, false, true);
                drop_skippable(res, nb)?;
            }
        }

        match skipped {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Embedded node already recorded at the same spot by a face neighbor
    /// of `id` across `face`. `position` is measured from `from_node`.
    #[allow(clippy::too_many_arguments)]
    fn neighbor_face_cut(
        &self,
        id: ElementId,
        face: usize,
        edge: usize,
        position: f64,
        from_node: NodeKey,
        embedded: Option<NodeKey>,
        mut local: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, TopologyError> {
        let elem = self.element(id)?;
        let Some(body) = elem.solid() else {
            return Ok(local);
        };
        let target = body.face(face).edge(edge);
        for &nb in body.face_neighbors(face) {
            let other = self.element(nb)?;
            let Some(nb_body) = other.solid() else {
                continue;
            };
            let nb_face = other.neighbor_index(id)?;
            let Some(nb_edge) = nb_body
                .face(nb_face)
                .edges()
                .iter()
                .find(|e| e.equivalent(target))
            else {
                continue;
            };
            if !nb_edge.has_intersection_at_position(position, from_node)? {
                continue;
            }
            let Some(old) = nb_edge
                .embedded_node_index_at(position, from_node)?
                .and_then(|i| nb_edge.embedded_node(i))
            else {
                continue;
            };
            if embedded.is_some_and(|e| e != old) || local.is_some_and(|l| l != old) {
                return Err(TopologyError::ConflictingEmbeddedNode {
                    elem: nb,
                    boundary: nb_face,
                });
            }
            local = Some(old);
        }
        Ok(local)
    }

    /// Re-split every element along the cuts recorded this cycle.
    pub fn update_physical_links_and_fragments(&mut self) -> Result<(), TopologyError> {
        let Self {
            elements,
            nodes,
            crack_tip,
            ..
        } = self;
        for (id, elem) in elements.iter_mut() {
            elem.update_fragments(crack_tip.contains(id), nodes)?;
        }
        log::debug!("fragments updated for {} elements", elements.len());
        Ok(())
    }
}
