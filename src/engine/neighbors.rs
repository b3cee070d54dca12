//! Neighbor resolution.
//!
//! Candidates come from the inverse connectivity map (every element sharing
//! a node). A candidate becomes a boundary neighbor when the shared edge or
//! face is not an overlay and the fragments on both sides allow it:
//! - either side with more than one fragment is an inconsistency;
//! - with one fragment on each side they must share a boundary piece;
//! - otherwise the link is provisional and kept.

use super::state::MeshState;
use crate::topology::element::{Element, ElementId};
use crate::topology::node::NodeKey;
use crate::topology_error::TopologyError;
use std::collections::BTreeSet;

fn fragments_admit(
    elem: &Element,
    other: &Element,
    connected: impl FnOnce() -> bool,
) -> Result<bool, TopologyError> {
    for e in [elem, other] {
        if e.num_fragments() > 1 {
            return Err(TopologyError::FragmentCount {
                elem: e.id(),
                expected: 1,
                found: e.num_fragments(),
            });
        }
    }
    if elem.num_fragments() == 1 && other.num_fragments() == 1 {
        Ok(connected())
    } else {
        Ok(true)
    }
}

fn mixed(elem: &Element, other: &Element) -> TopologyError {
    TopologyError::MixedDimension {
        elem: other.id(),
        expected: elem.dimension(),
        found: other.dimension(),
    }
}

/// Links found for one element, applied once the read pass is over.
#[derive(Default)]
struct Links {
    boundary: Vec<(usize, ElementId)>,
    face_edge: Vec<(usize, usize, ElementId)>,
}

impl MeshState {
    /// Live elements sharing at least one node with `id`, ascending.
    pub(crate) fn general_neighbors_of(&self, id: ElementId) -> Result<Vec<ElementId>, TopologyError> {
        let elem = self.element(id)?;
        let mut out = BTreeSet::new();
        for n in elem.nodes() {
            if let Some(users) = self.inverse.get(n) {
                out.extend(users.iter().copied().filter(|e| self.elements.contains_key(e)));
            }
        }
        out.remove(&id);
        Ok(out.into_iter().collect())
    }

    /// Rebuild every boundary neighbor list, then check symmetry.
    pub fn update_edge_neighbors(&mut self) -> Result<(), TopologyError> {
        for elem in self.elements.values_mut() {
            elem.clear_neighbors();
        }
        let ids = self.element_ids();
        for &id in &ids {
            self.setup_neighbors(id)?;
        }
        for &id in &ids {
            self.neighbor_sanity_check(id)?;
        }
        log::debug!("neighbors rebuilt for {} elements", ids.len());
        Ok(())
    }

    fn setup_neighbors(&mut self, id: ElementId) -> Result<(), TopologyError> {
        let general = self.general_neighbors_of(id)?;
        let links = if self.element(id)?.planar().is_some() {
            self.planar_links(id, &general)?
        } else {
            self.solid_links(id, &general)?
        };

        let elem = self.element_mut(id)?;
        elem.set_general_neighbors(general);
        for (b, nb) in links.boundary {
            if elem.boundary_neighbors(b).len() >= 2 {
                return Err(TopologyError::TooManyNeighbors { elem: id, boundary: b });
            }
            elem.topo_mut().push_boundary_neighbor(b, nb);
        }
        if let Some(body) = elem.solid_mut() {
            for (f, e, nb) in links.face_edge {
                body.push_face_edge_neighbor(f, e, nb);
            }
        }
        Ok(())
    }

    /// Edges whose two nodes are shared with a neighbor.
    fn planar_links(&self, id: ElementId, general: &[ElementId]) -> Result<Links, TopologyError> {
        let elem = self.element(id)?;
        let mut links = Links::default();
        let Some(body) = elem.planar() else {
            return Ok(links);
        };
        for &nb_id in general {
            let nb = self.element(nb_id)?;
            if nb.planar().is_none() {
                return Err(mixed(elem, nb));
            }
            let common: BTreeSet<NodeKey> = elem
                .nodes()
                .iter()
                .copied()
                .filter(|&n| nb.contains_node(n))
                .collect();
            if common.len() < 2 {
                continue;
            }
            let mut overlays = None;
            for (j, edge) in body.edges().iter().enumerate() {
                if !edge.nodes().iter().all(|n| common.contains(n)) {
                    continue;
                }
                let overlaid = match overlays {
                    Some(o) => o,
                    None => *overlays.insert(elem.overlays(nb)?),
                };
                if overlaid {
                    continue;
                }
                if fragments_admit(elem, nb, || elem.fragments_connected(nb))? {
                    links.boundary.push((j, nb_id));
                }
            }
        }
        Ok(links)
    }

    /// One shared face makes a face neighbor; shared edges without a shared
    /// face make face-edge neighbors.
    fn solid_links(&self, id: ElementId, general: &[ElementId]) -> Result<Links, TopologyError> {
        let elem = self.element(id)?;
        let mut links = Links::default();
        let Some(body) = elem.solid() else {
            return Ok(links);
        };
        for &nb_id in general {
            let nb = self.element(nb_id)?;
            let nb_body = nb.solid().ok_or_else(|| mixed(elem, nb))?;
            let common_faces = body.common_face_ids(nb_body);
            match common_faces.as_slice() {
                [] => {
                    let common_edges = body.common_edge_ids(nb_body);
                    if common_edges.is_empty() || elem.overlays(nb)? {
                        continue;
                    }
                    let edge_connected = || match (body.fragments().first(), nb_body.fragments().first()) {
                        (Some(a), Some(b)) => a.is_edge_connected(b),
                        _ => false,
                    };
                    if fragments_admit(elem, nb, edge_connected)? {
                        links
                            .face_edge
                            .extend(common_edges.into_iter().map(|(f, e)| (f, e, nb_id)));
                    }
                }
                [face] => {
                    if elem.overlays(nb)? {
                        continue;
                    }
                    if fragments_admit(elem, nb, || elem.fragments_connected(nb))? {
                        links.boundary.push((*face, nb_id));
                    }
                }
                _ => {}
            }
        }
        Ok(links)
    }

    /// Every neighbor of `id` must list `id` back.
    fn neighbor_sanity_check(&self, id: ElementId) -> Result<(), TopologyError> {
        let elem = self.element(id)?;
        for b in 0..elem.num_boundaries() {
            for &nb in elem.boundary_neighbors(b) {
                self.element(nb)?.neighbor_index(id)?;
            }
        }
        if let Some(body) = elem.solid() {
            for f in 0..body.num_faces() {
                for e in 0..body.face(f).num_edges() {
                    for &nb in body.face_edge_neighbors(f, e) {
                        let lists_back = self.element(nb)?.solid().is_some_and(|other| {
                            (0..other.num_faces()).any(|g| {
                                (0..other.face(g).num_edges())
                                    .any(|k| other.face_edge_neighbors(g, k).contains(&id))
                            })
                        });
                        if !lists_back {
                            return Err(TopologyError::AsymmetricNeighbor { elem: id, neighbor: nb });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
