//! Connecting new children to the children of their parent's neighbors.
//!
//! Across a cut boundary, children whose first fragments touch share the
//! boundary nodes. Across an uncut boundary, phantom nodes duplicated from
//! the same parent node are shared when `merge_phantom_edges` is set. Any
//! temporary node left afterwards becomes a new permanent node (or falls
//! back to its parent when nothing else uses that parent).

use super::options::TopologyUpdateOptions;
use super::state::MeshState;
use crate::topology::element::{Body, Element, ElementId};
use crate::topology::node::{NodeCategory, NodeKey};
use crate::topology_error::TopologyError;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Node position on a boundary: a corner or a boundary-interior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Vertex(usize),
    Interior(usize),
}

fn slot_node(elem: &Element, b: usize, slot: Slot) -> Option<NodeKey> {
    match (elem.body(), slot) {
        (Body::Planar(p), Slot::Vertex(i)) => p.edges().get(b).map(|e| e.node(i)),
        (Body::Planar(p), Slot::Interior(_)) => p.edges().get(b).and_then(|e| e.interior_node()),
        (Body::Solid(s), Slot::Vertex(i)) => s.faces().get(b).and_then(|f| f.nodes().get(i).copied()),
        (Body::Solid(s), Slot::Interior(i)) => s
            .faces()
            .get(b)
            .and_then(|f| f.face_interior_nodes().get(i).copied()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Permanent,
    Temp,
    Other,
}

impl MeshState {
    fn role(&self, node: NodeKey) -> Result<Role, TopologyError> {
        Ok(match self.nodes.category(node)? {
            NodeCategory::Permanent | NodeCategory::EmbeddedPermanent => Role::Permanent,
            NodeCategory::Temp => Role::Temp,
            _ => Role::Other,
        })
    }

    /// Replace `old` by `new` in element `id`, its parent, and every child
    /// of the parent's general neighbors.
    pub(crate) fn switch_node_descend(
        &mut self,
        id: ElementId,
        new: NodeKey,
        old: NodeKey,
    ) -> Result<(), TopologyError> {
        let elem = self.element_mut(id)?;
        elem.switch_node(new, old);
        let Some(parent) = elem.parent() else {
            return Ok(());
        };
        let parent = self.element_mut(parent)?;
        parent.switch_node(new, old);
        let general = parent.general_neighbors().to_vec();
        for nb in general {
            let Some(nb) = self.elements.get(&nb) else {
                continue;
            };
            for child in nb.children().to_vec() {
                if let Some(c) = self.elements.get_mut(&child) {
                    c.switch_node(new, old);
                }
            }
        }
        Ok(())
    }

    /// Make `child_node` of element `child` and `nb_node` of element
    /// `nb_child` one node.
    ///
    /// A permanent node absorbs a temporary one, or another permanent node
    /// duplicated from it (or from the same parent). Two temporary nodes
    /// with the same parent become one new permanent node.
    pub(crate) fn merge_nodes(
        &mut self,
        child: ElementId,
        child_node: NodeKey,
        nb_child: ElementId,
        nb_node: NodeKey,
    ) -> Result<(), TopologyError> {
        if child_node == nb_node {
            return Ok(());
        }
        log::trace!("merge {child_node} of element {child} with {nb_node} of element {nb_child}");
        let conflict = TopologyError::MergeConflict {
            elem: child,
            node: child_node,
            other: nb_node,
        };
        let child_parent = self.nodes.parent(child_node);
        let nb_parent = self.nodes.parent(nb_node);
        match (self.role(child_node)?, self.role(nb_node)?) {
            (Role::Permanent, Role::Permanent) => {
                if nb_parent == Some(child_node) {
                    self.switch_node_descend(nb_child, child_node, nb_node)?;
                    self.nodes.remove(nb_node)
                } else if child_parent == Some(nb_node) {
                    self.switch_node_descend(child, nb_node, child_node)?;
                    self.nodes.remove(child_node)
                } else if child_parent.is_some() && child_parent == nb_parent {
                    self.switch_node_descend(nb_child, child_node, nb_node)?;
                    self.nodes.remove(nb_node)
                } else {
                    Err(conflict)
                }
            }
            (Role::Permanent, Role::Temp) => {
                if nb_parent != Some(child_node) && nb_parent != child_parent {
                    return Err(conflict);
                }
                self.switch_node_descend(nb_child, child_node, nb_node)?;
                self.nodes.remove(nb_node)
            }
            (Role::Temp, Role::Permanent) => {
                if child_parent != Some(nb_node) && child_parent != nb_parent {
                    return Err(conflict);
                }
                self.switch_node_descend(child, nb_node, child_node)?;
                self.nodes.remove(child_node)
            }
            (Role::Temp, Role::Temp) => {
                if child_parent != nb_parent {
                    return Err(conflict);
                }
                let merged = self.nodes.create(NodeCategory::Permanent, child_parent);
                self.switch_node_descend(child, merged, child_node)?;
                self.switch_node_descend(nb_child, merged, nb_node)?;
                self.nodes.remove(child_node)?;
                self.nodes.remove(nb_node)
            }
            _ => Err(conflict),
        }
    }

    /// Matching node slots on boundary `b` of `parent` and boundary `nb_b`
    /// of its neighbor `nb`. 2D edges run opposite ways; 3D faces are
    /// matched node by node.
    fn slot_pairs(
        &self,
        parent: ElementId,
        b: usize,
        nb: ElementId,
        nb_b: usize,
    ) -> Result<Vec<(Slot, Slot)>, TopologyError> {
        let parent_elem = self.element(parent)?;
        let nb_elem = self.element(nb)?;
        match (parent_elem.body(), nb_elem.body()) {
            (Body::Planar(_), Body::Planar(_)) => Ok(vec![
                (Slot::Vertex(0), Slot::Vertex(1)),
                (Slot::Vertex(1), Slot::Vertex(0)),
                (Slot::Interior(0), Slot::Interior(0)),
            ]),
            (Body::Solid(p), Body::Solid(n)) => {
                let mine = p.face(b);
                let theirs = n.face(nb_b);
                let mut pairs = Vec::new();
                for (i, &node) in mine.nodes().iter().enumerate() {
                    let k = theirs
                        .nodes()
                        .iter()
                        .position(|&x| x == node)
                        .ok_or(TopologyError::NodeNotOnBoundary { node })?;
                    pairs.push((Slot::Vertex(i), Slot::Vertex(k)));
                }
                for (i, &node) in mine.face_interior_nodes().iter().enumerate() {
                    let k = theirs
                        .face_interior_nodes()
                        .iter()
                        .position(|&x| x == node)
                        .ok_or(TopologyError::NodeNotOnBoundary { node })?;
                    pairs.push((Slot::Interior(i), Slot::Interior(k)));
                }
                Ok(pairs)
            }
            _ => Err(TopologyError::MixedDimension {
                elem: nb,
                expected: parent_elem.dimension(),
                found: nb_elem.dimension(),
            }),
        }
    }

    /// Merge the boundary nodes of new child `id` with the children of its
    /// parent's neighbors, then turn its remaining temporary nodes into
    /// permanent ones.
    pub(crate) fn connect_neighbors(
        &mut self,
        id: ElementId,
        options: &TopologyUpdateOptions,
    ) -> Result<(), TopologyError> {
        let child = self.element(id)?;
        let parent_id = child.parent().ok_or_else(|| TopologyError::FragmentSanity {
            elem: id,
            detail: "child element has no parent".to_string(),
        })?;
        let dim = child.dimension();

        for j in 0..child.num_boundaries() {
            let neighbors = self.element(parent_id)?.boundary_neighbors(j).to_vec();
            for nb in neighbors {
                let nb_elem = self.element(nb)?;
                let nb_j = nb_elem.neighbor_index(parent_id)?;
                let nb_children = nb_elem.children().to_vec();
                let pairs = self.slot_pairs(parent_id, j, nb, nb_j)?;
                let cut = self.element(id)?.topo().boundary_has_intersection(j);

                for c in nb_children {
                    let (child, other) = (self.element(id)?, self.element(c)?);
                    let equivalent = child.boundary_equivalent(j, other, nb_j);
                    let merge_all = if cut {
                        if equivalent || !child.fragments_connected(other) {
                            continue;
                        }
                        true
                    } else {
                        let other_cut = other.topo().boundary_has_intersection(nb_j);
                        if !options.merge_phantom_edges || other_cut || (dim == 3 && equivalent) {
                            continue;
                        }
                        false
                    };
                    for &(mine, theirs) in &pairs {
                        if !merge_all && matches!(mine, Slot::Interior(_)) {
                            continue;
                        }
                        let (child, other) = (self.element(id)?, self.element(c)?);
                        let (Some(a), Some(b)) = (slot_node(child, j, mine), slot_node(other, nb_j, theirs)) else {
                            continue;
                        };
                        if !merge_all {
                            let pa = self.nodes.parent(a);
                            if pa.is_none() || pa != self.nodes.parent(b) {
                                continue;
                            }
                        }
                        self.merge_nodes(id, a, c, b)?;
                    }
                }
            }
        }

        self.resolve_temp_nodes(id, parent_id)
    }

    /// Temporary nodes nobody merged with: fall back to the parent node if
    /// this is its only element and the parent was not split, else become
    /// a new permanent node. Temporary nodes are never shared, so only this
    /// element is switched.
    fn resolve_temp_nodes(&mut self, id: ElementId, parent_id: ElementId) -> Result<(), TopologyError> {
        let parent_frags = self.element(parent_id)?.num_fragments();
        let mut temps = Vec::new();
        for &n in self.element(id)?.nodes() {
            if self.nodes.category(n)? == NodeCategory::Temp {
                temps.push(n);
            }
        }
        for temp in temps {
            let origin = self
                .nodes
                .parent(temp)
                .ok_or(TopologyError::OrphanNewNode { node: temp })?;
            let lone = self.inverse.get(&origin).is_some_and(|users| users.len() == 1);
            let replacement = if parent_frags == 1 && lone {
                origin
            } else {
                self.nodes.create(NodeCategory::Permanent, Some(origin))
            };
            self.element_mut(id)?.switch_node(replacement, temp);
            self.nodes.remove(temp)?;
        }
        Ok(())
    }

    /// A 2D child whose node was duplicated from a cut node takes the
    /// duplicate in place of the cut node everywhere in the element.
    pub(crate) fn update_fragment_node(&mut self, id: ElementId) -> Result<(), TopologyError> {
        let elem = self.element(id)?;
        if elem.dimension() != 2 {
            return Ok(());
        }
        let mut swaps = Vec::new();
        for &n in elem.nodes() {
            let Some(parent) = self.nodes.parent(n) else {
                continue;
            };
            if self.nodes.category(parent)? == NodeCategory::EmbeddedPermanent {
                swaps.push((n, parent));
            }
        }
        let elem = self.element_mut(id)?;
        for (node, parent) in swaps {
            elem.switch_node(node, parent);
        }
        Ok(())
    }

    /// Give every child after the first its own copy of the cut points on
    /// boundaries without neighbors.
    pub(crate) fn duplicate_embedded_nodes(&mut self, id: ElementId) -> Result<(), TopologyError> {
        let child = self.element(id)?;
        let Some(parent_id) = child.parent() else {
            return Ok(());
        };
        let parent = self.element(parent_id)?;
        if parent.children().first() == Some(&id) {
            return Ok(());
        }
        let (free, linked): (Vec<usize>, Vec<usize>) =
            (0..child.num_boundaries()).partition(|&b| parent.boundary_neighbors(b).is_empty());
        let shared: Vec<NodeKey> = linked
            .into_iter()
            .flat_map(|b| child.topo().boundary_embedded_nodes(b))
            .collect();
        let owned: Vec<NodeKey> = free
            .into_iter()
            .flat_map(|b| child.topo().boundary_embedded_nodes(b))
            .filter(|n| !shared.contains(n))
            .unique()
            .collect();
        for old in owned {
            let copy = self.nodes.create(NodeCategory::Embedded, None);
            self.element_mut(id)?.switch_node(copy, old);
        }
        Ok(())
    }

    /// New permanent nodes whose parent node no longer appears in any
    /// child element: the first one per parent is switched back to the
    /// parent and dropped.
    pub(crate) fn clear_potential_isolated_nodes(&mut self) -> Result<(), TopologyError> {
        let mut isolated: BTreeMap<NodeKey, Vec<NodeKey>> = BTreeMap::new();
        for &node in &self.new_nodes {
            let parent = self
                .nodes
                .parent(node)
                .ok_or(TopologyError::OrphanNewNode { node })?;
            let used = self
                .child_elements
                .iter()
                .filter_map(|c| self.elements.get(c))
                .any(|e| e.contains_node(parent));
            if !used {
                isolated.entry(parent).or_default().push(node);
            }
        }
        for (parent, nodes) in isolated {
            let Some(&node) = nodes.first() else {
                continue;
            };
            for c in self.child_elements.clone() {
                if self.element(c)?.contains_node(node) {
                    self.switch_node_descend(c, parent, node)?;
                }
            }
            self.new_nodes.retain(|&n| n != node);
            self.nodes.remove(node)?;
            log::debug!("new node {node} folded back into {parent}");
        }
        Ok(())
    }
}
