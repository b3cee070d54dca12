//! Crack-tip detection and the duplication rules that depend on it.
//!
//! A crack-tip element has a single fragment with two pieces on one cut
//! boundary. When such a boundary faces two elements (the two children of
//! an element split earlier), those neighbors are *crack-tip split*: the
//! crack will reach them next, and they remember which of their boundaries
//! faces the tip.

use super::state::MeshState;
use crate::topology::element::ElementId;
use crate::topology::node::NodeKey;
use crate::topology_error::TopologyError;
use std::collections::BTreeSet;

impl MeshState {
    /// Rebuild the crack-tip set and flag the elements ahead of each tip.
    pub fn init_crack_tip_topology(&mut self) -> Result<(), TopologyError> {
        self.crack_tip.clear();
        for id in self.element_ids() {
            self.init_crack_tip(id)?;
        }
        log::debug!("{} crack-tip element(s)", self.crack_tip.len());
        Ok(())
    }

    fn init_crack_tip(&mut self, id: ElementId) -> Result<(), TopologyError> {
        let elem = self.element(id)?;
        if !elem.is_crack_tip_element() {
            return Ok(());
        }
        let mut flags = Vec::new();
        for b in 0..elem.num_boundaries() {
            let neighbors = elem.boundary_neighbors(b);
            if neighbors.len() != 2 || !elem.topo().boundary_has_intersection(b) {
                continue;
            }
            for &nb in neighbors {
                let other = self.element(nb)?;
                if other.overlays(elem)? {
                    return Err(TopologyError::NeighborOverlaysTip { elem: id, neighbor: nb });
                }
                flags.push((nb, other.neighbor_index(id)?));
            }
            if elem.is_crack_tip_split() {
                return Err(TopologyError::CrackTipSplitAlreadyFlagged { elem: id });
            }
        }
        self.crack_tip.insert(id);
        for (nb, b) in flags {
            let other = self.element_mut(nb)?;
            other.set_crack_tip_split();
            other.add_crack_tip_neighbor(b)?;
        }
        Ok(())
    }

    /// Crack-tip-split element ahead of tip element `id`, if any.
    pub fn crack_tip_split_element_id(&self, id: ElementId) -> Result<Option<ElementId>, TopologyError> {
        let elem = self.element(id)?;
        if !elem.is_crack_tip_element() {
            return Ok(None);
        }
        for b in 0..elem.num_boundaries() {
            let neighbors = elem.boundary_neighbors(b);
            if neighbors.len() == 2 && elem.topo().boundary_has_intersection(b) {
                let first = neighbors[0];
                if self.element(first)?.is_crack_tip_split() {
                    return Ok(Some(first));
                }
            }
        }
        Ok(None)
    }

    /// A single-fragment element is duplicated when it becomes a crack tip
    /// this cycle, when the crack extends out of it, or when it shares a
    /// phantom corner with a neighbor about to be split again.
    pub(crate) fn should_duplicate_for_crack_tip(&self, id: ElementId) -> Result<bool, TopologyError> {
        let elem = self.element(id)?;
        if elem.num_fragments() != 1 {
            return Ok(false);
        }
        if !self.crack_tip.contains(&id) && elem.is_crack_tip_element() {
            return Ok(true);
        }
        if self.should_duplicate_crack_tip_split_element(id)? {
            return Ok(true);
        }
        self.should_duplicate_for_phantom_corner(id)
    }

    fn should_duplicate_crack_tip_split_element(&self, id: ElementId) -> Result<bool, TopologyError> {
        let elem = self.element(id)?;
        if elem.num_fragments() != 1 {
            return Ok(false);
        }
        if self.will_crack_tip_extend(id)? {
            return Ok(true);
        }
        // A phantom node touching a former tip that is now being split.
        let non_physical = elem.non_physical_nodes();
        for &nb in elem.general_neighbors() {
            let other = self.element(nb)?;
            if !self.crack_tip.contains(&nb) || other.num_fragments() <= 1 {
                continue;
            }
            for b in 0..other.num_boundaries() {
                if other.boundary_neighbors(b).len() == 2
                    && other
                        .topo()
                        .boundary_vertices(b)
                        .iter()
                        .any(|n| non_physical.contains(n))
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// The tip element facing this crack-tip-split element now has two
    /// fragments whose cut line crosses the shared boundary.
    fn will_crack_tip_extend(&self, id: ElementId) -> Result<bool, TopologyError> {
        let elem = self.element(id)?;
        if elem.num_fragments() != 1 || !elem.is_crack_tip_split() {
            return Ok(false);
        }
        let mut extends = false;
        for &b in elem.crack_tip_neighbors() {
            let neighbors = elem.boundary_neighbors(b);
            let [nb] = neighbors else {
                return Err(TopologyError::CrackTipNeighborCount {
                    elem: id,
                    boundary: b,
                    found: neighbors.len(),
                });
            };
            let other = self.element(*nb)?;
            match other.num_fragments() {
                0 | 1 => {}
                2 => {
                    let cut = other.topo().split_line_nodes();
                    if elem.dimension() == 2 && cut.len() != 2 {
                        return Err(TopologyError::FragmentSanity {
                            elem: *nb,
                            detail: format!("two fragments share {} nodes, expected 2", cut.len()),
                        });
                    }
                    if elem.topo().boundary_takes_split(b, &cut) {
                        extends = true;
                    }
                }
                found => {
                    return Err(TopologyError::FragmentCount {
                        elem: *nb,
                        expected: 2,
                        found,
                    });
                }
            }
        }
        Ok(extends)
    }

    /// A partial element whose only neighbor across a boundary with a
    /// phantom corner is about to be split, and that neighbor has another
    /// linked boundary exposing the same phantom node.
    fn should_duplicate_for_phantom_corner(&self, id: ElementId) -> Result<bool, TopologyError> {
        let elem = self.element(id)?;
        if elem.num_fragments() != 1 || elem.is_crack_tip_split() {
            return Ok(false);
        }
        for i in 0..elem.num_boundaries() {
            let phantom: BTreeSet<NodeKey> = elem.phantom_nodes_on_boundary(i);
            let [nb] = elem.boundary_neighbors(i) else {
                continue;
            };
            if phantom.is_empty() {
                continue;
            }
            let other = self.element(*nb)?;
            if other.num_fragments() <= 1 {
                continue;
            }
            for j in 0..other.num_boundaries() {
                if other.boundary_equivalent(j, elem, i) || other.boundary_neighbors(j).is_empty() {
                    continue;
                }
                if other
                    .phantom_nodes_on_boundary(j)
                    .iter()
                    .any(|n| phantom.contains(n))
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Parents leave the crack-tip set; tip-shaped children join it.
    pub(crate) fn update_crack_tip_elements(&mut self) -> Result<(), TopologyError> {
        for parent in &self.parent_elements {
            self.crack_tip.remove(parent);
        }
        for &child in &self.child_elements {
            if self.element(child)?.is_crack_tip_element() {
                self.crack_tip.insert(child);
            }
        }
        Ok(())
    }
}
