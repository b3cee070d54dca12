//! Child creation: one child per fragment of every element that must be
//! duplicated, with temporary nodes standing in for the parent's phantom
//! nodes until the connect pass resolves them.

use super::state::MeshState;
use crate::topology::TOL;
use crate::topology::element::{CutPlane, Element, ElementId};
use crate::topology::node::{NodeCategory, NodeKey};
use crate::topology::parametric::{dot, local_node_coords, sub, Point3};
use crate::topology_error::TopologyError;
use itertools::Itertools;

/// What a child does with one of its parent's nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeChoice {
    Inherit,
    Temp,
}

fn norm(p: Point3) -> f64 {
    dot(p, p).sqrt()
}

/// Sort a 2D parent node between the real and phantom side of fragment
/// `ichild`. Nodes on the cut line are phantom whenever the parent splits.
fn planar_choice(p: Point3, plane: &CutPlane, nfrag: usize, duplicate: bool, embedded_permanent: bool) -> NodeChoice {
    let d1 = dot(sub(p, plane.origin), plane.normal);
    let d2 = dot(sub(p, plane.origin2), plane.normal2);
    if nfrag == 1 && embedded_permanent {
        NodeChoice::Temp
    } else if nfrag == 1 && !duplicate {
        NodeChoice::Inherit
    } else if d1.abs() < TOL && nfrag > 1 {
        NodeChoice::Temp
    } else if d1 < TOL && d2 < TOL && (nfrag > 1 || duplicate) {
        NodeChoice::Inherit
    } else if norm(plane.normal) < TOL && norm(plane.normal2) < TOL && nfrag == 1 {
        // cut along an edge
        NodeChoice::Inherit
    } else if nfrag > 1 || duplicate {
        NodeChoice::Temp
    } else {
        NodeChoice::Inherit
    }
}

fn solid_choice(p: Point3, plane: &CutPlane, nfrag: usize, duplicate: bool) -> NodeChoice {
    if nfrag == 1 && !duplicate {
        return NodeChoice::Inherit;
    }
    if dot(sub(p, plane.origin), plane.normal) < TOL {
        NodeChoice::Inherit
    } else {
        NodeChoice::Temp
    }
}

impl MeshState {
    /// Create the children of every element that needs them, then add the
    /// children to the arena. Elements left alone become their own child.
    pub(crate) fn create_child_elements(&mut self) -> Result<(), TopologyError> {
        let mut pending: Vec<Element> = Vec::new();
        for id in self.element_ids() {
            self.create_children_of(id, &mut pending)?;
        }
        log::debug!(
            "{} parent(s) split into {} child element(s)",
            self.parent_elements.len(),
            pending.len()
        );
        for child in pending {
            self.child_elements.push(child.id());
            self.elements.insert(child.id(), child);
        }
        Ok(())
    }

    fn create_children_of(&mut self, id: ElementId, pending: &mut Vec<Element>) -> Result<(), TopologyError> {
        let elem = self.element(id)?;
        if !elem.children().is_empty() {
            return Err(TopologyError::ExistingChildren { elem: id });
        }
        let nfrag = elem.num_fragments();
        let dim = elem.dimension();
        let has_embedded_permanent = elem
            .nodes()
            .iter()
            .map(|&n| self.nodes.category(n))
            .process_results(|mut cats| cats.any(|c| c == NodeCategory::EmbeddedPermanent))?;
        let duplicate = nfrag > 0 && self.should_duplicate_for_crack_tip(id)?;
        if nfrag == 0 || !(nfrag > 1 || duplicate || has_embedded_permanent) {
            self.element_mut(id)?.push_child(id);
            return Ok(());
        }

        let max_fragments = if dim == 2 { 3 } else { 2 };
        if nfrag > max_fragments {
            return Err(TopologyError::FragmentCount {
                elem: id,
                expected: max_fragments,
                found: nfrag,
            });
        }

        let coords = local_node_coords(elem.kind());
        self.parent_elements.push(id);
        for ichild in 0..nfrag {
            let elem = self.element(id)?;
            let child_id = match pending.last() {
                Some(last) => ElementId::new(last.id().get() + 1),
                None => self.next_element_id(),
            };
            let plane = elem.cut_plane(ichild)?;
            let choices: Vec<(NodeKey, NodeChoice)> = elem
                .nodes()
                .iter()
                .enumerate()
                .map(|(j, &n)| -> Result<(NodeKey, NodeChoice), TopologyError> {
                    let choice = match dim {
                        2 => {
                            let ep = self.nodes.category(n)? == NodeCategory::EmbeddedPermanent;
                            planar_choice(coords[j], &plane, nfrag, duplicate, ep)
                        }
                        _ => solid_choice(coords[j], &plane, nfrag, duplicate),
                    };
                    Ok((n, choice))
                })
                .collect::<Result<_, _>>()?;

            let nodes: Vec<NodeKey> = choices
                .into_iter()
                .map(|(n, choice)| match choice {
                    NodeChoice::Inherit => n,
                    NodeChoice::Temp => self.nodes.create(NodeCategory::Temp, Some(n)),
                })
                .collect();

            let child = self.element(id)?.new_child(child_id, nodes, ichild)?;
            pending.push(child);
            self.element_mut(id)?.push_child(child_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(normal: Point3) -> CutPlane {
        CutPlane {
            origin: [0.0, 0.0, 0.0],
            normal,
            ..CutPlane::default()
        }
    }

    #[test]
    fn planar_nodes_on_the_cut_line_become_temporary() {
        let p = plane([1.0, 0.0, 0.0]);
        assert_eq!(planar_choice([0.0, 0.5, 0.0], &p, 2, false, false), NodeChoice::Temp);
        assert_eq!(planar_choice([-0.5, 0.0, 0.0], &p, 2, false, false), NodeChoice::Inherit);
        assert_eq!(planar_choice([0.5, 0.0, 0.0], &p, 2, false, false), NodeChoice::Temp);
    }

    #[test]
    fn single_fragment_inherits_unless_duplicated() {
        let p = plane([1.0, 0.0, 0.0]);
        assert_eq!(planar_choice([0.5, 0.0, 0.0], &p, 1, false, false), NodeChoice::Inherit);
        assert_eq!(planar_choice([0.5, 0.0, 0.0], &p, 1, true, false), NodeChoice::Temp);
        assert_eq!(planar_choice([-0.5, 0.0, 0.0], &p, 1, false, true), NodeChoice::Temp);
        assert_eq!(planar_choice([0.5, 0.0, 0.0], &CutPlane::default(), 1, true, false), NodeChoice::Inherit);
    }

    #[test]
    fn solid_nodes_behind_the_plane_are_kept() {
        let p = plane([0.0, 0.0, 1.0]);
        assert_eq!(solid_choice([0.0, 0.0, -1.0], &p, 2, false), NodeChoice::Inherit);
        assert_eq!(solid_choice([0.0, 0.0, 0.0], &p, 2, false), NodeChoice::Inherit);
        assert_eq!(solid_choice([0.0, 0.0, 1.0], &p, 2, false), NodeChoice::Temp);
        assert_eq!(solid_choice([0.0, 0.0, 1.0], &p, 1, false), NodeChoice::Inherit);
    }
}
