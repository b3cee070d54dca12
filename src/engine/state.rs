//! Mesh state: node registry, element arena and per-cycle outputs.

use crate::debug_invariants::DebugInvariants;
use crate::topology::element::{Body, Element, ElementId};
use crate::topology::element_kind::ElementKind;
use crate::topology::node::{NodeCategory, NodeKey, NodeRegistry};
use crate::topology_error::TopologyError;
use hashbrown::HashMap;
use std::collections::{BTreeMap, BTreeSet};

/// Everything one mesh owns between topology updates.
///
/// Elements are addressed by [`ElementId`] in an ordered arena, so every
/// pass visits them in ascending id order and "largest id + 1" is the next
/// free id. Links between elements (parent, children, neighbors) are ids
/// into the same arena.
#[derive(Debug, Clone, Default)]
pub struct MeshState {
    pub(crate) nodes: NodeRegistry,
    pub(crate) elements: BTreeMap<ElementId, Element>,
    /// Original node -> elements using it; rebuilt at the start of a cycle.
    pub(crate) inverse: HashMap<NodeKey, BTreeSet<ElementId>>,
    pub(crate) crack_tip: BTreeSet<ElementId>,
    pub(crate) dimension: Option<u8>,
    pub(crate) new_nodes: Vec<NodeKey>,
    pub(crate) child_elements: Vec<ElementId>,
    pub(crate) parent_elements: Vec<ElementId>,
}

impl MeshState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.values()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, TopologyError> {
        self.elements
            .get(&id)
            .ok_or(TopologyError::ElementNotFound { id })
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, TopologyError> {
        self.elements
            .get_mut(&id)
            .ok_or(TopologyError::ElementNotFound { id })
    }

    /// Ids of all elements, ascending.
    pub(crate) fn element_ids(&self) -> Vec<ElementId> {
        self.elements.keys().copied().collect()
    }

    /// Mesh dimension, fixed by the first element.
    pub fn dimension(&self) -> Option<u8> {
        self.dimension
    }

    pub fn crack_tip_elements(&self) -> &BTreeSet<ElementId> {
        &self.crack_tip
    }

    pub fn new_nodes(&self) -> &[NodeKey] {
        &self.new_nodes
    }

    pub fn child_elements(&self) -> &[ElementId] {
        &self.child_elements
    }

    pub fn parent_elements(&self) -> &[ElementId] {
        &self.parent_elements
    }

    /// Elements that used `node` when the inverse map was last built.
    pub fn elements_using(&self, node: NodeKey) -> Option<&BTreeSet<ElementId>> {
        self.inverse.get(&node)
    }

    /// Register an element of dimension `dim` over permanent node ids.
    ///
    /// Nodes are created on first use. Fails if `id` is taken, the node
    /// count matches no supported kind, or `dim` differs from the mesh.
    pub fn add_element(
        &mut self,
        id: ElementId,
        dim: u8,
        node_ids: &[u32],
    ) -> Result<ElementId, TopologyError> {
        if self.elements.contains_key(&id) {
            return Err(TopologyError::DuplicateElement { id });
        }
        let kind = ElementKind::from_node_count(dim, node_ids.len()).ok_or(
            TopologyError::UnsupportedNodeCount {
                id,
                dim,
                found: node_ids.len(),
            },
        )?;
        match self.dimension {
            Some(expected) if expected != dim => {
                return Err(TopologyError::MixedDimension {
                    elem: id,
                    expected,
                    found: dim,
                });
            }
            _ => self.dimension = Some(dim),
        }
        let nodes: Vec<NodeKey> = node_ids
            .iter()
            .map(|&n| self.nodes.permanent_or_insert(n))
            .collect();
        let elem = Element::new(id, kind, nodes)?;
        for &n in elem.nodes() {
            self.inverse.entry(n).or_default().insert(id);
        }
        self.elements.insert(id, elem);
        Ok(id)
    }

    /// Next free element id.
    pub(crate) fn next_element_id(&self) -> ElementId {
        self.elements
            .keys()
            .next_back()
            .map_or(ElementId::new(0), |last| ElementId::new(last.get() + 1))
    }

    /// Rebuild node -> elements from the live element list.
    pub(crate) fn build_inverse_map(&mut self) {
        self.inverse.clear();
        for elem in self.elements.values() {
            for &n in elem.nodes() {
                self.inverse.entry(n).or_default().insert(elem.id());
            }
        }
    }

    /// Close a cycle: parents leave the mesh, the survivors forget their
    /// ancestry, and temporary nodes are dropped.
    pub fn clear_ancestry(&mut self) -> Result<(), TopologyError> {
        for parent in std::mem::take(&mut self.parent_elements) {
            self.elements
                .remove(&parent)
                .ok_or(TopologyError::ElementNotFound { id: parent })?;
        }
        for elem in self.elements.values_mut() {
            elem.clear_parent_and_children();
        }
        self.build_inverse_map();
        let permanent: Vec<NodeKey> = self.nodes.keys(NodeCategory::Permanent).collect();
        for node in permanent {
            self.nodes.clear_parent(node)?;
        }
        self.nodes.clear_temp();
        self.new_nodes.clear();
        self.child_elements.clear();
        Ok(())
    }

    /// Drop every element and every permanent and temporary node. Cut
    /// points survive, so snapshots taken before the reset stay valid.
    pub fn reset(&mut self) {
        self.new_nodes.clear();
        self.child_elements.clear();
        self.parent_elements.clear();
        self.crack_tip.clear();
        self.inverse.clear();
        self.elements.clear();
        self.nodes.reset();
        self.dimension = None;
    }

    /// Find a live element by its ordered permanent node ids.
    pub fn element_id_by_nodes(&self, node_ids: &[u32]) -> Option<ElementId> {
        self.elements
            .values()
            .find(|e| {
                e.num_nodes() == node_ids.len()
                    && e.nodes()
                        .iter()
                        .zip(node_ids)
                        .all(|(&n, &id)| self.nodes.id(n).is_ok_and(|found| found == id))
            })
            .map(Element::id)
    }

    fn check_embedded_caps(&self, elem: &Element) -> Result<(), TopologyError> {
        match elem.body() {
            Body::Planar(b) => {
                for (i, e) in b.edges().iter().enumerate() {
                    if e.num_embedded_nodes() > 2 {
                        return Err(TopologyError::TooManyEmbeddedNodes {
                            elem: elem.id(),
                            boundary: i,
                            cap: 2,
                        });
                    }
                }
                for frag in b.fragments() {
                    if let Some(i) = frag.edges().iter().position(|e| e.num_embedded_nodes() > 1) {
                        return Err(TopologyError::TooManyEmbeddedNodes {
                            elem: elem.id(),
                            boundary: i,
                            cap: 1,
                        });
                    }
                }
            }
            Body::Solid(b) => {
                for (i, f) in b.faces().iter().enumerate() {
                    if f.edges().iter().any(|e| e.num_embedded_nodes() > 2) {
                        return Err(TopologyError::TooManyEmbeddedNodes {
                            elem: elem.id(),
                            boundary: i,
                            cap: 2,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl DebugInvariants for MeshState {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "MeshState invariants");
    }

    /// Embedded-node caps, symmetric neighbors among live elements, and
    /// children either absent or one per fragment.
    fn validate_invariants(&self) -> Result<(), TopologyError> {
        for elem in self.elements.values() {
            self.check_embedded_caps(elem)?;
            for b in 0..elem.num_boundaries() {
                for &nb in elem.boundary_neighbors(b) {
                    if let Some(other) = self.elements.get(&nb) {
                        other.neighbor_index(elem.id())?;
                    }
                }
            }
            let children = elem.children().len();
            let is_own_child = elem.children() == [elem.id()];
            if children != 0 && !is_own_child && children != elem.num_fragments() {
                return Err(TopologyError::FragmentCount {
                    elem: elem.id(),
                    expected: children,
                    found: elem.num_fragments(),
                });
            }
        }
        Ok(())
    }
}
