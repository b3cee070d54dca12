//! Elements: the unit the splitting pipeline works on.
//!
//! An [`Element`] keeps its node list, its parent/child links, its
//! crack-tip flags and a dimension-specific [`Body`]: boundary edges or
//! faces with their neighbor lists, fragments and cut-created interior
//! nodes. Everything in this module is local to one element; passes that
//! read or write several elements at once live in [`crate::engine`].
//!
//! The two bodies share the [`BoundaryTopology`] capability trait, so the
//! dimension-independent parts of the pipeline never match on the body.

pub mod planar;
pub mod solid;

pub use planar::PlanarBody;
pub use solid::SolidBody;

use crate::topology::element_kind::ElementKind;
use crate::topology::node::NodeKey;
use crate::topology::parametric::{Point3, add, local_node_coords, scale, shape_functions_3d};
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Host-visible element id.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ElementId(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(raw: u32) -> Self {
        ElementId(raw)
    }
}

/// Boundary capabilities shared by 2D and 3D bodies.
///
/// A *boundary* is an edge of a 2D element or a face of a 3D element.
pub trait BoundaryTopology {
    fn num_boundaries(&self) -> usize;
    /// Corner nodes of boundary `b`.
    fn boundary_vertices(&self, b: usize) -> Vec<NodeKey>;
    fn boundary_neighbors(&self, b: usize) -> &[ElementId];
    fn push_boundary_neighbor(&mut self, b: usize, neighbor: ElementId);
    /// Drop every boundary (and boundary-edge) neighbor.
    fn clear_neighbors(&mut self);
    /// A 2D edge with a cut point, or a 3D face cut on two edges.
    fn boundary_has_intersection(&self, b: usize) -> bool;
    /// Cut points on boundary `b`, in storage order.
    fn boundary_embedded_nodes(&self, b: usize) -> Vec<NodeKey>;
    fn num_fragments(&self) -> usize;
    /// Node on any fragment.
    fn fragment_contains_node(&self, node: NodeKey) -> bool;
    /// Loop (2D) or face (3D) node lists of fragment `i`, for reports.
    fn fragment_node_lists(&self, i: usize) -> Vec<Vec<NodeKey>>;
    /// Nodes shared by fragments 0 and 1 (the cut line); empty unless
    /// there are exactly two fragments.
    fn split_line_nodes(&self) -> Vec<NodeKey>;
    /// The cut line `cut_nodes` of a neighbor crosses boundary `b`.
    fn boundary_takes_split(&self, b: usize, cut_nodes: &[NodeKey]) -> bool;
    /// Boundary holding two pieces of the single fragment.
    fn tip_boundary(&self) -> Option<usize>;
    /// No further cut is possible.
    fn is_final_cut(&self) -> bool;
    /// Element-level cut count.
    fn num_cuts(&self) -> usize;
    fn interior_node_keys(&self) -> Vec<NodeKey>;
    /// Boundary masters of `node` (endpoint, edge cut or face-interior node).
    fn boundary_masters(&self, node: NodeKey) -> Option<Vec<(NodeKey, f64)>>;
    fn switch_node(&mut self, new: NodeKey, old: NodeKey);
    fn remove_embedded_node(&mut self, node: NodeKey);
    /// Strip boundary cut points that fragment 0 does not reach.
    fn remove_phantom_embedded_nodes(&mut self);
}

/// Dimension-specific part of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Planar(PlanarBody),
    Solid(SolidBody),
}

impl Body {
    fn topo(&self) -> &dyn BoundaryTopology {
        match self {
            Body::Planar(b) => b,
            Body::Solid(b) => b,
        }
    }

    fn topo_mut(&mut self) -> &mut dyn BoundaryTopology {
        match self {
            Body::Planar(b) => b,
            Body::Solid(b) => b,
        }
    }
}

/// A mesh element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    nodes: Vec<NodeKey>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    crack_tip_split: bool,
    /// Boundary indices facing a crack-tip element; at most two.
    crack_tip_neighbors: Vec<usize>,
    general_neighbors: Vec<ElementId>,
    body: Body,
}

/// Cut line(s) used to sort a parent's nodes between real and phantom.
///
/// In 2D a fragment has one interior edge, or two after a branching cut;
/// the second line is zero when absent. In 3D only the first is used.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CutPlane {
    pub origin: Point3,
    pub normal: Point3,
    pub origin2: Point3,
    pub normal2: Point3,
}

impl Element {
    /// Build an element of `kind` over `nodes` (corners first).
    pub fn new(
        id: ElementId,
        kind: ElementKind,
        nodes: Vec<NodeKey>,
    ) -> Result<Self, TopologyError> {
        if nodes.len() != kind.num_nodes() {
            return Err(TopologyError::UnsupportedNodeCount {
                id,
                dim: kind.dimension(),
                found: nodes.len(),
            });
        }
        let body = match kind.dimension() {
            2 => Body::Planar(PlanarBody::new(kind, &nodes)),
            _ => Body::Solid(SolidBody::new(kind, &nodes)),
        };
        Ok(Self {
            id,
            kind,
            nodes,
            parent: None,
            children: Vec::new(),
            crack_tip_split: false,
            crack_tip_neighbors: Vec::new(),
            general_neighbors: Vec::new(),
            body,
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn dimension(&self) -> u8 {
        self.kind.dimension()
    }

    pub fn nodes(&self) -> &[NodeKey] {
        &self.nodes
    }

    pub fn node(&self, i: usize) -> NodeKey {
        self.nodes[i]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Corner nodes: the first `num_vertices` entries of the node list.
    pub fn vertices(&self) -> &[NodeKey] {
        &self.nodes[..self.kind.num_vertices()]
    }

    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.nodes.contains(&node)
    }

    pub fn local_index(&self, node: NodeKey) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_crack_tip_split(&self) -> bool {
        self.crack_tip_split
    }

    pub fn crack_tip_neighbors(&self) -> &[usize] {
        &self.crack_tip_neighbors
    }

    pub fn general_neighbors(&self) -> &[ElementId] {
        &self.general_neighbors
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn planar(&self) -> Option<&PlanarBody> {
        match &self.body {
            Body::Planar(b) => Some(b),
            Body::Solid(_) => None,
        }
    }

    pub fn planar_mut(&mut self) -> Option<&mut PlanarBody> {
        match &mut self.body {
            Body::Planar(b) => Some(b),
            Body::Solid(_) => None,
        }
    }

    pub fn solid(&self) -> Option<&SolidBody> {
        match &self.body {
            Body::Solid(b) => Some(b),
            Body::Planar(_) => None,
        }
    }

    pub fn solid_mut(&mut self) -> Option<&mut SolidBody> {
        match &mut self.body {
            Body::Solid(b) => Some(b),
            Body::Planar(_) => None,
        }
    }

    /// Dimension-independent view of the body.
    pub fn topo(&self) -> &dyn BoundaryTopology {
        self.body.topo()
    }

    pub fn topo_mut(&mut self) -> &mut dyn BoundaryTopology {
        self.body.topo_mut()
    }

    pub fn num_fragments(&self) -> usize {
        self.topo().num_fragments()
    }

    pub fn num_boundaries(&self) -> usize {
        self.topo().num_boundaries()
    }

    pub(crate) fn check_boundary(&self, b: usize) -> Result<(), TopologyError> {
        let count = self.num_boundaries();
        if b >= count {
            return Err(TopologyError::BoundaryOutOfRange {
                elem: self.id,
                index: b,
                count,
            });
        }
        Ok(())
    }

    pub fn boundary_neighbors(&self, b: usize) -> &[ElementId] {
        self.topo().boundary_neighbors(b)
    }

    /// Boundary on which `neighbor` is listed.
    pub fn neighbor_index(&self, neighbor: ElementId) -> Result<usize, TopologyError> {
        (0..self.num_boundaries())
            .find(|&b| self.boundary_neighbors(b).contains(&neighbor))
            .ok_or(TopologyError::AsymmetricNeighbor {
                elem: neighbor,
                neighbor: self.id,
            })
    }

    /// `true` once fragments exist and some corner lies in none of them.
    pub fn is_partial(&self) -> bool {
        let topo = self.topo();
        topo.num_fragments() > 0
            && self
                .vertices()
                .iter()
                .any(|&n| !topo.fragment_contains_node(n))
    }

    /// Element nodes outside every fragment.
    pub fn non_physical_nodes(&self) -> BTreeSet<NodeKey> {
        let topo = self.topo();
        self.nodes
            .iter()
            .copied()
            .filter(|&n| !topo.fragment_contains_node(n))
            .collect()
    }

    /// Corners of boundary `b` outside every fragment (none before the
    /// element has fragments).
    pub fn phantom_nodes_on_boundary(&self, b: usize) -> BTreeSet<NodeKey> {
        let topo = self.topo();
        if topo.num_fragments() == 0 {
            return BTreeSet::new();
        }
        topo.boundary_vertices(b)
            .into_iter()
            .filter(|&n| !topo.fragment_contains_node(n))
            .collect()
    }

    pub fn is_crack_tip_element(&self) -> bool {
        self.topo().tip_boundary().is_some()
    }

    pub fn is_final_cut(&self) -> bool {
        self.topo().is_final_cut()
    }

    pub fn num_cuts(&self) -> usize {
        self.topo().num_cuts()
    }

    /// Corner nodes shared with `other`.
    pub fn common_vertices(&self, other: &Element) -> Vec<NodeKey> {
        self.vertices()
            .iter()
            .copied()
            .filter(|n| other.vertices().contains(n))
            .collect()
    }

    /// Same-dimension `other` lies on top of this element instead of
    /// next to it.
    pub fn overlays(&self, other: &Element) -> Result<bool, TopologyError> {
        match (&self.body, &other.body) {
            (Body::Planar(_), Body::Planar(_)) => planar::overlays(self, other),
            (Body::Solid(a), Body::Solid(b)) => a.overlays(b),
            _ => Err(TopologyError::MixedDimension {
                elem: other.id,
                expected: self.dimension(),
                found: other.dimension(),
            }),
        }
    }

    /// Fragment 0 of both elements shares a boundary piece.
    pub fn fragments_connected(&self, other: &Element) -> bool {
        match (&self.body, &other.body) {
            (Body::Planar(a), Body::Planar(b)) => match (a.fragments().first(), b.fragments().first()) {
                (Some(fa), Some(fb)) => fa.is_connected(fb),
                _ => false,
            },
            (Body::Solid(a), Body::Solid(b)) => match (a.fragments().first(), b.fragments().first()) {
                (Some(fa), Some(fb)) => fa.is_connected(fb),
                _ => false,
            },
            _ => false,
        }
    }

    /// Boundary `b` and boundary `ob` of `other` have the same nodes.
    pub fn boundary_equivalent(&self, b: usize, other: &Element, ob: usize) -> bool {
        match (&self.body, &other.body) {
            (Body::Planar(x), Body::Planar(y)) => x.edge(b).equivalent(y.edge(ob)),
            (Body::Solid(x), Body::Solid(y)) => x.face(b).equivalent(y.face(ob)),
            _ => false,
        }
    }

    // --- links ---------------------------------------------------------

    pub(crate) fn set_parent(&mut self, parent: ElementId) {
        self.parent = Some(parent);
    }

    pub(crate) fn push_child(&mut self, child: ElementId) {
        self.children.push(child);
    }

    pub(crate) fn clear_parent_and_children(&mut self) {
        self.parent = None;
        self.children.clear();
    }

    pub(crate) fn set_general_neighbors(&mut self, neighbors: Vec<ElementId>) {
        self.general_neighbors = neighbors;
    }

    pub(crate) fn clear_neighbors(&mut self) {
        self.general_neighbors.clear();
        self.topo_mut().clear_neighbors();
    }

    pub(crate) fn set_crack_tip_split(&mut self) {
        self.crack_tip_split = true;
    }

    /// Record boundary `b` as facing a crack-tip element.
    pub(crate) fn add_crack_tip_neighbor(&mut self, b: usize) -> Result<(), TopologyError> {
        if !self.crack_tip_neighbors.contains(&b) {
            self.crack_tip_neighbors.push(b);
        }
        if self.crack_tip_neighbors.len() > 2 {
            return Err(TopologyError::TooManyCrackTipNeighbors { elem: self.id });
        }
        Ok(())
    }

    // --- node substitution ---------------------------------------------

    /// Replace `old` by `new` in this element only.
    pub fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for n in self.nodes.iter_mut() {
            if *n == old {
                *n = new;
            }
        }
        self.topo_mut().switch_node(new, old);
    }

    pub fn remove_embedded_node(&mut self, node: NodeKey) {
        self.topo_mut().remove_embedded_node(node);
    }

    // --- interpolation -------------------------------------------------

    /// Element nodes and weights reproducing `node`.
    pub fn master_info(&self, node: NodeKey) -> Result<Vec<(NodeKey, f64)>, TopologyError> {
        if let Some(masters) = self.topo().boundary_masters(node) {
            return Ok(masters);
        }
        match &self.body {
            Body::Planar(b) => b.interior_masters(self.vertices(), node),
            Body::Solid(b) => {
                let Some(vnode) = b.interior_nodes().iter().find(|v| v.node() == node) else {
                    return Err(TopologyError::NodeNotFound { node });
                };
                let n = self.kind.num_nodes();
                let weights = match n {
                    8 | 4 => shape_functions_3d(n, vnode.xi()),
                    _ => None,
                }
                .ok_or(TopologyError::UnsupportedInterpolation {
                    elem: self.id,
                    kind: self.kind,
                })?;
                Ok(self.nodes.iter().copied().zip(weights).collect())
            }
        }
    }

    /// Like [`master_info`](Self::master_info), with masters given by
    /// their position in the element's node list.
    pub fn local_masters(&self, node: NodeKey) -> Result<Vec<(usize, f64)>, TopologyError> {
        self.master_info(node)?
            .into_iter()
            .map(|(m, w)| {
                self.local_index(m)
                    .map(|i| (i, w))
                    .ok_or(TopologyError::NodeNotFound { node: m })
            })
            .collect()
    }

    /// Position of `node` in the element's local coordinates.
    pub fn local_coords(&self, node: NodeKey) -> Result<Point3, TopologyError> {
        let coords = local_node_coords(self.kind);
        Ok(self
            .local_masters(node)?
            .into_iter()
            .fold([0.0; 3], |acc, (i, w)| add(acc, scale(coords[i], w))))
    }

    /// Cut line(s) bounding fragment `ichild`.
    pub fn cut_plane(&self, ichild: usize) -> Result<CutPlane, TopologyError> {
        let count = self.num_fragments();
        if ichild >= count {
            return Err(TopologyError::FragmentOutOfRange {
                elem: self.id,
                index: ichild,
                count,
            });
        }
        match &self.body {
            Body::Planar(b) => b.cut_plane(self, ichild),
            Body::Solid(b) => b.cut_plane(self, ichild),
        }
    }

    // --- children and snapshots ----------------------------------------

    /// Child `id` over `nodes` carrying this element's fragment `ichild`.
    ///
    /// Boundary cuts are inherited, then those fragment 0 of the child
    /// does not reach are dropped.
    pub fn new_child(
        &self,
        id: ElementId,
        nodes: Vec<NodeKey>,
        ichild: usize,
    ) -> Result<Element, TopologyError> {
        let mut child = Element::new(id, self.kind, nodes)?;
        let found = child.dimension();
        child.set_parent(self.id);
        match (&self.body, &mut child.body) {
            (Body::Planar(from), Body::Planar(to)) => to.inherit(from, ichild)?,
            (Body::Solid(from), Body::Solid(to)) => to.inherit(from, ichild)?,
            _ => {
                return Err(TopologyError::MixedDimension {
                    elem: id,
                    expected: self.dimension(),
                    found,
                });
            }
        }
        child.topo_mut().remove_phantom_embedded_nodes();
        Ok(child)
    }

    /// Copy of this element with node `i` renamed to `Local(i)`.
    pub fn to_local(&self) -> Element {
        let mut local = self.clone();
        for (i, &n) in self.nodes.iter().enumerate() {
            local.switch_node(NodeKey::Local(i as u32), n);
        }
        local.clear_neighbors();
        local.clear_parent_and_children();
        local
    }

    /// Take over the fragments, interior nodes and boundary cuts of a
    /// localized copy, mapping `Local(i)` back onto this element's node `i`.
    pub fn restore_from(&mut self, from: &Element) -> Result<(), TopologyError> {
        if from.kind != self.kind {
            return Err(TopologyError::RestoreConflict {
                elem: self.id,
                detail: "element kinds differ",
            });
        }
        if self.num_fragments() > 0 {
            return Err(TopologyError::RestoreConflict {
                elem: self.id,
                detail: "element already has fragments",
            });
        }
        if !self.topo().interior_node_keys().is_empty() {
            return Err(TopologyError::RestoreConflict {
                elem: self.id,
                detail: "element already has interior nodes",
            });
        }
        if self.num_cuts() > 0 {
            return Err(TopologyError::RestoreConflict {
                elem: self.id,
                detail: "element already has cuts",
            });
        }
        let id = self.id;
        for (i, &n) in from.nodes.iter().enumerate() {
            if n != NodeKey::Local(i as u32) {
                return Err(TopologyError::RestoreConflict {
                    elem: id,
                    detail: "snapshot node is not element-local",
                });
            }
        }
        match (&mut self.body, &from.body) {
            (Body::Planar(to), Body::Planar(src)) => to.restore_from(id, src)?,
            (Body::Solid(to), Body::Solid(src)) => to.restore_from(src)?,
            _ => {
                return Err(TopologyError::RestoreConflict {
                    elem: id,
                    detail: "element kinds differ",
                });
            }
        }
        for i in 0..self.nodes.len() {
            let real = self.nodes[i];
            self.topo_mut().switch_node(real, NodeKey::Local(i as u32));
        }
        Ok(())
    }
}
