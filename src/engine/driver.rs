//! Host-facing entry point.

use super::options::TopologyUpdateOptions;
use super::session::TopologySession;
use super::snapshot::ElementSnapshot;
use super::state::MeshState;
use crate::topology::element::{Element, ElementId};
use crate::topology::node::{NodeKey, NodeRegistry};
use crate::topology_error::{CutOutcome, TopologyError, absorb_skippable};
use std::collections::BTreeSet;
use std::fmt;

/// Drives the cut / split / reconnect cycle of one mesh.
///
/// A cycle looks like:
/// 1. [`add_2d_element`](Self::add_2d_element) /
///    [`add_3d_element`](Self::add_3d_element) for every element (first
///    cycle only), or [`clear_ancestry`](Self::clear_ancestry) afterwards;
/// 2. [`update_edge_neighbors`](Self::update_edge_neighbors) and
///    [`init_crack_tip_topology`](Self::init_crack_tip_topology);
/// 3. the host's geometric cut tests report cuts through the `mark_*`
///    methods;
/// 4. [`run_topology_update`](Self::run_topology_update), after which
///    [`new_nodes`](Self::new_nodes), [`child_elements`](Self::child_elements)
///    and [`parent_elements`](Self::parent_elements) describe the change.
///
/// # Example
/// ```rust
/// use fragment_sieve::prelude::*;
///
/// let mut driver = TopologyDriver::new();
/// let e = driver.add_2d_element(&[0, 1, 2, 3], 0)?;
/// driver.update_edge_neighbors()?;
/// driver.init_crack_tip_topology()?;
/// assert!(driver.mark_edge_cut(e, 0, 0.5)?.is_applied());
/// assert!(driver.mark_edge_cut(e, 2, 0.5)?.is_applied());
/// driver.run_topology_update(TopologyUpdateOptions::default())?;
/// assert_eq!(driver.child_elements().len(), 2);
/// assert_eq!(driver.new_nodes().len(), 4);
/// # Ok::<(), TopologyError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TopologyDriver {
    state: MeshState,
}

impl TopologyDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MeshState {
        &self.state
    }

    // --- elements ------------------------------------------------------

    pub fn add_2d_element(&mut self, node_ids: &[u32], id: u32) -> Result<ElementId, TopologyError> {
        self.state.add_element(ElementId::new(id), 2, node_ids)
    }

    pub fn add_3d_element(&mut self, node_ids: &[u32], id: u32) -> Result<ElementId, TopologyError> {
        self.state.add_element(ElementId::new(id), 3, node_ids)
    }

    /// Add 2D elements with consecutive ids starting at the next free one.
    pub fn add_2d_elements<I, N>(&mut self, elements: I) -> Result<Vec<ElementId>, TopologyError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u32]>,
    {
        self.add_elements(2, elements)
    }

    /// Add 3D elements with consecutive ids starting at the next free one.
    pub fn add_3d_elements<I, N>(&mut self, elements: I) -> Result<Vec<ElementId>, TopologyError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u32]>,
    {
        self.add_elements(3, elements)
    }

    fn add_elements<I, N>(&mut self, dim: u8, elements: I) -> Result<Vec<ElementId>, TopologyError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u32]>,
    {
        elements
            .into_iter()
            .map(|nodes| {
                let id = self.state.next_element_id();
                self.state.add_element(id, dim, nodes.as_ref())
            })
            .collect()
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, TopologyError> {
        self.state.element(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.state.elements()
    }

    pub fn num_elements(&self) -> usize {
        self.state.num_elements()
    }

    pub fn element_id_by_nodes(&self, node_ids: &[u32]) -> Option<ElementId> {
        self.state.element_id_by_nodes(node_ids)
    }

    pub fn nodes(&self) -> &NodeRegistry {
        self.state.nodes()
    }

    // --- cuts ----------------------------------------------------------

    /// Cut edge `edge` of 2D element `id` at `position` in `[0, 1]` from
    /// the edge's first node.
    pub fn mark_edge_cut(&mut self, id: ElementId, edge: usize, position: f64) -> Result<CutOutcome, TopologyError> {
        absorb_skippable(self.state.mark_edge_cut(id, edge, position))
    }

    /// The cut passes exactly through corner `local_node` of 2D element `id`.
    pub fn mark_node_cut(&mut self, id: ElementId, local_node: usize) -> Result<CutOutcome, TopologyError> {
        absorb_skippable(self.state.mark_node_cut(id, local_node))
    }

    /// Cut interior fragment edge `frag_edge` of 2D element `id`. Call
    /// after the element-level cuts of the same pass.
    pub fn mark_fragment_edge_cut(
        &mut self,
        id: ElementId,
        frag_edge: usize,
        position: f64,
    ) -> Result<CutOutcome, TopologyError> {
        absorb_skippable(self.state.mark_fragment_edge_cut(id, frag_edge, position))
    }

    /// Cut face `face` of 3D element `id` through two of its edges.
    pub fn mark_face_cut(
        &mut self,
        id: ElementId,
        face: usize,
        edges: [usize; 2],
        positions: [f64; 2],
    ) -> Result<CutOutcome, TopologyError> {
        absorb_skippable(self.state.mark_face_cut(id, face, edges, positions))
    }

    pub fn mark_fragment_face_cut(&mut self, id: ElementId, frag_face: usize) -> Result<CutOutcome, TopologyError> {
        absorb_skippable(self.state.mark_fragment_face_cut(id, frag_face))
    }

    pub fn is_final_cut(&self, id: ElementId) -> Result<bool, TopologyError> {
        Ok(self.state.element(id)?.is_final_cut())
    }

    // --- passes --------------------------------------------------------

    pub fn update_edge_neighbors(&mut self) -> Result<(), TopologyError> {
        self.state.update_edge_neighbors()
    }

    pub fn init_crack_tip_topology(&mut self) -> Result<(), TopologyError> {
        self.state.init_crack_tip_topology()
    }

    pub fn update_physical_links_and_fragments(&mut self) -> Result<(), TopologyError> {
        self.state.update_physical_links_and_fragments()
    }

    /// Create, connect and register children from the current fragments.
    pub fn update_topology(&mut self, options: TopologyUpdateOptions) -> Result<(), TopologyError> {
        TopologySession::new(&mut self.state, options).run()
    }

    /// Split fragments along the recorded cuts, then update the topology.
    pub fn run_topology_update(&mut self, options: TopologyUpdateOptions) -> Result<(), TopologyError> {
        self.update_physical_links_and_fragments()?;
        self.update_topology(options)
    }

    pub fn clear_ancestry(&mut self) -> Result<(), TopologyError> {
        self.state.clear_ancestry()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    // --- snapshots -----------------------------------------------------

    pub fn snapshot_element(&self, id: ElementId) -> Result<ElementSnapshot, TopologyError> {
        Ok(ElementSnapshot::capture(self.state.element(id)?))
    }

    /// Lay a snapshot from an earlier cycle onto the re-ingested element `id`.
    pub fn restore_fragment(&mut self, id: ElementId, snapshot: &ElementSnapshot) -> Result<(), TopologyError> {
        snapshot.restore_into(self.state.element_mut(id)?)
    }

    // --- results -------------------------------------------------------

    pub fn new_nodes(&self) -> &[NodeKey] {
        self.state.new_nodes()
    }

    pub fn child_elements(&self) -> &[ElementId] {
        self.state.child_elements()
    }

    pub fn parent_elements(&self) -> &[ElementId] {
        self.state.parent_elements()
    }

    pub fn crack_tip_elements(&self) -> &BTreeSet<ElementId> {
        self.state.crack_tip_elements()
    }

    pub fn crack_tip_split_element_id(&self, id: ElementId) -> Result<Option<ElementId>, TopologyError> {
        self.state.crack_tip_split_element_id(id)
    }

    /// Master nodes and weights reproducing `node` inside element `id`.
    pub fn master_info(&self, id: ElementId, node: NodeKey) -> Result<Vec<(NodeKey, f64)>, TopologyError> {
        self.state.element(id)?.master_info(node)
    }
}

impl fmt::Display for TopologyDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.state, f)
    }
}
