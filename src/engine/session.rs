//! One run of the topology update.

use super::options::TopologyUpdateOptions;
use super::state::MeshState;
use crate::debug_invariants::DebugInvariants;
use crate::topology::node::{NodeCategory, NodeKey};
use crate::topology_error::TopologyError;

/// Borrowed view of a [`MeshState`] for one topology update.
///
/// The phases run in a fixed order:
/// 1. clear the per-cycle outputs and remember the first permanent id
///    about to be minted;
/// 2. create children for every element that splits or is duplicated;
/// 3. connect each child to its neighbors' children;
/// 4. fail if a temporary node survived;
/// 5. move the crack-tip set from parents to tip-shaped children;
/// 6. collect the new permanent nodes and fold back those whose parent
///    node is no longer used.
///
/// # Example
/// ```rust
/// use fragment_sieve::engine::{MeshState, TopologySession, TopologyUpdateOptions};
/// use fragment_sieve::topology::ElementId;
///
/// let mut mesh = MeshState::new();
/// mesh.add_element(ElementId::new(0), 2, &[0, 1, 2, 3]).unwrap();
/// mesh.update_edge_neighbors().unwrap();
/// mesh.mark_edge_cut(ElementId::new(0), 0, 0.5).unwrap();
/// mesh.mark_edge_cut(ElementId::new(0), 2, 0.5).unwrap();
/// mesh.update_physical_links_and_fragments().unwrap();
/// TopologySession::new(&mut mesh, TopologyUpdateOptions::default()).run().unwrap();
/// assert_eq!(mesh.child_elements().len(), 2);
/// ```
pub struct TopologySession<'a> {
    state: &'a mut MeshState,
    options: TopologyUpdateOptions,
}

impl<'a> TopologySession<'a> {
    pub fn new(state: &'a mut MeshState, options: TopologyUpdateOptions) -> Self {
        Self { state, options }
    }

    pub fn options(&self) -> &TopologyUpdateOptions {
        &self.options
    }

    /// Run every phase; see the type docs for the order.
    pub fn run(self) -> Result<(), TopologyError> {
        let state = self.state;
        state.new_nodes.clear();
        state.child_elements.clear();
        state.parent_elements.clear();
        let first_new = state.nodes.new_id(NodeCategory::Permanent);

        state.create_child_elements()?;
        Self::connect_fragments(state, &self.options)?;
        Self::check_temp_nodes(state)?;
        state.update_crack_tip_elements()?;

        let fresh: Vec<NodeKey> = state
            .nodes
            .entries(NodeCategory::Permanent)
            .filter(|&(id, _)| id >= first_new)
            .map(|(_, key)| key)
            .collect();
        state.new_nodes = fresh;
        state.clear_potential_isolated_nodes()?;

        log::debug!(
            "topology updated: {} new node(s), {} child element(s), {} parent(s)",
            state.new_nodes.len(),
            state.child_elements.len(),
            state.parent_elements.len()
        );
        state.debug_assert_invariants();
        Ok(())
    }

    fn connect_fragments(state: &mut MeshState, options: &TopologyUpdateOptions) -> Result<(), TopologyError> {
        for child in state.child_elements.clone() {
            state.connect_neighbors(child, options)?;
            if options.duplicate_embedded_nodes {
                state.duplicate_embedded_nodes(child)?;
            }
            state.update_fragment_node(child)?;
        }
        Ok(())
    }

    fn check_temp_nodes(state: &MeshState) -> Result<(), TopologyError> {
        match state.nodes.count(NodeCategory::Temp) {
            0 => Ok(()),
            count => Err(TopologyError::ResidualTempNodes { count }),
        }
    }
}
