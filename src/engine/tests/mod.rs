use super::*;
use crate::topology::element::ElementId;
use crate::topology::node::NodeKey;





#[path = "crack_tip_tests.rs"]
mod crack_tip_tests;

#[path = "session_tests.rs"]
mod session_tests;

#[path = "report_tests.rs"]
mod report_tests;

mod debug_invariants;

pub(crate) fn eid(raw: u32) -> ElementId {
    ElementId::new(raw)
}

/// Quads 0 = [0, 1, 2, 3] and 1 = [1, 4, 5, 2] sharing edge 1-2, with
/// neighbors and crack tips initialized.
pub(crate) fn two_quads() -> MeshState {
    let mut s = MeshState::new();
    s.add_element(eid(0), 2, &[0, 1, 2, 3]).unwrap();
    s.add_element(eid(1), 2, &[1, 4, 5, 2]).unwrap();
    s.update_edge_neighbors().unwrap();
    s.init_crack_tip_topology().unwrap();
    s
}

/// Fragment update followed by a default topology session.
pub(crate) fn run(s: &mut MeshState) {
    s.update_physical_links_and_fragments().unwrap();
    TopologySession::new(s, TopologyUpdateOptions::default())
        .run()
        .unwrap();
}

/// Next cycle on the same state.
pub(crate) fn next_cycle(s: &mut MeshState) {
    s.clear_ancestry().unwrap();
    s.update_edge_neighbors().unwrap();
    s.init_crack_tip_topology().unwrap();
}

pub(crate) fn node_ids(s: &MeshState, id: ElementId) -> Vec<u32> {
    ids_of(s, s.element(id).unwrap().nodes())
}

pub(crate) fn ids_of(s: &MeshState, keys: &[NodeKey]) -> Vec<u32> {
    keys.iter().map(|&k| s.nodes().id(k).unwrap()).collect()
}
