#![allow(dead_code)]
use fragment_sieve::prelude::*;

pub fn eid(raw: u32) -> ElementId {
    ElementId::new(raw)
}

/// Driver with neighbors and crack tips initialized for `quads`.
pub fn quad_driver(quads: &[[u32; 4]]) -> TopologyDriver {
    let mut d = TopologyDriver::new();
    d.add_2d_elements(quads.iter()).unwrap();
    d.update_edge_neighbors().unwrap();
    d.init_crack_tip_topology().unwrap();
    d
}

/// Driver with neighbors and crack tips initialized for `solids`.
pub fn solid_driver(solids: &[&[u32]]) -> TopologyDriver {
    let mut d = TopologyDriver::new();
    d.add_3d_elements(solids.iter()).unwrap();
    d.update_edge_neighbors().unwrap();
    d.init_crack_tip_topology().unwrap();
    d
}

/// Close the cycle and prepare the next one.
pub fn next_cycle(d: &mut TopologyDriver) {
    d.clear_ancestry().unwrap();
    d.update_edge_neighbors().unwrap();
    d.init_crack_tip_topology().unwrap();
}

pub fn update(d: &mut TopologyDriver) {
    d.run_topology_update(TopologyUpdateOptions::default()).unwrap();
}

/// Registry ids of the nodes of element `id`.
pub fn node_ids(d: &TopologyDriver, id: ElementId) -> Vec<u32> {
    ids_of(d, d.element(id).unwrap().nodes())
}

pub fn ids_of(d: &TopologyDriver, keys: &[NodeKey]) -> Vec<u32> {
    keys.iter().map(|&k| d.nodes().id(k).unwrap()).collect()
}

pub fn raw(ids: &[ElementId]) -> Vec<u32> {
    ids.iter().map(|e| e.get()).collect()
}

/// Number of nodes elements `a` and `b` have in common.
pub fn shared_nodes(d: &TopologyDriver, a: ElementId, b: ElementId) -> usize {
    let other = d.element(b).unwrap();
    d.element(a)
        .unwrap()
        .nodes()
        .iter()
        .filter(|&&n| other.contains_node(n))
        .count()
}
