use super::quad_nodes;
use crate::topology::element::{Element, ElementId};
use crate::topology::element_kind::ElementKind;
use crate::topology::node::{NodeCategory, NodeKey, NodeRegistry};
use crate::topology_error::TopologyError;

fn quad(reg: &mut NodeRegistry) -> Element {
    Element::new(ElementId::new(0), ElementKind::Quad4, quad_nodes(reg)).unwrap()
}

/// Quad cut straight through edges 0 and 2 and split into fragments.
fn split_quad(reg: &mut NodeRegistry) -> Element {
    let mut elem = quad(reg);
    elem.record_edge_cut(0, 0.5, None, reg).unwrap();
    elem.record_edge_cut(2, 0.5, None, reg).unwrap();
    elem.update_fragments(false, reg).unwrap();
    elem
}

#[test]
fn node_count_must_match_kind() {
    let mut reg = NodeRegistry::new();
    let nodes = quad_nodes(&mut reg)[..3].to_vec();
    assert!(matches!(
        Element::new(ElementId::new(4), ElementKind::Quad4, nodes),
        Err(TopologyError::UnsupportedNodeCount { found: 3, .. })
    ));
}

#[test]
fn fresh_quad_has_edges_and_no_fragments() {
    let mut reg = NodeRegistry::new();
    let elem = quad(&mut reg);
    assert_eq!(elem.dimension(), 2);
    assert_eq!(elem.num_boundaries(), 4);
    assert_eq!(elem.num_fragments(), 0);
    assert!(!elem.is_partial());
    let edges = elem.planar().unwrap().edges();
    assert_eq!(edges[1].nodes(), [elem.node(1), elem.node(2)]);
    assert_eq!(edges[3].nodes(), [elem.node(3), elem.node(0)]);
}

#[test]
fn recording_the_same_cut_twice_reuses_its_node() {
    let mut reg = NodeRegistry::new();
    let mut elem = quad(&mut reg);
    let first = elem.record_edge_cut(0, 0.4, None, &mut reg).unwrap();
    let emb = first.embedded.unwrap();
    assert_eq!(reg.category(emb).unwrap(), NodeCategory::Embedded);

    let again = elem.record_edge_cut(0, 0.4, None, &mut reg).unwrap();
    assert_eq!(again.embedded, Some(emb));
    assert_eq!(elem.num_cuts(), 1);

    let other = reg.create(NodeCategory::Embedded, None);
    assert!(matches!(
        elem.record_edge_cut(0, 0.4, Some(other), &mut reg),
        Err(TopologyError::ConflictingEmbeddedNode { boundary: 0, .. })
    ));
}

#[test]
fn cut_on_missing_edge_is_rejected() {
    let mut reg = NodeRegistry::new();
    let mut elem = quad(&mut reg);
    assert!(matches!(
        elem.record_edge_cut(7, 0.5, None, &mut reg),
        Err(TopologyError::BoundaryOutOfRange { index: 7, .. })
    ));
}

#[test]
fn straight_cut_splits_into_two_fragments() {
    let mut reg = NodeRegistry::new();
    let elem = split_quad(&mut reg);
    assert_eq!(elem.num_fragments(), 2);
    assert!(!elem.is_crack_tip_element());
    let planar = elem.planar().unwrap();
    let a = planar.edge(0).embedded_node(0).unwrap();
    let b = planar.edge(2).embedded_node(0).unwrap();
    assert_eq!(
        planar.fragments()[0].loop_nodes(),
        vec![elem.node(0), a, b, elem.node(3)]
    );
    assert!(planar.fragments()[1].contains_node(elem.node(1)));
    assert!(elem.cut_plane(1).is_ok());
    assert!(matches!(
        elem.cut_plane(2),
        Err(TopologyError::FragmentOutOfRange { index: 2, count: 2, .. })
    ));
}

#[test]
fn single_cut_leaves_a_crack_tip() {
    let mut reg = NodeRegistry::new();
    let mut elem = quad(&mut reg);
    elem.record_edge_cut(1, 0.5, None, &mut reg).unwrap();
    elem.update_fragments(false, &mut reg).unwrap();
    assert_eq!(elem.num_fragments(), 1);
    assert!(elem.is_crack_tip_element());
    assert_eq!(elem.planar().unwrap().fragments()[0].num_edges(), 5);
}

#[test]
fn uncut_update_leaves_no_fragments() {
    let mut reg = NodeRegistry::new();
    let mut elem = quad(&mut reg);
    elem.update_fragments(false, &mut reg).unwrap();
    assert_eq!(elem.num_fragments(), 0);
}

#[test]
fn embedded_node_interpolates_from_its_edge() {
    let mut reg = NodeRegistry::new();
    let mut elem = quad(&mut reg);
    let emb = elem
        .record_edge_cut(0, 0.25, None, &mut reg)
        .unwrap()
        .embedded
        .unwrap();
    let masters = elem.master_info(emb).unwrap();
    assert_eq!(masters.len(), 2);
    assert_eq!(masters[0].0, elem.node(0));
    assert!((masters[0].1 - 0.75).abs() < 1e-12);
    assert!((masters[1].1 - 0.25).abs() < 1e-12);

    let xi = elem.local_coords(emb).unwrap();
    assert!((xi[0] - 0.25).abs() < 1e-12);
    assert!(xi[1].abs() < 1e-12);

    let stranger = reg.create(NodeCategory::Embedded, None);
    assert!(elem.master_info(stranger).is_err());
}

#[test]
fn localized_copy_restores_onto_other_nodes() {
    let mut reg = NodeRegistry::new();
    let cut = split_quad(&mut reg);
    let local = cut.to_local();
    assert!(local.nodes().iter().all(|n| n.is_local()));

    let fresh_nodes: Vec<NodeKey> = (10..14).map(|i| reg.permanent_or_insert(i)).collect();
    let mut fresh = Element::new(ElementId::new(3), ElementKind::Quad4, fresh_nodes.clone()).unwrap();
    fresh.restore_from(&local).unwrap();
    assert_eq!(fresh.num_fragments(), 2);
    assert_eq!(fresh.num_cuts(), 2);
    let frag = &fresh.planar().unwrap().fragments()[0];
    assert!(frag.contains_node(fresh_nodes[0]));
    assert!(!frag.all_nodes().iter().any(|n| n.is_local()));
}

#[test]
fn restoring_onto_a_cut_element_conflicts() {
    let mut reg = NodeRegistry::new();
    let mut cut = split_quad(&mut reg);
    let local = cut.to_local();
    assert!(matches!(
        cut.restore_from(&local),
        Err(TopologyError::RestoreConflict { .. })
    ));
}

#[test]
fn unlisted_neighbor_is_asymmetric() {
    let mut reg = NodeRegistry::new();
    let elem = quad(&mut reg);
    assert!(matches!(
        elem.neighbor_index(ElementId::new(9)),
        Err(TopologyError::AsymmetricNeighbor { .. })
    ));
}

#[test]
fn new_child_inherits_one_fragment() {
    let mut reg = NodeRegistry::new();
    let parent = split_quad(&mut reg);
    let temps: Vec<NodeKey> = parent
        .nodes()
        .iter()
        .map(|&n| reg.create(NodeCategory::Temp, Some(n)))
        .collect();
    let mut nodes = parent.nodes().to_vec();
    nodes[1] = temps[1];
    nodes[2] = temps[2];
    let child = parent.new_child(ElementId::new(1), nodes, 0).unwrap();
    assert_eq!(child.parent(), Some(parent.id()));
    assert_eq!(child.num_fragments(), 1);
    assert_eq!(child.num_cuts(), 2);
}
