use super::*;
use crate::topology::node::NodeCategory;
use crate::topology_error::TopologyError;

fn ids(list: &[ElementId]) -> Vec<u32> {
    list.iter().map(|e| e.get()).collect()
}

#[test]
fn uncut_mesh_is_left_alone() {
    let mut s = two_quads();
    run(&mut s);
    assert!(s.child_elements().is_empty());
    assert!(s.parent_elements().is_empty());
    assert!(s.new_nodes().is_empty());
    assert_eq!(s.num_elements(), 2);
    assert!(s.elements().all(|e| e.num_fragments() == 0));
}

#[test]
fn straight_cut_splits_one_quad() {
    let mut s = MeshState::new();
    s.add_element(eid(0), 2, &[0, 1, 2, 3]).unwrap();
    s.update_edge_neighbors().unwrap();
    s.init_crack_tip_topology().unwrap();
    s.mark_edge_cut(eid(0), 0, 0.5).unwrap();
    s.mark_edge_cut(eid(0), 2, 0.5).unwrap();
    run(&mut s);

    assert_eq!(ids(s.parent_elements()), vec![0]);
    assert_eq!(ids(s.child_elements()), vec![1, 2]);
    assert_eq!(node_ids(&s, eid(1)), vec![0, 4, 5, 3]);
    assert_eq!(node_ids(&s, eid(2)), vec![6, 1, 2, 7]);
    assert_eq!(ids_of(&s, s.new_nodes()), vec![4, 5, 6, 7]);
    assert!(s.crack_tip_elements().is_empty());
    assert_eq!(s.element(eid(0)).unwrap().children(), &[eid(1), eid(2)]);
    assert_eq!(s.element(eid(1)).unwrap().parent(), Some(eid(0)));
    // every new node is a copy of a corner of the parent
    let p1 = s.element(eid(0)).unwrap().node(1);
    let n4 = s.element(eid(1)).unwrap().node(1);
    assert_eq!(s.nodes().parent(n4), Some(p1));
    assert_eq!(s.nodes().count(NodeCategory::Temp), 0);
}

#[test]
fn crack_ending_on_a_shared_edge_duplicates_the_tip() {
    let mut s = two_quads();
    s.mark_edge_cut(eid(1), 1, 0.5).unwrap();
    s.mark_edge_cut(eid(1), 3, 0.5).unwrap();
    run(&mut s);

    assert_eq!(ids(s.parent_elements()), vec![0, 1]);
    assert_eq!(ids(s.child_elements()), vec![2, 3, 4]);
    assert_eq!(node_ids(&s, eid(2)), vec![0, 1, 2, 3]);
    assert_eq!(node_ids(&s, eid(3)), vec![1, 4, 6, 2]);
    assert_eq!(node_ids(&s, eid(4)), vec![1, 7, 5, 2]);
    assert_eq!(ids_of(&s, s.new_nodes()), vec![6, 7]);
    assert_eq!(ids(&s.crack_tip_elements().iter().copied().collect::<Vec<_>>()), vec![2]);
}

#[test]
fn crack_through_two_quads() {
    let mut s = two_quads();
    s.mark_edge_cut(eid(0), 3, 0.5).unwrap();
    s.mark_edge_cut(eid(0), 1, 0.5).unwrap();
    s.mark_edge_cut(eid(1), 1, 0.5).unwrap();
    run(&mut s);

    assert_eq!(ids(s.parent_elements()), vec![0, 1]);
    assert_eq!(node_ids(&s, eid(2)), vec![0, 1, 6, 7]);
    assert_eq!(node_ids(&s, eid(3)), vec![9, 8, 2, 3]);
    assert_eq!(node_ids(&s, eid(4)), vec![1, 4, 10, 6]);
    assert_eq!(node_ids(&s, eid(5)), vec![8, 11, 5, 2]);
    assert_eq!(s.new_nodes().len(), 6);
    assert!(s.crack_tip_elements().is_empty());
}

#[test]
fn crack_extending_through_the_tip() {
    let mut s = two_quads();
    s.mark_edge_cut(eid(1), 1, 0.5).unwrap();
    s.mark_edge_cut(eid(1), 3, 0.5).unwrap();
    run(&mut s);
    next_cycle(&mut s);

    s.mark_edge_cut(eid(2), 3, 0.5).unwrap();
    run(&mut s);
    assert_eq!(ids(s.parent_elements()), vec![2, 3, 4]);
    assert_eq!(node_ids(&s, eid(5)), vec![0, 1, 8, 9]);
    assert_eq!(node_ids(&s, eid(6)), vec![11, 10, 2, 3]);
    assert_eq!(node_ids(&s, eid(7)), vec![1, 4, 6, 8]);
    assert_eq!(node_ids(&s, eid(8)), vec![10, 7, 5, 2]);
    assert_eq!(ids_of(&s, s.new_nodes()), vec![8, 9, 10, 11]);
    assert!(s.crack_tip_elements().is_empty());
}

#[test]
fn duplicated_cut_points_on_free_edges() {
    let mut s = MeshState::new();
    s.add_element(eid(0), 2, &[0, 1, 2, 3]).unwrap();
    s.update_edge_neighbors().unwrap();
    s.mark_edge_cut(eid(0), 0, 0.5).unwrap();
    s.mark_edge_cut(eid(0), 2, 0.5).unwrap();
    s.update_physical_links_and_fragments().unwrap();
    let options = TopologyUpdateOptions::default().with_duplicate_embedded_nodes(true);
    TopologySession::new(&mut s, options).run().unwrap();

    assert_eq!(s.nodes().count(NodeCategory::Embedded), 4);
    let first = s.element(eid(1)).unwrap().topo().boundary_embedded_nodes(0);
    let second = s.element(eid(2)).unwrap().topo().boundary_embedded_nodes(0);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);
}

/// Quads 0 and 1 side by side, each cut vertically at mid-width, so
/// their shared edge stays uncut.
fn two_vertical_cuts(options: TopologyUpdateOptions) -> MeshState {
    let mut s = two_quads();
    for id in [eid(0), eid(1)] {
        s.mark_edge_cut(id, 0, 0.5).unwrap();
        s.mark_edge_cut(id, 2, 0.5).unwrap();
    }
    s.update_physical_links_and_fragments().unwrap();
    TopologySession::new(&mut s, options).run().unwrap();
    s
}

#[test]
fn phantom_copies_merge_across_an_uncut_edge() {
    let s = two_vertical_cuts(TopologyUpdateOptions::default());
    assert_eq!(ids(s.child_elements()), vec![2, 3, 4, 5]);
    assert_eq!(s.new_nodes().len(), 6);
    assert_eq!(node_ids(&s, eid(5)), vec![6, 4, 5, 7]);
    let left = [eid(2), eid(3)]
        .iter()
        .find(|&&c| node_ids(&s, c).contains(&6))
        .copied();
    assert!(left.is_some_and(|c| node_ids(&s, c).contains(&7)));
}

#[test]
fn partial_duplication_keeps_phantom_copies_apart() {
    let options = TopologyUpdateOptions::default().with_merge_phantom_edges(false);
    let s = two_vertical_cuts(options);
    assert_eq!(s.new_nodes().len(), 8);
    assert_eq!(node_ids(&s, eid(5)), vec![12, 4, 5, 13]);
    for c in [eid(2), eid(3), eid(4)] {
        let nodes = node_ids(&s, c);
        assert!(!nodes.contains(&12) && !nodes.contains(&13));
    }
}

#[test]
fn leftover_temporary_node_fails_the_update() {
    let mut s = two_quads();
    s.nodes.create(NodeCategory::Temp, None);
    s.update_physical_links_and_fragments().unwrap();
    let err = TopologySession::new(&mut s, TopologyUpdateOptions::default())
        .run()
        .unwrap_err();
    assert_eq!(err, TopologyError::ResidualTempNodes { count: 1 });
    assert_eq!(err.class(), crate::topology_error::ErrorClass::ResidualState);
}
