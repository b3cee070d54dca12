use super::*;

/// Scenario: the crack enters element 1 through edge 1 and stops on the
/// shared edge 1-2, leaving element 0 as the tip.
fn tip_in_element_zero() -> MeshState {
    let mut s = two_quads();
    s.mark_edge_cut(eid(1), 1, 0.5).unwrap();
    s.mark_edge_cut(eid(1), 3, 0.5).unwrap();
    s
}

#[test]
fn fresh_mesh_has_no_tip() {
    let s = two_quads();
    assert!(s.crack_tip_elements().is_empty());
    assert!(s.elements().all(|e| !e.is_crack_tip_split()));
}

#[test]
fn new_tip_is_duplicated() {
    let mut s = tip_in_element_zero();
    s.update_physical_links_and_fragments().unwrap();
    assert!(s.element(eid(0)).unwrap().is_crack_tip_element());
    assert!(s.should_duplicate_for_crack_tip(eid(0)).unwrap());
    assert!(!s.should_duplicate_for_crack_tip(eid(1)).unwrap());
}

#[test]
fn tip_child_is_tracked_next_cycle() {
    let mut s = tip_in_element_zero();
    run(&mut s);
    assert_eq!(s.crack_tip_elements().iter().copied().collect::<Vec<_>>(), vec![eid(2)]);

    next_cycle(&mut s);
    assert_eq!(s.crack_tip_elements().iter().copied().collect::<Vec<_>>(), vec![eid(2)]);
    for split in [eid(3), eid(4)] {
        let elem = s.element(split).unwrap();
        assert!(elem.is_crack_tip_split());
        assert_eq!(elem.crack_tip_neighbors(), &[3]);
    }
    assert_eq!(s.crack_tip_split_element_id(eid(2)).unwrap(), Some(eid(3)));
    assert_eq!(s.crack_tip_split_element_id(eid(3)).unwrap(), None);
}

#[test]
fn tip_boundary_faces_both_children() {
    let mut s = tip_in_element_zero();
    run(&mut s);
    next_cycle(&mut s);
    let tip = s.element(eid(2)).unwrap();
    assert_eq!(tip.boundary_neighbors(1), &[eid(3), eid(4)]);
    // the two children overlay each other
    let c3 = s.element(eid(3)).unwrap();
    assert!((0..4).all(|b| !c3.boundary_neighbors(b).contains(&eid(4))));
}

#[test]
fn third_crack_tip_boundary_is_fatal() {
    let mut s = two_quads();
    let elem = s.element_mut(eid(0)).unwrap();
    elem.add_crack_tip_neighbor(0).unwrap();
    elem.add_crack_tip_neighbor(1).unwrap();
    // repeating a boundary does not count twice
    elem.add_crack_tip_neighbor(1).unwrap();
    assert_eq!(
        elem.add_crack_tip_neighbor(2).unwrap_err(),
        crate::topology_error::TopologyError::TooManyCrackTipNeighbors { elem: eid(0) }
    );
}
