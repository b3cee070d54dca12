mod util;
use fragment_sieve::prelude::*;
use util::*;

/// Crack enters element 1 through edge 1 and stops on the edge shared
/// with element 0.
fn tip_after_first_cycle() -> TopologyDriver {
    let mut d = quad_driver(&[[0, 1, 2, 3], [1, 4, 5, 2]]);
    d.mark_edge_cut(eid(1), 1, 0.5).unwrap();
    d.mark_edge_cut(eid(1), 3, 0.5).unwrap();
    update(&mut d);
    next_cycle(&mut d);
    d
}

#[test]
fn tip_is_found_again_after_clearing_ancestry() {
    let d = tip_after_first_cycle();
    assert_eq!(raw(&d.crack_tip_elements().iter().copied().collect::<Vec<_>>()), vec![2]);
    assert_eq!(d.crack_tip_split_element_id(eid(2)).unwrap(), Some(eid(3)));
    let split = d.element(eid(4)).unwrap();
    assert!(split.is_crack_tip_split());
    assert_eq!(split.crack_tip_neighbors(), &[3]);
    assert!(!d.element(eid(2)).unwrap().is_crack_tip_split());
}

#[test]
fn idle_cycle_changes_nothing() {
    let mut d = tip_after_first_cycle();
    update(&mut d);
    assert!(d.child_elements().is_empty());
    assert!(d.parent_elements().is_empty());
    assert!(d.new_nodes().is_empty());
    assert_eq!(d.num_elements(), 3);
    assert_eq!(raw(&d.crack_tip_elements().iter().copied().collect::<Vec<_>>()), vec![2]);
}

#[test]
fn crack_grows_through_the_tip() {
    let mut d = tip_after_first_cycle();
    assert!(d.mark_edge_cut(eid(2), 3, 0.5).unwrap().is_applied());
    update(&mut d);

    assert_eq!(raw(d.parent_elements()), vec![2, 3, 4]);
    assert_eq!(raw(d.child_elements()), vec![5, 6, 7, 8]);
    assert_eq!(node_ids(&d, eid(5)), vec![0, 1, 8, 9]);
    assert_eq!(node_ids(&d, eid(6)), vec![11, 10, 2, 3]);
    assert_eq!(node_ids(&d, eid(7)), vec![1, 4, 6, 8]);
    assert_eq!(node_ids(&d, eid(8)), vec![10, 7, 5, 2]);
    assert_eq!(ids_of(&d, d.new_nodes()), vec![8, 9, 10, 11]);
    assert!(d.crack_tip_elements().is_empty());

    next_cycle(&mut d);
    assert_eq!(d.num_elements(), 4);
    assert!(d.crack_tip_elements().is_empty());
}
