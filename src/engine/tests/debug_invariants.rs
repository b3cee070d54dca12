use super::*;
use crate::debug_invariants::{DebugInvariants, invariants_enabled};

#[test]
fn consistent_mesh_passes() {
    let mut s = two_quads();
    s.mark_edge_cut(eid(0), 3, 0.5).unwrap();
    s.mark_edge_cut(eid(0), 1, 0.5).unwrap();
    s.mark_edge_cut(eid(1), 1, 0.5).unwrap();
    run(&mut s);
    assert!(s.validate_invariants().is_ok());
    s.debug_assert_invariants();
}

#[test]
fn checks_follow_the_build_flags() {
    let expected = cfg!(any(
        debug_assertions,
        feature = "strict-invariants",
        feature = "check-invariants"
    ));
    assert_eq!(invariants_enabled(), expected);
}

#[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
#[test]
#[should_panic(expected = "[invariants] MeshState invariants")]
fn asymmetric_neighbors_panic_when_checks_are_on() {
    let mut s = two_quads();
    s.element_mut(eid(1)).unwrap().clear_neighbors();
    s.debug_assert_invariants();
}
