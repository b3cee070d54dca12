mod util;
use fragment_sieve::prelude::*;
use util::*;

/// Quad 0 with two fragments and no children yet.
fn split_but_not_updated() -> TopologyDriver {
    let mut d = quad_driver(&[[0, 1, 2, 3]]);
    d.mark_edge_cut(eid(0), 0, 0.25).unwrap();
    d.mark_edge_cut(eid(0), 2, 0.5).unwrap();
    d.update_physical_links_and_fragments().unwrap();
    d
}

#[test]
fn snapshot_survives_json_and_bincode() {
    let d = split_but_not_updated();
    let snap = d.snapshot_element(eid(0)).unwrap();
    assert_eq!(snap.id(), eid(0));
    assert_eq!(snap.kind(), ElementKind::Quad4);
    assert_eq!(snap.num_fragments(), 2);
    assert!(snap.element().nodes().iter().all(|n| n.is_local()));

    let json = serde_json::to_string(&snap).unwrap();
    let back: ElementSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);

    let bytes = bincode::serialize(&snap).unwrap();
    let back: ElementSnapshot = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn snapshot_is_restored_onto_renumbered_nodes() {
    let mut d = split_but_not_updated();
    let snap = d.snapshot_element(eid(0)).unwrap();
    let cut = d.element(eid(0)).unwrap().planar().unwrap().edge(0).embedded_nodes()[0];

    d.reset();
    let id = d.add_2d_element(&[10, 11, 12, 13], 0).unwrap();
    d.restore_fragment(id, &snap).unwrap();

    let elem = d.element(id).unwrap();
    assert_eq!(elem.num_fragments(), 2);
    assert_eq!(ids_of(&d, elem.nodes()), vec![10, 11, 12, 13]);
    let mut masters: Vec<(u32, f64)> = d
        .master_info(id, cut)
        .unwrap()
        .into_iter()
        .map(|(n, w)| (d.nodes().id(n).unwrap(), w))
        .collect();
    masters.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(masters.len(), 2);
    assert_eq!(masters[0].0, 10);
    assert!((masters[0].1 - 0.75).abs() < TOL);
    assert_eq!(masters[1].0, 11);
    assert!((masters[1].1 - 0.25).abs() < TOL);
}

#[test]
fn restore_requires_a_blank_target() {
    let mut d = split_but_not_updated();
    let snap = d.snapshot_element(eid(0)).unwrap();
    assert!(matches!(
        d.restore_fragment(eid(0), &snap),
        Err(TopologyError::RestoreConflict { .. })
    ));
}

#[test]
fn uncut_snapshot_has_no_fragments() {
    let d = quad_driver(&[[0, 1, 2, 3]]);
    let snap = d.snapshot_element(eid(0)).unwrap();
    assert_eq!(snap.num_fragments(), 0);
    let json = serde_json::to_value(&snap).unwrap();
    assert!(json.is_object());
}
