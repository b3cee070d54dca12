use super::*;

#[test]
fn report_lists_nodes_and_elements() {
    let mut s = MeshState::new();
    s.add_element(eid(0), 2, &[0, 1, 2, 3]).unwrap();
    s.update_edge_neighbors().unwrap();
    s.mark_edge_cut(eid(0), 0, 0.5).unwrap();
    s.mark_edge_cut(eid(0), 2, 0.5).unwrap();
    run(&mut s);

    let text = s.to_string();
    assert!(text.contains("permanent nodes: 0 1 2 3 4 5 6 7"));
    assert!(text.contains("embedded nodes: 0 1"));
    assert!(text.contains("parent elements: 0"));
    assert!(text.contains("child elements: 1 2"));
    assert!(text.contains("fragment 0: "));
    assert!(text.contains("fragment 1: "));
    assert!(text.contains("0e"));
}

#[test]
fn report_of_an_empty_mesh() {
    let s = MeshState::new();
    let text = format!("{s}");
    assert!(text.contains("temporary nodes: \n"));
    assert!(text.ends_with("elements:\n"));
}
