use crate::topology::edge::Edge;
use crate::topology::fragment::Fragment2D;
use crate::topology::node::NodeKey;
use crate::topology_error::TopologyError;

fn g(i: u32) -> NodeKey {
    NodeKey::Global(i)
}

/// Host edges of the unit quad 0-1-2-3.
fn quad_edges() -> Vec<Edge> {
    (0..4).map(|i| Edge::new(g(i), g((i + 1) % 4))).collect()
}

#[test]
fn edge_positions_follow_the_reference_node() {
    let mut e = Edge::new(g(0), g(1));
    e.add_intersection(0.25, g(10), g(1)).unwrap();
    assert!(e.has_intersection_at_position(0.75, g(0)).unwrap());
    assert!(e.has_intersection_at_position(0.25, g(1)).unwrap());
    assert!(!e.has_intersection_at_position(0.5, g(0)).unwrap());
    assert!((e.distance_from_node0(g(10)).unwrap() - 0.75).abs() < 1e-12);
    assert!(matches!(
        e.has_intersection_at_position(0.5, g(7)),
        Err(TopologyError::NodeNotOnBoundary { .. })
    ));
}

#[test]
fn reversing_an_edge_mirrors_its_cuts() {
    let mut e = Edge::new(g(0), g(1));
    e.add_intersection(0.2, g(10), g(0)).unwrap();
    e.reverse_nodes();
    assert_eq!(e.nodes(), [g(1), g(0)]);
    assert!((e.intersection(0, g(1)).unwrap() - 0.8).abs() < 1e-12);
    assert!((e.intersection(0, g(0)).unwrap() - 0.2).abs() < 1e-12);
}

#[test]
fn embedded_node_masters_are_linear_weights() {
    let mut e = Edge::new(g(0), g(1));
    e.add_intersection(0.25, g(10), g(0)).unwrap();
    let masters = e.node_masters(g(10)).unwrap();
    assert_eq!(masters[0].0, g(0));
    assert_eq!(masters[1].0, g(1));
    assert!((masters[0].1 - 0.75).abs() < 1e-12);
    assert!((masters[1].1 - 0.25).abs() < 1e-12);
    assert!(e.node_masters(g(99)).is_none());
}

#[test]
fn uncut_loop_does_not_split() {
    let frag = Fragment2D::from_loop(&[g(0), g(1), g(2), g(3)]);
    let pieces = frag.split(|_| false).unwrap();
    assert!(pieces.is_empty());
}

#[test]
fn two_edge_cuts_give_two_pieces() {
    let mut frag = Fragment2D::from_edges(quad_edges());
    frag.edge_mut(0).add_intersection(0.5, g(10), g(0)).unwrap();
    frag.edge_mut(2).add_intersection(0.5, g(11), g(2)).unwrap();
    assert_eq!(frag.num_cuts(), 2);

    let pieces = frag.split(|_| false).unwrap();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].loop_nodes(), vec![g(0), g(10), g(11), g(3)]);
    assert_eq!(pieces[1].loop_nodes(), vec![g(10), g(1), g(2), g(11)]);
    assert!(pieces[0].is_connected(&pieces[1]));
    assert_eq!(pieces[0].common_nodes(&pieces[1]).len(), 2);
    // the new edge joining the cuts lies inside the host
    assert_eq!(pieces[0].num_interior_edges(frag.edges()), 1);
}

#[test]
fn single_edge_cut_inserts_a_tip_vertex() {
    let mut frag = Fragment2D::from_edges(quad_edges());
    frag.edge_mut(0).add_intersection(0.5, g(10), g(0)).unwrap();
    let pieces = frag.split(|_| false).unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].loop_nodes(), vec![g(0), g(10), g(1), g(2), g(3)]);
}

#[test]
fn cut_node_with_edge_cut_splits_through_the_node() {
    let mut frag = Fragment2D::from_edges(quad_edges());
    frag.edge_mut(1).add_intersection(0.5, g(10), g(1)).unwrap();
    let pieces = frag.split(|n| n == g(3)).unwrap();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].loop_nodes(), vec![g(0), g(1), g(10), g(3)]);
    assert_eq!(pieces[1].loop_nodes(), vec![g(10), g(2), g(3)]);
}

#[test]
fn edge_with_two_cuts_cannot_split() {
    let mut frag = Fragment2D::from_edges(quad_edges());
    frag.edge_mut(0).add_intersection(0.3, g(10), g(0)).unwrap();
    frag.edge_mut(0).add_intersection(0.6, g(11), g(0)).unwrap();
    assert!(matches!(
        frag.split(|_| false),
        Err(TopologyError::InvalidFragment { .. })
    ));
}

#[test]
fn tip_edges_recombine_into_one_cut_edge() {
    let mut host = quad_edges();
    host[0].add_intersection(0.5, g(10), g(0)).unwrap();
    let mut frag = Fragment2D::from_loop(&[g(0), g(10), g(1), g(2), g(3)]);
    assert_eq!(frag.tip_edge(&host), Some(0));

    frag.combine_tip_edges(&host).unwrap();
    assert_eq!(frag.num_edges(), 4);
    assert_eq!(frag.edge(0).nodes(), [g(0), g(1)]);
    assert_eq!(frag.edge(0).embedded_nodes(), &[g(10)]);
    assert!(frag.edge(0).has_intersection_at_position(0.5, g(0)).unwrap());
    assert_eq!(frag.tip_edge(&host), None);
}

#[test]
fn switch_node_renames_every_edge() {
    let mut frag = Fragment2D::from_loop(&[g(0), g(1), g(2)]);
    frag.switch_node(g(9), g(1));
    assert_eq!(frag.loop_nodes(), vec![g(0), g(9), g(2)]);
    assert!(!frag.contains_node(g(1)));
}
