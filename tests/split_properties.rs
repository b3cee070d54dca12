mod util;
use fragment_sieve::prelude::*;
use proptest::prelude::*;
use util::*;

/// A row of `n` unit quads: bottom nodes 0..=n, top nodes n+1..=2n+1.
fn strip(n: u32) -> Vec<[u32; 4]> {
    let top = |i: u32| n + 1 + i;
    (0..n).map(|i| [i, i + 1, top(i + 1), top(i)]).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_straight_cut_splits_a_quad(p in 0.05f64..0.95, q in 0.05f64..0.95) {
        let mut d = quad_driver(&[[0, 1, 2, 3]]);
        prop_assert!(d.mark_edge_cut(eid(0), 0, p).unwrap().is_applied());
        prop_assert!(d.mark_edge_cut(eid(0), 2, q).unwrap().is_applied());
        update(&mut d);

        prop_assert_eq!(d.child_elements().len(), 2);
        prop_assert_eq!(d.new_nodes().len(), 4);
        prop_assert_eq!(shared_nodes(&d, eid(1), eid(2)), 0);
        let parent = d.element(eid(0)).unwrap();
        for b in [0, 2] {
            let cut = parent.planar().unwrap().edge(b).embedded_nodes()[0];
            let weights: f64 = d.master_info(eid(0), cut).unwrap().iter().map(|m| m.1).sum();
            prop_assert!((weights - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn crack_along_a_strip(n in 1u32..6, heights in prop::collection::vec(0.05f64..0.95, 7)) {
        let mut d = quad_driver(&strip(n));
        d.mark_edge_cut(eid(0), 3, heights[0]).unwrap();
        for i in 0..n {
            let outcome = d.mark_edge_cut(eid(i), 1, heights[i as usize + 1]).unwrap();
            prop_assert!(outcome.is_applied());
        }
        update(&mut d);

        let n = n as usize;
        prop_assert_eq!(d.parent_elements().len(), n);
        prop_assert_eq!(d.child_elements().len(), 2 * n);
        prop_assert_eq!(d.new_nodes().len(), 2 * n + 2);
        prop_assert!(d.crack_tip_elements().is_empty());
        prop_assert!(d.state().validate_invariants().is_ok());
        for &child in d.child_elements() {
            prop_assert_eq!(d.element(child).unwrap().num_fragments(), 1);
        }
    }
}

/// Closed loop through global nodes `0..n`.
fn polygon(n: usize) -> Fragment2D {
    let nodes: Vec<NodeKey> = (0..n as u32).map(NodeKey::Global).collect();
    Fragment2D::from_loop(&nodes)
}

/// Cut edge `i` of `frag` at `x` with a fresh embedded node.
fn cut(frag: &mut Fragment2D, i: usize, x: f64) {
    let emb = NodeKey::Global(1000 + i as u32);
    let from = frag.edge(i).node(0);
    frag.edge_mut(i).add_intersection(x, emb, from).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn uncut_polygon_yields_no_pieces(n in 3usize..10) {
        prop_assert!(polygon(n).split(|_| false).unwrap().is_empty());
    }

    #[test]
    fn single_cut_adds_one_vertex(n in 3usize..10, i in 0usize..10, x in 0.05f64..0.95) {
        let i = i % n;
        let mut frag = polygon(n);
        cut(&mut frag, i, x);
        let pieces = frag.split(|_| false).unwrap();
        prop_assert_eq!(pieces.len(), 1);
        prop_assert_eq!(pieces[0].num_edges(), n + 1);
    }

    #[test]
    fn two_cuts_add_four_edges(
        n in 4usize..10,
        i in 0usize..10,
        gap in 2usize..8,
        x in 0.05f64..0.95,
        y in 0.05f64..0.95,
    ) {
        let i = i % n;
        let j = (i + gap) % n;
        // non-adjacent edges on both sides of the loop
        prop_assume!(gap < n - 1);
        let mut frag = polygon(n);
        cut(&mut frag, i, x);
        cut(&mut frag, j, y);

        let pieces = frag.split(|_| false).unwrap();
        prop_assert_eq!(pieces.len(), 2);
        let total: usize = pieces.iter().map(Fragment2D::num_edges).sum();
        prop_assert_eq!(total, n + 4);
        for piece in &pieces {
            prop_assert!(piece.num_edges() >= 4);
            prop_assert!(piece.contains_node(NodeKey::Global(1000 + i as u32)));
            prop_assert!(piece.contains_node(NodeKey::Global(1000 + j as u32)));
        }
    }
}
