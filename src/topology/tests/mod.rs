use super::*;

#[path = "node_tests.rs"]
mod node_tests;

#[path = "fragment_tests.rs"]
mod fragment_tests;

#[path = "element_tests.rs"]
mod element_tests;

/// Quad corners 0..3 registered as permanent nodes.
pub(crate) fn quad_nodes(reg: &mut NodeRegistry) -> Vec<NodeKey> {
    (0..4).map(|i| reg.permanent_or_insert(i)).collect()
}
