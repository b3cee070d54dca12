//! Plain-text mesh report.

use super::state::MeshState;
use crate::topology::element::Element;
use crate::topology::node::{NodeCategory, NodeKey, NodeRegistry};
use itertools::Itertools;
use std::fmt;

fn node_list(nodes: &NodeRegistry, keys: &[NodeKey]) -> Result<String, fmt::Error> {
    keys.iter()
        .map(|&k| nodes.id_cat_string(k))
        .process_results(|mut labels| labels.join(" "))
        .map_err(|e| {
            log::error!("mesh report: {e}");
            fmt::Error
        })
}

fn write_element(f: &mut fmt::Formatter<'_>, nodes: &NodeRegistry, elem: &Element) -> fmt::Result {
    let topo = elem.topo();
    let cuts = (0..elem.num_boundaries())
        .map(|b| node_list(nodes, &topo.boundary_embedded_nodes(b)))
        .process_results(|mut lists| lists.join(" | "))?;
    let neighbors = (0..elem.num_boundaries())
        .map(|b| elem.boundary_neighbors(b).iter().join(","))
        .join(" | ");
    writeln!(
        f,
        "{:>5} | {} | cuts: {} | neighbors: {}",
        elem.id(),
        node_list(nodes, elem.nodes())?,
        cuts,
        neighbors
    )?;
    for i in 0..topo.num_fragments() {
        let loops = topo
            .fragment_node_lists(i)
            .iter()
            .map(|l| node_list(nodes, l))
            .process_results(|mut lists| lists.join(" / "))?;
        writeln!(f, "      fragment {i}: {loops}")?;
    }
    Ok(())
}

impl fmt::Display for MeshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, category) in [
            ("permanent", NodeCategory::Permanent),
            ("temporary", NodeCategory::Temp),
            ("embedded", NodeCategory::Embedded),
            ("embedded permanent", NodeCategory::EmbeddedPermanent),
        ] {
            writeln!(f, "{label} nodes: {}", self.nodes.ids(category).iter().join(" "))?;
        }
        writeln!(f, "parent elements: {}", self.parent_elements.iter().join(" "))?;
        writeln!(f, "child elements: {}", self.child_elements.iter().join(" "))?;
        writeln!(f, "crack-tip elements: {}", self.crack_tip.iter().join(" "))?;
        writeln!(f, "elements:")?;
        for elem in self.elements.values() {
            write_element(f, &self.nodes, elem)?;
        }
        Ok(())
    }
}
