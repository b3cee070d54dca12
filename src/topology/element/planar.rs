//! 2D element body: edges, edge neighbors and loop fragments.

use super::{Body, BoundaryTopology, CutPlane, Element, ElementId};
use crate::topology::TOL;
use crate::topology::edge::Edge;
use crate::topology::element_kind::ElementKind;
use crate::topology::fragment::Fragment2D;
use crate::topology::interior::FaceNode;
use crate::topology::node::{NodeCategory, NodeKey, NodeRegistry};
use crate::topology::parametric::{
    Point3, edge_to_face_coords, normalize, scale, add, shape_functions_2d, sub,
};
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarBody {
    edges: Vec<Edge>,
    /// Up to two neighbors per edge.
    edge_neighbors: Vec<Vec<ElementId>>,
    fragments: Vec<Fragment2D>,
    interior_nodes: Vec<FaceNode>,
}

impl PlanarBody {
    /// Edges `(n[i], n[i + 1])`, with mid-side node `n[ne + i]` for
    /// quadratic kinds.
    pub(crate) fn new(kind: ElementKind, nodes: &[NodeKey]) -> Self {
        let ne = kind.num_boundaries();
        let edges = (0..ne)
            .map(|i| {
                let mut e = Edge::new(nodes[i], nodes[(i + 1) % ne]);
                if kind.has_edge_interior_nodes() {
                    e.set_interior_node(Some(nodes[ne + i]));
                }
                e
            })
            .collect();
        Self {
            edges,
            edge_neighbors: vec![Vec::new(); ne],
            fragments: Vec::new(),
            interior_nodes: Vec::new(),
        }
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, i: usize) -> &Edge {
        &self.edges[i]
    }

    pub fn edge_neighbors(&self, i: usize) -> &[ElementId] {
        &self.edge_neighbors[i]
    }

    pub fn fragments(&self) -> &[Fragment2D] {
        &self.fragments
    }

    pub fn interior_nodes(&self) -> &[FaceNode] {
        &self.interior_nodes
    }

    /// First fragment edge lying on element edge `edge` (single fragment only).
    pub fn fragment_edge_on(&self, edge: usize) -> Option<usize> {
        if self.fragments.len() != 1 {
            return None;
        }
        self.fragments[0]
            .edges()
            .iter()
            .position(|fe| self.edges[edge].contains_edge(fe))
    }

    /// Element edge `edge` is cut and holds two pieces of the fragment.
    pub fn edge_contains_tip(&self, edge: usize) -> bool {
        self.fragments.len() == 1
            && self.edges[edge].has_intersection()
            && self.fragments[0]
                .edges()
                .iter()
                .filter(|fe| self.edges[edge].contains_edge(fe))
                .count()
                == 2
    }

    /// The fragment piece on `edge` already carries a cut.
    pub fn fragment_edge_already_cut(&self, edge: usize) -> bool {
        if self.edge_contains_tip(edge) {
            return true;
        }
        self.fragment_edge_on(edge)
            .is_some_and(|fe| self.fragments[0].edge(fe).has_intersection())
    }

    /// Parametric coordinates of a node on one of the element edges.
    pub fn edge_parametric_coords(&self, node: NodeKey) -> Option<[f64; 2]> {
        let (i, edge) = self
            .edges
            .iter()
            .enumerate()
            .find(|(_, e)| e.contains_node(node))?;
        let d = edge.distance_from_node0(node).ok()?;
        edge_to_face_coords(self.edges.len(), i, d)
    }

    pub(crate) fn interior_masters(
        &self,
        vertices: &[NodeKey],
        node: NodeKey,
    ) -> Result<Vec<(NodeKey, f64)>, TopologyError> {
        let fnode = self
            .interior_nodes
            .iter()
            .find(|f| f.node() == node)
            .ok_or(TopologyError::NodeNotFound { node })?;
        let weights = shape_functions_2d(self.edges.len(), fnode.xi())
            .ok_or(TopologyError::NodeNotFound { node })?;
        Ok(vertices.iter().copied().zip(weights).collect())
    }

    /// Lines through the interior edges of fragment `ichild`.
    pub(crate) fn cut_plane(&self, elem: &Element, ichild: usize) -> Result<CutPlane, TopologyError> {
        let frag = &self.fragments[ichild];
        let mut points = Vec::new();
        for j in 0..frag.num_edges() {
            if frag.is_edge_interior(j, &self.edges) {
                for n in frag.edge(j).nodes() {
                    points.push(elem.local_coords(n)?);
                }
            }
        }
        let mut plane = CutPlane::default();
        if points.len() >= 2 {
            (plane.origin, plane.normal) = line_through(points[0], points[1]);
        }
        if points.len() == 4 {
            (plane.origin2, plane.normal2) = line_through(points[2], points[3]);
        }
        Ok(plane)
    }

    /// Take over fragment `ichild`, the cuts and the interior nodes of `from`.
    pub(crate) fn inherit(&mut self, from: &PlanarBody, ichild: usize) -> Result<(), TopologyError> {
        let frag = from
            .fragments
            .get(ichild)
            .cloned()
            .ok_or(TopologyError::InvalidFragment {
                detail: "child index beyond the parent's fragments",
            })?;
        self.fragments = vec![frag];
        for (mine, theirs) in self.edges.iter_mut().zip(&from.edges) {
            if theirs.has_intersection() {
                mine.copy_intersection(theirs, 0)?;
            }
        }
        self.interior_nodes = from.interior_nodes.clone();
        Ok(())
    }

    pub(crate) fn restore_from(&mut self, id: ElementId, from: &PlanarBody) -> Result<(), TopologyError> {
        self.fragments = from.fragments.clone();
        self.interior_nodes = from.interior_nodes.clone();
        for (i, (mine, theirs)) in self.edges.iter_mut().zip(&from.edges).enumerate() {
            if theirs.has_intersection() {
                mine.copy_intersection(theirs, 0)?;
            }
            if mine.num_embedded_nodes() > 2 {
                return Err(TopologyError::TooManyEmbeddedNodes {
                    elem: id,
                    boundary: i,
                    cap: 2,
                });
            }
        }
        Ok(())
    }

    /// A lone cut on an interior edge of the fragment cannot be split on;
    /// drop it together with the interior node it created.
    fn remove_invalid_embedded_nodes(&mut self, id: ElementId) -> Result<Vec<NodeKey>, TopologyError> {
        let Some(frag) = self.fragments.first_mut() else {
            return Ok(Vec::new());
        };
        if frag.num_cuts() != 1 {
            return Ok(Vec::new());
        }
        for i in 0..frag.num_edges() {
            if frag.is_edge_interior(i, &self.edges) && frag.edge(i).has_intersection() {
                if self.interior_nodes.len() != 1 {
                    return Err(TopologyError::FragmentSanity {
                        elem: id,
                        detail: format!(
                            "expected 1 interior node before dropping a lone interior cut, found {}",
                            self.interior_nodes.len()
                        ),
                    });
                }
                let removed = frag.edge(i).embedded_nodes().to_vec();
                frag.edge_mut(i).remove_embedded_nodes();
                self.interior_nodes.clear();
                return Ok(removed);
            }
        }
        Ok(Vec::new())
    }

    /// Three fragments meeting at a new interior node, one per sector
    /// between consecutive cut points.
    fn branching_split(
        &mut self,
        id: ElementId,
        registry: &mut NodeRegistry,
    ) -> Result<Vec<Fragment2D>, TopologyError> {
        let mut three = Vec::with_capacity(3);
        for e in &self.edges {
            let n0 = e.node(0);
            match e.embedded_nodes() {
                [a] => three.push(*a),
                [a, b] => {
                    if e.intersection(0, n0)? < e.intersection(1, n0)? {
                        three.extend([*a, *b]);
                    } else {
                        three.extend([*b, *a]);
                    }
                }
                _ => {}
            }
        }
        if three.len() != 3 {
            return Err(TopologyError::InvalidCut {
                elem: id,
                detail: "a branching split needs exactly three cut points",
            });
        }

        let mut center = [0.0; 2];
        for &n in &three {
            let xi = self
                .edge_parametric_coords(n)
                .ok_or(TopologyError::NodeNotOnBoundary { node: n })?;
            center[0] += xi[0] / 3.0;
            center[1] += xi[1] / 3.0;
        }
        let hub = registry.create(NodeCategory::Embedded, None);
        self.interior_nodes.push(FaceNode::new(hub, center));

        let ne = self.edges.len();
        let mut pieces = Vec::with_capacity(3);
        for i in 0..3 {
            let (from, to) = (three[i], three[(i + 1) % 3]);
            let mut edges = vec![Edge::new(to, hub), Edge::new(hub, from)];
            let start = self
                .edges
                .iter()
                .position(|e| e.contains_node(from))
                .ok_or(TopologyError::NodeNotOnBoundary { node: from })?;
            if self.edges[start].contains_node(to) {
                edges.push(Edge::new(from, to));
            } else {
                edges.push(Edge::new(from, self.edges[start].node(1)));
                let mut closed = false;
                for step in 1..=ne {
                    let e = &self.edges[(start + step) % ne];
                    if e.contains_node(to) {
                        edges.push(Edge::new(e.node(0), to));
                        closed = true;
                        break;
                    }
                    edges.push(Edge::new(e.node(0), e.node(1)));
                }
                if !closed {
                    return Err(TopologyError::OpenBoundaryLoop);
                }
            }
            pieces.push(Fragment2D::from_edges(edges));
        }
        Ok(pieces)
    }

    fn fragment_sanity_check(
        &self,
        id: ElementId,
        old_edges: usize,
        old_cuts: usize,
        registry: &NodeRegistry,
    ) -> Result<(), TopologyError> {
        let mut has_cut_node = false;
        for frag in &self.fragments {
            for e in frag.edges() {
                for n in e.nodes() {
                    match registry.category(n)? {
                        NodeCategory::Permanent | NodeCategory::Embedded => {}
                        NodeCategory::EmbeddedPermanent => has_cut_node = true,
                        other => {
                            return Err(TopologyError::FragmentSanity {
                                elem: id,
                                detail: format!("fragment node {n} has category {other:?}"),
                            });
                        }
                    }
                }
            }
        }
        if has_cut_node {
            return Ok(());
        }
        if self.interior_nodes.len() > 1 {
            return Err(TopologyError::FragmentSanity {
                elem: id,
                detail: format!("{} interior nodes after the split", self.interior_nodes.len()),
            });
        }
        let sizes: Vec<usize> = self.fragments.iter().map(Fragment2D::num_edges).collect();
        let total: usize = sizes.iter().sum();
        let (frags, edges) = match old_cuts {
            0 => (1, old_edges),
            1 => (1, old_edges + 1),
            2 => (2, old_edges + 4),
            _ => (3, old_edges + 9),
        };
        if sizes.len() != frags || total != edges {
            return Err(TopologyError::FragmentSanity {
                elem: id,
                detail: format!(
                    "{old_cuts} cut(s) on {old_edges} edges gave fragment sizes {sizes:?}"
                ),
            });
        }
        Ok(())
    }
}

fn line_through(p0: Point3, p1: Point3) -> (Point3, Point3) {
    let d = sub(p1, p0);
    (scale(add(p0, p1), 0.5), normalize([d[1], -d[0], 0.0]))
}

/// Two 2D elements sharing an edge overlay each other when they run it in
/// the same direction.
pub(crate) fn overlays(a: &Element, b: &Element) -> Result<bool, TopologyError> {
    let n = a.vertices().len();
    if b.vertices().len() != n {
        return Ok(false);
    }
    let common = a.common_vertices(b);
    if common.len() > 2 {
        return Ok(true);
    }
    if common.len() < 2 {
        return Ok(false);
    }
    let ascends = |elem: &Element| -> Result<bool, TopologyError> {
        let v = elem.vertices();
        let i1 = v.iter().position(|&x| x == common[0]);
        let i2 = v.iter().position(|&x| x == common[1]);
        let (Some(i1), Some(i2)) = (i1, i2) else {
            return Err(TopologyError::NodeNotFound { node: common[0] });
        };
        if i2 == (i1 + 1) % n {
            Ok(true)
        } else if i2 == (i1 + n - 1) % n {
            Ok(false)
        } else {
            Err(TopologyError::NonAdjacentCommonNodes {
                elem: a.id(),
                neighbor: b.id(),
            })
        }
    };
    Ok(ascends(a)? == ascends(b)?)
}

impl BoundaryTopology for PlanarBody {
    fn num_boundaries(&self) -> usize {
        self.edges.len()
    }

    fn boundary_vertices(&self, b: usize) -> Vec<NodeKey> {
        self.edges[b].nodes().to_vec()
    }

    fn boundary_neighbors(&self, b: usize) -> &[ElementId] {
        &self.edge_neighbors[b]
    }

    fn push_boundary_neighbor(&mut self, b: usize, neighbor: ElementId) {
        self.edge_neighbors[b].push(neighbor);
    }

    fn clear_neighbors(&mut self) {
        for n in self.edge_neighbors.iter_mut() {
            n.clear();
        }
    }

    fn boundary_has_intersection(&self, b: usize) -> bool {
        self.edges[b].has_intersection()
    }

    fn boundary_embedded_nodes(&self, b: usize) -> Vec<NodeKey> {
        self.edges[b].embedded_nodes().to_vec()
    }

    fn num_fragments(&self) -> usize {
        self.fragments.len()
    }

    fn fragment_contains_node(&self, node: NodeKey) -> bool {
        self.fragments.iter().any(|f| f.contains_node(node))
    }

    fn fragment_node_lists(&self, i: usize) -> Vec<Vec<NodeKey>> {
        vec![self.fragments[i].loop_nodes()]
    }

    fn split_line_nodes(&self) -> Vec<NodeKey> {
        match self.fragments.as_slice() {
            [a, b] => a.common_nodes(b),
            _ => Vec::new(),
        }
    }

    fn boundary_takes_split(&self, b: usize, cut_nodes: &[NodeKey]) -> bool {
        cut_nodes.iter().any(|&n| self.edges[b].is_embedded_node(n))
    }

    fn tip_boundary(&self) -> Option<usize> {
        match self.fragments.as_slice() {
            [frag] => frag.tip_edge(&self.edges),
            _ => None,
        }
    }

    fn is_final_cut(&self) -> bool {
        self.fragments
            .first()
            .is_some_and(|f| f.num_interior_edges(&self.edges) == 2)
    }

    fn num_cuts(&self) -> usize {
        self.edges.iter().map(Edge::num_embedded_nodes).sum()
    }

    fn interior_node_keys(&self) -> Vec<NodeKey> {
        self.interior_nodes.iter().map(FaceNode::node).collect()
    }

    fn boundary_masters(&self, node: NodeKey) -> Option<Vec<(NodeKey, f64)>> {
        self.edges.iter().find_map(|e| e.node_masters(node))
    }

    fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        for e in self.edges.iter_mut() {
            e.switch_node(new, old);
        }
        for f in self.fragments.iter_mut() {
            f.switch_node(new, old);
        }
        for n in self.interior_nodes.iter_mut() {
            n.switch_node(new, old);
        }
    }

    fn remove_embedded_node(&mut self, node: NodeKey) {
        for e in self.edges.iter_mut() {
            e.remove_embedded_node(node);
        }
        for f in self.fragments.iter_mut() {
            f.remove_embedded_node(node);
        }
        self.interior_nodes.retain(|n| n.node() != node);
    }

    fn remove_phantom_embedded_nodes(&mut self) {
        let Some(frag) = self.fragments.first() else {
            return;
        };
        for e in self.edges.iter_mut() {
            let phantom: Vec<NodeKey> = e
                .embedded_nodes()
                .iter()
                .copied()
                .filter(|&n| !frag.contains_node(n))
                .collect();
            for n in phantom {
                e.remove_embedded_node(n);
            }
        }
    }
}

/// Result of recording a cut on one element edge.
pub(crate) struct EdgeCutRecord {
    /// Cut point now (or already) on the edge; `None` when the cut was
    /// dropped before a node existed.
    pub embedded: Option<NodeKey>,
    /// Why the cut was dropped on this element, if it was.
    pub skipped: Option<TopologyError>,
}

impl Element {
    fn planar_parts(&mut self) -> Result<(ElementId, &mut PlanarBody), TopologyError> {
        let id = self.id;
        let dim = self.dimension();
        match &mut self.body {
            Body::Planar(b) => Ok((id, b)),
            Body::Solid(_) => Err(TopologyError::MixedDimension {
                elem: id,
                expected: 2,
                found: dim,
            }),
        }
    }

    /// Record a cut at `position` (from the edge's first node) on edge
    /// `edge` of this element and, when it falls in the real part, on the
    /// fragment edge beneath it.
    pub(crate) fn record_edge_cut(
        &mut self,
        edge: usize,
        position: f64,
        embedded: Option<NodeKey>,
        registry: &mut NodeRegistry,
    ) -> Result<EdgeCutRecord, TopologyError> {
        self.check_boundary(edge)?;
        let (id, body) = self.planar_parts()?;
        let n0 = body.edges[edge].node(0);

        if position > TOL
            && position < 1.0 - TOL
            && body.edges[edge].has_intersection_at_position(position, n0)?
        {
            let old = body.edges[edge]
                .embedded_node_index_at(position, n0)?
                .and_then(|idx| body.edges[edge].embedded_node(idx))
                .ok_or(TopologyError::NodeNotOnBoundary { node: n0 })?;
            if embedded.is_some_and(|e| e != old) {
                return Err(TopologyError::ConflictingEmbeddedNode {
                    elem: id,
                    boundary: edge,
                });
            }
            return Ok(EdgeCutRecord {
                embedded: Some(old),
                skipped: None,
            });
        }

        let mut skipped = None;
        let mut on_fragment = None;
        if let Some(fe) = body.fragment_edge_on(edge) {
            if body.fragment_edge_already_cut(edge) {
                log::warn!("element {id}: fragment edge on edge {edge} is already cut");
                skipped = Some(TopologyError::FragmentAlreadyCut { elem: id, edge });
            } else {
                let frag_edge = body.fragments[0].edge(fe);
                let x0 = body.edges[edge].distance_from_node0(frag_edge.node(0))?;
                let x1 = body.edges[edge].distance_from_node0(frag_edge.node(1))?;
                if (position - x0) * (position - x1) < 0.0 {
                    on_fragment = Some((fe, (position - x0) / (x1 - x0), frag_edge.node(0)));
                } else {
                    skipped = Some(TopologyError::PhantomIntersection { elem: id, edge });
                }
            }
        }
        if skipped.is_some() {
            return Ok(EdgeCutRecord { embedded, skipped });
        }

        // A rejected cut leaves the edge and the registry unchanged.
        if body.edges[edge].num_embedded_nodes() >= 2 {
            return Err(TopologyError::TooManyEmbeddedNodes {
                elem: id,
                boundary: edge,
                cap: 2,
            });
        }
        if on_fragment.is_some_and(|(fe, _, _)| body.fragments[0].edge(fe).has_intersection()) {
            return Err(TopologyError::TooManyEmbeddedNodes {
                elem: id,
                boundary: edge,
                cap: 1,
            });
        }

        let emb = embedded.unwrap_or_else(|| registry.create(NodeCategory::Embedded, None));
        body.edges[edge].add_intersection(position, emb, n0)?;
        if let Some((fe, frag_pos, frag_n0)) = on_fragment {
            body.fragments[0]
                .edge_mut(fe)
                .add_intersection(frag_pos, emb, frag_n0)?;
        }
        Ok(EdgeCutRecord {
            embedded: Some(emb),
            skipped: None,
        })
    }

    /// Cut edge `frag_edge` of the single fragment at `position`; only a
    /// blank interior edge left by an earlier cut can take a new one.
    pub(crate) fn record_fragment_edge_cut(
        &mut self,
        frag_edge: usize,
        position: f64,
        registry: &mut NodeRegistry,
    ) -> Result<(), TopologyError> {
        let (id, body) = self.planar_parts()?;
        if body.fragments.len() != 1 {
            return Err(TopologyError::FragmentCount {
                elem: id,
                expected: 1,
                found: body.fragments.len(),
            });
        }
        let frag = &body.fragments[0];
        if frag_edge >= frag.num_edges() {
            return Err(TopologyError::BoundaryOutOfRange {
                elem: id,
                index: frag_edge,
                count: frag.num_edges(),
            });
        }
        if position.abs() < TOL || (1.0 - position).abs() < TOL {
            return Err(TopologyError::DegenerateFragmentCut {
                elem: id,
                edge: frag_edge,
            });
        }
        let edge = frag.edge(frag_edge);
        let (n0, n1) = (edge.node(0), edge.node(1));
        if edge.has_intersection() {
            if !edge.has_intersection_at_position(position, n0)? {
                return Err(TopologyError::InvalidCut {
                    elem: id,
                    detail: "fragment edge already cut at another position",
                });
            }
            return Ok(());
        }
        if !frag.is_edge_interior(frag_edge, &body.edges)
            || frag.is_secondary_interior_edge(frag_edge, &body.interior_nodes)
        {
            return Err(TopologyError::InvalidCut {
                elem: id,
                detail: "only a primary interior fragment edge can take a new cut",
            });
        }
        let p0 = body
            .edge_parametric_coords(n0)
            .ok_or(TopologyError::NodeNotOnBoundary { node: n0 })?;
        let p1 = body
            .edge_parametric_coords(n1)
            .ok_or(TopologyError::NodeNotOnBoundary { node: n1 })?;

        let emb = registry.create(NodeCategory::Embedded, None);
        body.fragments[0]
            .edge_mut(frag_edge)
            .add_intersection(position, emb, n0)?;
        let xi = [
            (1.0 - position) * p0[0] + position * p1[0],
            (1.0 - position) * p0[1] + position * p1[1],
        ];
        body.interior_nodes.push(FaceNode::new(emb, xi));
        Ok(())
    }

    /// Re-split the single fragment along the cuts recorded this cycle.
    pub(crate) fn update_planar_fragments(
        &mut self,
        in_tip_set: bool,
        registry: &mut NodeRegistry,
    ) -> Result<(), TopologyError> {
        let nv = self.kind.num_vertices();
        let vertices: Vec<NodeKey> = self.nodes[..nv].to_vec();
        let (id, body) = self.planar_parts()?;

        if in_tip_set {
            if body.fragments.len() != 1 {
                return Err(TopologyError::FragmentCount {
                    elem: id,
                    expected: 1,
                    found: body.fragments.len(),
                });
            }
            body.fragments[0].combine_tip_edges(&body.edges)?;
        }
        if body.fragments.len() == 1 {
            for node in body.remove_invalid_embedded_nodes(id)? {
                registry.remove(node)?;
            }
        }
        if body.fragments.is_empty() {
            body.fragments.push(Fragment2D::from_edges(body.edges.clone()));
        }
        if body.fragments.len() != 1 {
            return Err(TopologyError::FragmentCount {
                elem: id,
                expected: 1,
                found: body.fragments.len(),
            });
        }

        let cut_node_set: BTreeSet<NodeKey> = registry.keys(NodeCategory::EmbeddedPermanent).collect();
        let is_cut_node = |n: NodeKey| cut_node_set.contains(&n);
        let frag = &body.fragments[0];
        let cuts = frag.num_cuts();
        let cut_nodes = frag.num_cut_nodes(is_cut_node);
        let old_edges = frag.num_edges();
        if cuts > 3 {
            return Err(TopologyError::TooManyCuts { elem: id, cuts });
        }
        if cuts == 0 && cut_nodes == 0 {
            let partial = vertices.iter().any(|&n| !frag.contains_node(n));
            if !partial {
                body.fragments.clear();
            }
            return Ok(());
        }

        let pieces = if cuts == 3 {
            if vertices.iter().any(|&n| !frag.contains_node(n)) {
                return Err(TopologyError::InvalidCut {
                    elem: id,
                    detail: "branching is only allowed in an uncut element",
                });
            }
            body.branching_split(id, registry)?
        } else {
            frag.split(is_cut_node)?
        };
        body.fragments = pieces;
        body.fragment_sanity_check(id, old_edges, cuts, registry)
    }
}
