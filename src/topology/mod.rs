//! Top-level module for element topology.
//!
//! This module provides the building blocks of a phantom-node mesh:
//! - Node identities and the [`NodeRegistry`] that owns every node
//! - Boundary [`Edge`]s and [`Face`]s carrying the cut points recorded on them
//! - [`Fragment2D`] / [`Fragment3D`]: the physically real part of a cut element
//! - [`Element`]: a 2D or 3D element with its neighbors, fragments and
//!   parent/child links
//!
//! Most users will drive these types through
//! [`TopologyDriver`](crate::engine::TopologyDriver) rather than directly.

pub mod edge;
pub mod element;
pub mod element_kind;
pub mod face;
pub mod fragment;
pub mod interior;
pub mod node;
pub mod parametric;

pub use edge::Edge;
pub use element::{Body, BoundaryTopology, Element, ElementId};
pub use element_kind::ElementKind;
pub use face::Face;
pub use fragment::{Fragment2D, Fragment3D};
pub use interior::{FaceNode, InteriorNode, VolumeNode};
pub use node::{Node, NodeCategory, NodeKey, NodeRegistry};

/// Tolerance for comparing cut positions and signed distances.
pub const TOL: f64 = 1.0e-4;

#[cfg(test)]
mod tests;
