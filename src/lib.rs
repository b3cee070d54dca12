#![cfg_attr(docsrs, feature(doc_cfg))]
//! # fragment-sieve
//!
//! fragment-sieve is the topology-mutation engine of a phantom-node
//! (extended finite element) fracture code. Given a mesh and the places
//! where a crack crosses element edges or faces, it splits every cut
//! element into fragments, duplicates the elements that must carry a
//! discontinuity, and reconnects the duplicates with their neighbors so the
//! host can rebuild its finite element mesh.
//!
//! ## Features
//! - Quadrilateral and triangular 2D elements, hexahedral and tetrahedral
//!   3D elements, linear and quadratic
//! - Cut recording with automatic propagation to neighboring elements
//! - Fragment splitting (straight cuts, crack tips, branching cuts in 2D)
//! - Crack-tip tracking across cycles
//! - Child creation with phantom-node duplication and reconnection
//! - Serializable element snapshots to carry fragments across mesh rebuilds
//! - Invariant checks in debug builds or with the `strict-invariants` /
//!   `check-invariants` features
//!
//! ## Usage
//! ```rust
//! use fragment_sieve::prelude::*;
//!
//! let mut driver = TopologyDriver::new();
//! let ids = driver.add_2d_elements([[0, 1, 2, 3], [1, 4, 5, 2]])?;
//! driver.update_edge_neighbors()?;
//! driver.init_crack_tip_topology()?;
//! // a crack entering element 1 through edge 1 and leaving through edge 3
//! driver.mark_edge_cut(ids[1], 1, 0.5)?;
//! driver.mark_edge_cut(ids[1], 3, 0.5)?;
//! driver.run_topology_update(TopologyUpdateOptions::default())?;
//! assert_eq!(driver.parent_elements(), &[ids[0], ids[1]]);
//! # Ok::<(), TopologyError>(())
//! ```
//!
//! ## Determinism
//!
//! Elements and nodes live in ordered maps, so every pass visits them in
//! ascending id order and the same input always yields the same ids.
//!
//! ## Errors
//!
//! Every fallible operation returns [`TopologyError`](topology_error::TopologyError).
//! Cut recording at the [`TopologyDriver`](engine::TopologyDriver) reports
//! recoverable conditions as [`CutOutcome::Skipped`](topology_error::CutOutcome)
//! instead of failing.

pub mod debug_invariants;
pub mod engine;
pub mod topology;
pub mod topology_error;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::engine::{
        ElementSnapshot, MeshState, TopologyDriver, TopologySession, TopologyUpdateOptions,
    };
    pub use crate::topology::{
        Body, BoundaryTopology, Edge, Element, ElementId, ElementKind, Face, Fragment2D,
        Fragment3D, NodeCategory, NodeKey, NodeRegistry, TOL,
    };
    pub use crate::topology_error::{CutOutcome, ErrorClass, TopologyError};
}
