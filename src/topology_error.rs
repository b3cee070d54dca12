//! TopologyError: unified error type for fragment-sieve.
//!
//! Every fallible operation in the crate returns `Result<T, TopologyError>`.
//! Variants are grouped into four [`ErrorClass`]es; only
//! [`ErrorClass::SkippableCondition`] is recoverable, and the
//! [`TopologyDriver`](crate::engine::TopologyDriver) turns those into
//! [`CutOutcome::Skipped`] instead of failing the cycle.

use crate::topology::element::ElementId;
use crate::topology::element_kind::ElementKind;
use crate::topology::node::NodeKey;
use thiserror::Error;

/// Coarse classification of a [`TopologyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The mesh graph violates a structural invariant. Fatal.
    TopologyInconsistency,
    /// An id or index does not refer to anything. Fatal.
    InvalidReference,
    /// Scratch state survived a phase that should have consumed it. Fatal.
    ResidualState,
    /// The cut record is dropped and processing continues.
    SkippableCondition,
}

/// Unified error type for topology mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("element {id} already exists")]
    DuplicateElement { id: ElementId },
    #[error("element {id}: {found} nodes is not a supported {dim}D element")]
    UnsupportedNodeCount { id: ElementId, dim: u8, found: usize },
    #[error("element {elem} is {found}D but the mesh is {expected}D")]
    MixedDimension {
        elem: ElementId,
        expected: u8,
        found: u8,
    },
    #[error("element {elem}: boundary {boundary} already has 2 neighbors")]
    TooManyNeighbors { elem: ElementId, boundary: usize },
    #[error("element {elem} lists {neighbor} as a neighbor but {neighbor} does not list it back")]
    AsymmetricNeighbor {
        elem: ElementId,
        neighbor: ElementId,
    },
    #[error("element {elem} would have more than 2 crack-tip neighbors")]
    TooManyCrackTipNeighbors { elem: ElementId },
    #[error("element {elem}: crack-tip boundary {boundary} has {found} neighbors, expected 1")]
    CrackTipNeighborCount {
        elem: ElementId,
        boundary: usize,
        found: usize,
    },
    #[error("element {elem} is already flagged crack-tip-split")]
    CrackTipSplitAlreadyFlagged { elem: ElementId },
    #[error("element {neighbor} overlays crack-tip element {elem}")]
    NeighborOverlaysTip {
        elem: ElementId,
        neighbor: ElementId,
    },
    #[error("element {elem}: {cuts} cut boundaries is more than supported")]
    TooManyCuts { elem: ElementId, cuts: usize },
    #[error("element {elem}: boundary {boundary} cannot hold more than {cap} embedded node(s)")]
    TooManyEmbeddedNodes {
        elem: ElementId,
        boundary: usize,
        cap: usize,
    },
    #[error("element {elem}: boundary {boundary} already has a different embedded node at this position")]
    ConflictingEmbeddedNode { elem: ElementId, boundary: usize },
    #[error("element {elem}: expected {expected} fragment(s), found {found}")]
    FragmentCount {
        elem: ElementId,
        expected: usize,
        found: usize,
    },
    #[error("element {elem}: fragment sanity check failed: {detail}")]
    FragmentSanity { elem: ElementId, detail: String },
    #[error("elements {elem} and {neighbor} share nodes that are not adjacent")]
    NonAdjacentCommonNodes {
        elem: ElementId,
        neighbor: ElementId,
    },
    #[error("element {elem} and neighbor {neighbor} run their shared edge in the same direction")]
    SameEdgeDirection {
        elem: ElementId,
        neighbor: ElementId,
    },
    #[error("element {elem} already has children")]
    ExistingChildren { elem: ElementId },
    #[error("element {elem}: cannot merge node {node} with {other}")]
    MergeConflict {
        elem: ElementId,
        node: NodeKey,
        other: NodeKey,
    },
    #[error("new node {node} has no parent")]
    OrphanNewNode { node: NodeKey },
    #[error("element {elem}: invalid cut: {detail}")]
    InvalidCut { elem: ElementId, detail: &'static str },
    #[error("element {elem} cannot be restored: {detail}")]
    RestoreConflict { elem: ElementId, detail: &'static str },
    #[error("element {elem}: no master-node interpolation for {kind:?} interior nodes")]
    UnsupportedInterpolation { elem: ElementId, kind: ElementKind },
    #[error("face loop is not closed")]
    OpenBoundaryLoop,
    #[error("invalid fragment: {detail}")]
    InvalidFragment { detail: &'static str },

    #[error("element {id} not found")]
    ElementNotFound { id: ElementId },
    #[error("node {node} not found")]
    NodeNotFound { node: NodeKey },
    #[error("node {node} is not on this boundary")]
    NodeNotOnBoundary { node: NodeKey },
    #[error("element {elem}: boundary {index} out of range ({count} boundaries)")]
    BoundaryOutOfRange {
        elem: ElementId,
        index: usize,
        count: usize,
    },
    #[error("element {elem}: fragment {index} out of range ({count} fragments)")]
    FragmentOutOfRange {
        elem: ElementId,
        index: usize,
        count: usize,
    },

    #[error("{count} temporary node(s) survived the topology update")]
    ResidualTempNodes { count: usize },

    #[error("element {elem}: fragment edge on boundary {edge} is already cut")]
    FragmentAlreadyCut { elem: ElementId, edge: usize },
    #[error("element {elem}: cut on boundary {edge} lies in the phantom region")]
    PhantomIntersection { elem: ElementId, edge: usize },
    #[error("element {elem} is already fully cut")]
    FinalCutReached { elem: ElementId },
    #[error("element {elem}: fragment edge {edge} cut at an endpoint")]
    DegenerateFragmentCut { elem: ElementId, edge: usize },
    #[error("element {elem}: node cuts are only accepted before any fragment exists")]
    NodeCutAfterFragment { elem: ElementId },
}

impl TopologyError {
    /// The [`ErrorClass`] of this error.
    pub fn class(&self) -> ErrorClass {
        use TopologyError::*;
        match self {
            ElementNotFound { .. }
            | NodeNotFound { .. }
            | NodeNotOnBoundary { .. }
            | BoundaryOutOfRange { .. }
            | FragmentOutOfRange { .. } => ErrorClass::InvalidReference,
            ResidualTempNodes { .. } => ErrorClass::ResidualState,
            FragmentAlreadyCut { .. }
            | PhantomIntersection { .. }
            | FinalCutReached { .. }
            | DegenerateFragmentCut { .. }
            | NodeCutAfterFragment { .. } => ErrorClass::SkippableCondition,
            _ => ErrorClass::TopologyInconsistency,
        }
    }

    /// `true` when the cycle may continue after dropping the offending cut.
    pub fn is_skippable(&self) -> bool {
        self.class() == ErrorClass::SkippableCondition
    }
}

/// Result of recording a cut at the driver boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CutOutcome {
    /// The cut was recorded (on the element, its fragment or its neighbors).
    Applied,
    /// The cut was dropped; the error says why.
    Skipped(TopologyError),
}

impl CutOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CutOutcome::Applied)
    }
}

/// Split a skippable error off into [`CutOutcome::Skipped`].
pub(crate) fn absorb_skippable(
    res: Result<(), TopologyError>,
) -> Result<CutOutcome, TopologyError> {
    match res {
        Ok(()) => Ok(CutOutcome::Applied),
        Err(e) if e.is_skippable() => Ok(CutOutcome::Skipped(e)),
        Err(e) => Err(e),
    }
}
