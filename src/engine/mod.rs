//! Mesh-wide passes of the splitting pipeline.
//!
//! [`MeshState`] owns the node registry, the element arena and the
//! per-cycle bookkeeping. The passes that read or write several elements
//! at once are split by concern:
//! - [`neighbors`]: inverse connectivity, edge/face neighbor discovery and
//!   the symmetry check
//! - [`crack_tip`]: crack-tip classification and the duplication predicates
//! - [`cuts`]: cut recording with propagation to neighbors
//! - [`children`]: child elements and phantom (temporary) nodes
//! - [`connect`]: node merging across neighboring children
//! - [`session`]: one run of the topology update
//!
//! [`TopologyDriver`] is the host-facing entry point.

pub mod children;
pub mod connect;
pub mod crack_tip;
pub mod cuts;
pub mod driver;
pub mod neighbors;
pub mod options;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod state;

pub use driver::TopologyDriver;
pub use options::TopologyUpdateOptions;
pub use session::TopologySession;
pub use snapshot::ElementSnapshot;
pub use state::MeshState;

#[cfg(test)]
mod tests;
