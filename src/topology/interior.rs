//! Nodes placed inside an element (not on its boundary), with the
//! parametric coordinate they were created at.

use crate::topology::node::NodeKey;
use serde::{Deserialize, Serialize};

/// A node at a fixed parametric coordinate `xi` inside its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorNode<C> {
    node: NodeKey,
    xi: C,
}

/// Interior node of a 2D element or of a 3D face.
pub type FaceNode = InteriorNode<[f64; 2]>;
/// Interior node of a 3D element.
pub type VolumeNode = InteriorNode<[f64; 3]>;

impl<C: Copy> InteriorNode<C> {
    pub fn new(node: NodeKey, xi: C) -> Self {
        Self { node, xi }
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn xi(&self) -> C {
        self.xi
    }

    pub fn switch_node(&mut self, new: NodeKey, old: NodeKey) {
        if self.node == old {
            self.node = new;
        }
    }
}
