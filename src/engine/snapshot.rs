//! Element snapshots that survive a full mesh rebuild.
//!
//! A host that re-ingests its mesh every step loses the fragments of
//! elements no cut touched this step. A snapshot keeps them with every node
//! renamed to its position in the element, so it can be laid back onto the
//! re-ingested element whatever global ids that element now uses.

use crate::topology::element::{Element, ElementId};
use crate::topology::element_kind::ElementKind;
use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};

/// Self-contained copy of one element over local-index nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    element: Element,
}

impl ElementSnapshot {
    pub fn capture(element: &Element) -> Self {
        Self {
            element: element.to_local(),
        }
    }

    /// Id of the element the snapshot was taken from.
    pub fn id(&self) -> ElementId {
        self.element.id()
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn num_fragments(&self) -> usize {
        self.element.num_fragments()
    }

    /// The localized element itself.
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Lay the snapshot onto `target`, which must not have fragments,
    /// interior nodes or cuts of its own.
    pub fn restore_into(&self, target: &mut Element) -> Result<(), TopologyError> {
        target.restore_from(&self.element)
    }
}
