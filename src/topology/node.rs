//! Node identities and the node registry.
//!
//! Nodes live in an arena owned by [`NodeRegistry`]; everything else refers
//! to them through a [`NodeKey`]. A node's `parent` is a plain
//! back-reference to the node it was duplicated from and never implies
//! ownership.
//!
//! Element-local scratch nodes ([`NodeCategory::LocalIndex`]) are not stored
//! in the arena at all: [`NodeKey::Local`] carries the node's position in its
//! element's node list, which is its whole identity.

use crate::topology_error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKey {
    /// Slot in the registry arena.
    Global(u32),
    /// Element-local node; the payload is the local index.
    Local(u32),
}

impl NodeKey {
    #[inline]
    pub fn is_local(self) -> bool {
        matches!(self, NodeKey::Local(_))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Global(slot) => write!(f, "@{slot}"),
            NodeKey::Local(idx) => write!(f, "local{idx}"),
        }
    }
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Physical mesh node, visible to the host.
    Permanent,
    /// Scratch node used while building children; never survives a cycle.
    Temp,
    /// Cut point on an edge or face.
    Embedded,
    /// A permanent node a cut passes exactly through.
    EmbeddedPermanent,
    /// Element-local placeholder used in snapshots.
    LocalIndex,
}

impl NodeCategory {
    /// Suffix used by the mesh report.
    pub fn suffix(self) -> &'static str {
        match self {
            NodeCategory::Permanent => " ",
            NodeCategory::Temp => "t",
            NodeCategory::Embedded => "e",
            NodeCategory::EmbeddedPermanent => "ep",
            NodeCategory::LocalIndex => "l",
        }
    }
}

/// A registered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: u32,
    category: NodeCategory,
    parent: Option<NodeKey>,
}

impl Node {
    pub fn id(&self) -> u32 {
        self.id
    }
    pub fn category(&self) -> NodeCategory {
        self.category
    }
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }
}

/// Owner of every global node, indexed per category by id.
///
/// Ids are unique within a category only; a new id is the largest id in use
/// plus one (or 0). A [`NodeKey`] stays valid after its node is removed
/// from its category map, so parents can still be followed. Slots of
/// temporary nodes are the exception: they are recycled once
/// [`clear_temp`](Self::clear_temp) ends the cycle that created them.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    arena: Vec<Node>,
    permanent: BTreeMap<u32, NodeKey>,
    temp: BTreeMap<u32, NodeKey>,
    embedded: BTreeMap<u32, NodeKey>,
    embedded_permanent: BTreeMap<u32, NodeKey>,
    /// Slots handed out to temporary nodes since the last `clear_temp`.
    temp_slots: Vec<u32>,
    free_slots: Vec<u32>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, category: NodeCategory) -> Option<&BTreeMap<u32, NodeKey>> {
        match category {
            NodeCategory::Permanent => Some(&self.permanent),
            NodeCategory::Temp => Some(&self.temp),
            NodeCategory::Embedded => Some(&self.embedded),
            NodeCategory::EmbeddedPermanent => Some(&self.embedded_permanent),
            NodeCategory::LocalIndex => None,
        }
    }

    fn map_mut(&mut self, category: NodeCategory) -> Option<&mut BTreeMap<u32, NodeKey>> {
        match category {
            NodeCategory::Permanent => Some(&mut self.permanent),
            NodeCategory::Temp => Some(&mut self.temp),
            NodeCategory::Embedded => Some(&mut self.embedded),
            NodeCategory::EmbeddedPermanent => Some(&mut self.embedded_permanent),
            NodeCategory::LocalIndex => None,
        }
    }

    /// Look up a global node.
    pub fn node(&self, key: NodeKey) -> Result<&Node, TopologyError> {
        match key {
            NodeKey::Global(slot) => self
                .arena
                .get(slot as usize)
                .ok_or(TopologyError::NodeNotFound { node: key }),
            NodeKey::Local(_) => Err(TopologyError::NodeNotFound { node: key }),
        }
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node, TopologyError> {
        match key {
            NodeKey::Global(slot) => self
                .arena
                .get_mut(slot as usize)
                .ok_or(TopologyError::NodeNotFound { node: key }),
            NodeKey::Local(_) => Err(TopologyError::NodeNotFound { node: key }),
        }
    }

    /// Category of `key`; local keys are always [`NodeCategory::LocalIndex`].
    pub fn category(&self, key: NodeKey) -> Result<NodeCategory, TopologyError> {
        match key {
            NodeKey::Local(_) => Ok(NodeCategory::LocalIndex),
            NodeKey::Global(_) => self.node(key).map(Node::category),
        }
    }

    /// Category-local id of `key`.
    pub fn id(&self, key: NodeKey) -> Result<u32, TopologyError> {
        match key {
            NodeKey::Local(idx) => Ok(idx),
            NodeKey::Global(_) => self.node(key).map(Node::id),
        }
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.node(key).ok().and_then(|n| n.parent)
    }

    pub fn set_parent(&mut self, key: NodeKey, parent: NodeKey) -> Result<(), TopologyError> {
        self.node_mut(key)?.parent = Some(parent);
        Ok(())
    }

    pub fn clear_parent(&mut self, key: NodeKey) -> Result<(), TopologyError> {
        self.node_mut(key)?.parent = None;
        Ok(())
    }

    /// `id` and category suffix, e.g. `"12e"`.
    pub fn id_cat_string(&self, key: NodeKey) -> Result<String, TopologyError> {
        Ok(format!("{}{}", self.id(key)?, self.category(key)?.suffix()))
    }

    /// Next free id in `category`.
    pub fn new_id(&self, category: NodeCategory) -> u32 {
        self.map(category)
            .and_then(|m| m.keys().next_back())
            .map_or(0, |last| last + 1)
    }

    /// Allocate a node with the next free id in `category`.
    pub fn create(&mut self, category: NodeCategory, parent: Option<NodeKey>) -> NodeKey {
        let id = self.new_id(category);
        self.insert(id, category, parent)
    }

    fn insert(&mut self, id: u32, category: NodeCategory, parent: Option<NodeKey>) -> NodeKey {
        let node = Node {
            id,
            category,
            parent,
        };
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.arena[slot as usize] = node;
                slot
            }
            None => {
                self.arena.push(node);
                (self.arena.len() - 1) as u32
            }
        };
        if category == NodeCategory::Temp {
            self.temp_slots.push(slot);
        }
        let key = NodeKey::Global(slot);
        if let Some(map) = self.map_mut(category) {
            map.insert(id, key);
        }
        key
    }

    /// Permanent node with `id`, created on first use.
    pub fn permanent_or_insert(&mut self, id: u32) -> NodeKey {
        match self.permanent.get(&id) {
            Some(&key) => key,
            None => self.insert(id, NodeCategory::Permanent, None),
        }
    }

    pub fn lookup(&self, category: NodeCategory, id: u32) -> Option<NodeKey> {
        self.map(category).and_then(|m| m.get(&id).copied())
    }

    /// Remove `key` from its category map. The arena slot stays valid.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), TopologyError> {
        let node = *self.node(key)?;
        if let Some(map) = self.map_mut(node.category) {
            if map.get(&node.id) == Some(&key) {
                map.remove(&node.id);
            }
        }
        Ok(())
    }

    /// `true` when `key` is currently registered in its category map.
    pub fn is_live(&self, key: NodeKey) -> bool {
        match self.node(key) {
            Ok(node) => self
                .map(node.category)
                .is_some_and(|m| m.get(&node.id) == Some(&key)),
            Err(_) => false,
        }
    }

    /// Turn a permanent node into an embedded-permanent one.
    pub fn promote_to_embedded_permanent(&mut self, key: NodeKey) -> Result<(), TopologyError> {
        let node = *self.node(key)?;
        if node.category != NodeCategory::Permanent {
            return Ok(());
        }
        self.permanent.remove(&node.id);
        self.embedded_permanent.insert(node.id, key);
        self.node_mut(key)?.category = NodeCategory::EmbeddedPermanent;
        Ok(())
    }

    /// Keys in `category`, ascending by id.
    pub fn keys(&self, category: NodeCategory) -> impl Iterator<Item = NodeKey> + '_ {
        self.map(category)
            .into_iter()
            .flat_map(|m| m.values().copied())
    }

    /// Ids in `category`, ascending.
    pub fn ids(&self, category: NodeCategory) -> Vec<u32> {
        self.map(category)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    /// `(id, key)` pairs in `category`, ascending by id.
    pub fn entries(&self, category: NodeCategory) -> impl Iterator<Item = (u32, NodeKey)> + '_ {
        self.map(category)
            .into_iter()
            .flat_map(|m| m.iter().map(|(&id, &key)| (id, key)))
    }

    pub fn count(&self, category: NodeCategory) -> usize {
        self.map(category).map_or(0, BTreeMap::len)
    }

    /// Number of arena slots in use or waiting for reuse.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Drop permanent and temporary nodes, keep embedded ones.
    pub fn reset(&mut self) {
        self.permanent.clear();
        self.clear_temp();
    }

    /// Drop every temporary node and make its slot available again. No
    /// element may still refer to a temporary node at this point.
    pub fn clear_temp(&mut self) {
        self.temp.clear();
        self.free_slots.append(&mut self.temp_slots);
    }
}
