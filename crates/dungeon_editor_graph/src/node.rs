// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node definitions for the dungeon graph.

use crate::room_type::RoomTypeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default node width in the editor
pub const NODE_WIDTH: f32 = 160.0;
/// Default node height in the editor
pub const NODE_HEIGHT: f32 = 75.0;

/// Handle to a node slot in a [`RoomGraph`](crate::RoomGraph).
///
/// The generation changes every time a slot is freed, so a handle to a
/// deleted node never resolves to the node that later reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomNodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl RoomNodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at the time the node was created
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Node rectangle in graph space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Bounds {
    /// Create bounds from a position and size
    pub fn new(position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            x: position[0],
            y: position[1],
            width: size[0],
            height: size[1],
        }
    }

    /// Bounds of the default node size at `position`
    pub fn at(position: [f32; 2]) -> Self {
        Self::new(position, [NODE_WIDTH, NODE_HEIGHT])
    }

    /// Top-left corner
    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Center point, where connection lines attach
    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width * 0.5, self.y + self.height * 0.5]
    }

    /// Whether `point` lies inside (edges inclusive)
    pub fn contains(&self, point: [f32; 2]) -> bool {
        point[0] >= self.x
            && point[0] <= self.x + self.width
            && point[1] >= self.y
            && point[1] <= self.y + self.height
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: [f32; 2]) {
        self.x += delta[0];
        self.y += delta[1];
    }
}

/// A room node in the graph
#[derive(Debug, Clone)]
pub struct RoomNode {
    pub(crate) id: RoomNodeId,
    pub(crate) uuid: Uuid,
    pub(crate) room_type: RoomTypeId,
    pub(crate) parents: Vec<RoomNodeId>,
    pub(crate) children: Vec<RoomNodeId>,
    /// Rectangle in the graph UI
    pub bounds: Bounds,
    /// Selected in the editor
    pub selected: bool,
    /// Being dragged in the editor
    pub dragging: bool,
}

impl RoomNode {
    pub(crate) fn new(id: RoomNodeId, uuid: Uuid, bounds: Bounds, room_type: RoomTypeId) -> Self {
        Self {
            id,
            uuid,
            room_type,
            parents: Vec::new(),
            children: Vec::new(),
            bounds,
            selected: false,
            dragging: false,
        }
    }

    /// Arena handle
    pub fn id(&self) -> RoomNodeId {
        self.id
    }

    /// Persistent identity, stable across save and load
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Current room type
    pub fn room_type(&self) -> RoomTypeId {
        self.room_type
    }

    /// Parent node IDs, in link order
    pub fn parents(&self) -> &[RoomNodeId] {
        &self.parents
    }

    /// Child node IDs, in link order
    pub fn children(&self) -> &[RoomNodeId] {
        &self.children
    }

    /// Check if `id` is a child of this node
    pub fn has_child(&self, id: RoomNodeId) -> bool {
        self.children.contains(&id)
    }

    /// Check if `id` is a parent of this node
    pub fn has_parent(&self, id: RoomNodeId) -> bool {
        self.parents.contains(&id)
    }

    /// Record a parent link.
    ///
    /// Legality is decided by the parent's child check; this only keeps the
    /// list free of self references and duplicates.
    pub(crate) fn add_parent(&mut self, parent: RoomNodeId) -> bool {
        if parent != self.id && !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
        true
    }

    /// Append a child that has already passed the connectivity rules
    pub(crate) fn push_child(&mut self, child: RoomNodeId) {
        self.children.push(child);
    }

    /// Remove a child link; returns whether one was present
    pub(crate) fn remove_child(&mut self, child: RoomNodeId) -> bool {
        remove_id(&mut self.children, child)
    }

    /// Remove a parent link; returns whether one was present
    pub(crate) fn remove_parent(&mut self, parent: RoomNodeId) -> bool {
        remove_id(&mut self.parents, parent)
    }
}

fn remove_id(list: &mut Vec<RoomNodeId>, id: RoomNodeId) -> bool {
    match list.iter().position(|x| *x == id) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(index: u32) -> RoomNode {
        RoomNode::new(
            RoomNodeId::new(index, 0),
            Uuid::new_v4(),
            Bounds::at([0.0, 0.0]),
            RoomTypeId(0),
        )
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::at([100.0, 100.0]);
        assert!(bounds.contains([100.0, 100.0]));
        assert!(bounds.contains([260.0, 175.0]));
        assert!(!bounds.contains([261.0, 120.0]));
        assert_eq!(bounds.center(), [180.0, 137.5]);
    }

    #[test]
    fn test_add_parent_ignores_self_and_duplicates() {
        let mut a = node(0);
        let b = RoomNodeId::new(1, 0);

        assert!(a.add_parent(b));
        assert!(a.add_parent(b));
        assert!(a.add_parent(a.id()));
        assert_eq!(a.parents(), &[b]);
    }

    #[test]
    fn test_remove_links() {
        let mut a = node(0);
        let b = RoomNodeId::new(1, 0);
        let c = RoomNodeId::new(2, 0);

        a.push_child(b);
        a.push_child(c);
        assert!(a.remove_child(b));
        assert!(!a.remove_child(b));
        assert_eq!(a.children(), &[c]);

        a.add_parent(b);
        assert!(a.remove_parent(b));
        assert!(!a.remove_parent(b));
    }

    #[test]
    fn test_stale_generation_is_distinct() {
        assert_ne!(RoomNodeId::new(3, 0), RoomNodeId::new(3, 1));
    }
}
