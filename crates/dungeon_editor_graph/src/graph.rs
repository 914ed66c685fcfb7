// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room graph: node arena, id index, and link orchestration.
//!
//! Nodes live in generational slots. Adjacency is stored twice, as a child
//! list on the parent and a parent list on the child, and every mutation
//! here keeps both sides in step.

use crate::connection::{Link, LinkError, LinkRule};
use crate::node::{Bounds, RoomNode, RoomNodeId};
use crate::room_type::{RoomType, RoomTypeId, RoomTypeRegistry};
use crate::settings::GraphSettings;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<RoomNode>,
}

fn resolve(slots: &[Slot], id: RoomNodeId) -> Option<&RoomNode> {
    slots
        .get(id.index as usize)
        .filter(|slot| slot.generation == id.generation)
        .and_then(|slot| slot.node.as_ref())
}

/// The subset of a room type the connectivity rules look at
#[derive(Debug, Clone, Copy)]
struct Kind {
    is_none: bool,
    is_corridor: bool,
    is_entrance: bool,
    is_boss_room: bool,
}

impl Kind {
    /// Types missing from the registry behave as unassigned
    const UNASSIGNED: Self = Self {
        is_none: true,
        is_corridor: false,
        is_entrance: false,
        is_boss_room: false,
    };

    fn of(room_type: &RoomType) -> Self {
        Self {
            is_none: room_type.is_none,
            is_corridor: room_type.is_corridor,
            is_entrance: room_type.is_entrance,
            is_boss_room: room_type.is_boss_room,
        }
    }
}

/// A directed graph of typed rooms
#[derive(Debug, Clone)]
pub struct RoomGraph {
    registry: Arc<RoomTypeRegistry>,
    settings: GraphSettings,
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live nodes in creation order
    order: Vec<RoomNodeId>,
    /// Persistent id → handle; key set always equals the ids in `order`
    index: IndexMap<Uuid, RoomNodeId>,
}

impl RoomGraph {
    /// Create a new empty graph
    pub fn new(registry: Arc<RoomTypeRegistry>, settings: GraphSettings) -> Self {
        Self {
            registry,
            settings,
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            index: IndexMap::new(),
        }
    }

    /// Room types this graph references
    pub fn registry(&self) -> &Arc<RoomTypeRegistry> {
        &self.registry
    }

    /// Current settings
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Replace the settings. Existing links are kept; see [`Self::audit`].
    pub fn set_settings(&mut self, settings: GraphSettings) {
        self.settings = settings;
    }

    fn alloc(&mut self, uuid: Uuid, bounds: Bounds, room_type: RoomTypeId) -> RoomNodeId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let id = RoomNodeId::new(index, slot.generation);
            slot.node = Some(RoomNode::new(id, uuid, bounds, room_type));
            id
        } else {
            let id = RoomNodeId::new(self.slots.len() as u32, 0);
            self.slots.push(Slot {
                generation: 0,
                node: Some(RoomNode::new(id, uuid, bounds, room_type)),
            });
            id
        };
        self.order.push(id);
        id
    }

    /// Add a node with a fresh identity.
    ///
    /// Returns `None` if `room_type` is not in this graph's registry.
    pub fn create_node(&mut self, bounds: Bounds, room_type: RoomTypeId) -> Option<RoomNodeId> {
        if self.registry.get(room_type).is_none() {
            tracing::warn!(
                "Room type {:?} is not in registry '{}'",
                room_type,
                self.registry.name()
            );
            return None;
        }
        let uuid = Uuid::new_v4();
        let id = self.alloc(uuid, bounds, room_type);
        self.index.insert(uuid, id);
        tracing::debug!("Created room node {id:?} ({uuid})");
        Some(id)
    }

    /// Append a node from persisted state without touching the index.
    ///
    /// Callers must run [`Self::rebuild_index`] before the next query.
    pub(crate) fn insert_loaded(
        &mut self,
        uuid: Uuid,
        bounds: Bounds,
        room_type: RoomTypeId,
    ) -> RoomNodeId {
        self.alloc(uuid, bounds, room_type)
    }

    /// Overwrite a node's adjacency lists from persisted state
    pub(crate) fn set_adjacency(
        &mut self,
        id: RoomNodeId,
        parents: Vec<RoomNodeId>,
        children: Vec<RoomNodeId>,
    ) {
        if let Some(node) = self.get_node_mut(id) {
            node.parents = parents;
            node.children = children;
        }
    }

    /// Get a node by ID; stale handles resolve to `None`
    pub fn get_node(&self, id: RoomNodeId) -> Option<&RoomNode> {
        resolve(&self.slots, id)
    }

    /// Get a mutable node by ID
    pub fn get_node_mut(&mut self, id: RoomNodeId) -> Option<&mut RoomNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Check if a handle refers to a live node
    pub fn contains(&self, id: RoomNodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Look up a node by its persistent identity
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<RoomNodeId> {
        self.index.get(&uuid).copied()
    }

    /// Room type of a node
    pub fn room_type_of(&self, id: RoomNodeId) -> Option<&RoomType> {
        self.get_node(id)
            .and_then(|node| self.registry.get(node.room_type))
    }

    /// Display name of a node's room type
    pub fn type_name(&self, id: RoomNodeId) -> Option<&str> {
        self.room_type_of(id).map(|t| t.name.as_str())
    }

    fn kind(&self, node: &RoomNode) -> Kind {
        self.registry
            .get(node.room_type)
            .map_or(Kind::UNASSIGNED, Kind::of)
    }

    /// Run the connectivity rules for `parent → candidate`.
    ///
    /// With `existing` set the link is assumed to be present already and
    /// is excluded from the duplicate and fan-out checks; the corridor cap
    /// then only counts children listed before it.
    fn evaluate(
        &self,
        parent: &RoomNode,
        candidate: &RoomNode,
        existing: bool,
    ) -> Result<(), LinkRule> {
        let parent_kind = self.kind(parent);
        let child_kind = self.kind(candidate);

        if parent_kind.is_none {
            return Err(LinkRule::ParentUnassigned);
        }
        if child_kind.is_none {
            return Err(LinkRule::ChildUnassigned);
        }
        if !existing && parent.has_child(candidate.id) {
            return Err(LinkRule::Duplicate);
        }
        if candidate.id == parent.id {
            return Err(LinkRule::SelfLoop);
        }
        if parent.has_parent(candidate.id) {
            return Err(LinkRule::ReverseLink);
        }

        let other_children = parent
            .children
            .iter()
            .filter(|c| **c != candidate.id)
            .count();
        // An existing link is judged against the children added before it
        let earlier_children = parent
            .children
            .iter()
            .position(|c| *c == candidate.id)
            .unwrap_or(other_children);

        if child_kind.is_corridor && earlier_children >= self.settings.max_child_corridors {
            return Err(LinkRule::CorridorCapReached);
        }
        if child_kind.is_entrance {
            return Err(LinkRule::EntranceAsChild);
        }
        if parent_kind.is_corridor && other_children >= 1 {
            return Err(LinkRule::CorridorAlreadyLinked);
        }
        if self.settings.enforce_corridor_alternation
            && parent_kind.is_corridor == child_kind.is_corridor
        {
            return Err(LinkRule::NotAlternating);
        }

        Ok(())
    }

    /// Check whether `candidate` may become a child of `parent`
    pub fn check_child(&self, parent: RoomNodeId, candidate: RoomNodeId) -> Result<(), LinkError> {
        let parent_node = self
            .get_node(parent)
            .ok_or(LinkError::NodeNotFound(parent))?;
        let candidate_node = self
            .get_node(candidate)
            .ok_or(LinkError::NodeNotFound(candidate))?;
        self.evaluate(parent_node, candidate_node, false)
            .map_err(LinkError::Rejected)
    }

    /// Pure predicate form of [`Self::check_child`]
    pub fn can_add_child(&self, parent: RoomNodeId, candidate: RoomNodeId) -> bool {
        self.check_child(parent, candidate).is_ok()
    }

    /// Append `candidate` to the parent's child list if the rules allow it
    fn add_child(&mut self, parent: RoomNodeId, candidate: RoomNodeId) -> Result<(), LinkError> {
        self.check_child(parent, candidate)?;
        if let Some(node) = self.get_node_mut(parent) {
            node.push_child(candidate);
        }
        Ok(())
    }

    fn add_parent(&mut self, child: RoomNodeId, parent: RoomNodeId) -> bool {
        self.get_node_mut(child)
            .is_some_and(|node| node.add_parent(parent))
    }

    /// Link `parent → child`, reporting why a link was refused
    pub fn try_link(&mut self, parent: RoomNodeId, child: RoomNodeId) -> Result<(), LinkError> {
        self.add_child(parent, child)?;
        self.add_parent(child, parent);
        tracing::debug!("Linked {parent:?} -> {child:?}");
        Ok(())
    }

    /// Link `parent → child`; `false` leaves the graph untouched
    pub fn link(&mut self, parent: RoomNodeId, child: RoomNodeId) -> bool {
        match self.try_link(parent, child) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Link {parent:?} -> {child:?} refused: {e}");
                false
            }
        }
    }

    /// Remove `parent → child` from both sides; returns whether anything changed
    pub fn unlink(&mut self, parent: RoomNodeId, child: RoomNodeId) -> bool {
        let removed_child = self
            .get_node_mut(parent)
            .is_some_and(|node| node.remove_child(child));
        let removed_parent = self
            .get_node_mut(child)
            .is_some_and(|node| node.remove_parent(parent));
        removed_child || removed_parent
    }

    /// Remove a node and every link touching it.
    ///
    /// The returned node is detached: its adjacency lists are empty.
    pub fn delete_node(&mut self, id: RoomNodeId) -> Option<RoomNode> {
        if !self.contains(id) {
            return None;
        }
        let touching: Vec<Link> = self.links().filter(|l| l.involves_node(id)).collect();
        for link in touching {
            self.unlink(link.parent, link.child);
        }

        let slot = &mut self.slots[id.index as usize];
        let mut node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|n| *n != id);
        self.index.shift_remove(&node.uuid);

        node.parents.clear();
        node.children.clear();
        tracing::debug!("Deleted room node {id:?}");
        Some(node)
    }

    /// Unlink every link whose parent and child are both selected.
    ///
    /// Returns the number of links removed.
    pub fn delete_links_among_selected(&mut self) -> usize {
        let selected: HashSet<RoomNodeId> = self.selected_ids().collect();
        let doomed: Vec<Link> = self
            .links()
            .filter(|l| selected.contains(&l.parent) && selected.contains(&l.child))
            .collect();
        for link in &doomed {
            self.unlink(link.parent, link.child);
        }
        doomed.len()
    }

    /// Change a node's room type.
    ///
    /// Children are severed when the corridor or boss-room classification
    /// changes, or when the node becomes unassigned. Parent links the new
    /// type makes illegal are severed afterwards. Types outside the registry
    /// are refused.
    pub fn retype(&mut self, id: RoomNodeId, new_type: RoomTypeId) -> bool {
        let Some(node) = self.get_node(id) else {
            return false;
        };
        let Some(new) = self.registry.get(new_type).map(Kind::of) else {
            tracing::warn!("Refusing to retype {id:?} to unknown room type {new_type:?}");
            return false;
        };
        if node.room_type == new_type {
            return true;
        }

        let old = self.kind(node);
        if old.is_corridor != new.is_corridor || old.is_boss_room != new.is_boss_room || new.is_none
        {
            let children = node.children.clone();
            for child in children {
                self.unlink(id, child);
            }
        }

        if let Some(node) = self.get_node_mut(id) {
            node.room_type = new_type;
        }

        let parents = self.parents_of(id).to_vec();
        for parent in parents {
            let rejected = match (self.get_node(parent), self.get_node(id)) {
                (Some(p), Some(n)) => self.evaluate(p, n, true).err(),
                _ => None,
            };
            if let Some(rule) = rejected {
                tracing::debug!("Retype of {id:?} severed link from {parent:?}: {rule}");
                self.unlink(parent, id);
            }
        }
        true
    }

    /// Repopulate the id index from the node sequence
    pub fn rebuild_index(&mut self) {
        let Self {
            slots,
            order,
            index,
            ..
        } = self;
        index.clear();
        for id in order.iter() {
            if let Some(node) = resolve(slots, *id) {
                index.insert(node.uuid, *id);
            }
        }
    }

    /// Handles currently held by the id index, in index order
    pub fn indexed_ids(&self) -> impl Iterator<Item = RoomNodeId> + '_ {
        self.index.values().copied()
    }

    /// Set a node's selected flag
    pub fn set_selected(&mut self, id: RoomNodeId, selected: bool) -> bool {
        match self.get_node_mut(id) {
            Some(node) => {
                node.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Select every node
    pub fn select_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(node) = slot.node.as_mut() {
                node.selected = true;
            }
        }
    }

    /// Deselect every node
    pub fn clear_selection(&mut self) {
        for slot in &mut self.slots {
            if let Some(node) = slot.node.as_mut() {
                node.selected = false;
            }
        }
    }

    /// Selected node IDs in sequence order
    pub fn selected_ids(&self) -> impl Iterator<Item = RoomNodeId> + '_ {
        self.nodes().filter(|n| n.selected).map(|n| n.id)
    }

    /// Set a node's dragging flag
    pub fn set_dragging(&mut self, id: RoomNodeId, dragging: bool) -> bool {
        match self.get_node_mut(id) {
            Some(node) => {
                node.dragging = dragging;
                true
            }
            None => false,
        }
    }

    /// Move a node by `delta`
    pub fn move_node(&mut self, id: RoomNodeId, delta: [f32; 2]) -> bool {
        match self.get_node_mut(id) {
            Some(node) => {
                node.bounds.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Move every selected node by `delta`; returns how many moved
    pub fn move_selected(&mut self, delta: [f32; 2]) -> usize {
        let mut moved = 0;
        for slot in &mut self.slots {
            if let Some(node) = slot.node.as_mut().filter(|n| n.selected) {
                node.bounds.translate(delta);
                moved += 1;
            }
        }
        moved
    }

    /// Topmost node under `point` (the most recently created wins)
    pub fn node_at(&self, point: [f32; 2]) -> Option<RoomNodeId> {
        self.order
            .iter()
            .rev()
            .find(|id| {
                self.get_node(**id)
                    .is_some_and(|node| node.bounds.contains(point))
            })
            .copied()
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &RoomNode> {
        self.order.iter().filter_map(|id| self.get_node(*id))
    }

    /// All node IDs in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = RoomNodeId> + '_ {
        self.order.iter().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All links, grouped by parent in creation order
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.nodes()
            .flat_map(|node| node.children.iter().map(move |child| Link::new(node.id, *child)))
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.nodes().map(|n| n.children.len()).sum()
    }

    /// Children of a node; empty if the node does not exist
    pub fn children_of(&self, id: RoomNodeId) -> &[RoomNodeId] {
        self.get_node(id).map(RoomNode::children).unwrap_or_default()
    }

    /// Parents of a node; empty if the node does not exist
    pub fn parents_of(&self, id: RoomNodeId) -> &[RoomNodeId] {
        self.get_node(id).map(RoomNode::parents).unwrap_or_default()
    }

    /// First entrance node, if any
    pub fn entrance(&self) -> Option<RoomNodeId> {
        self.nodes()
            .find(|node| self.kind(node).is_entrance)
            .map(|node| node.id)
    }

    /// Check if a node is an entrance
    pub fn is_entrance(&self, id: RoomNodeId) -> bool {
        self.get_node(id).is_some_and(|node| self.kind(node).is_entrance)
    }

    /// Re-run the connectivity rules over every existing link.
    ///
    /// Graphs built through [`Self::link`] never report anything; loaded
    /// graphs or graphs whose settings changed may.
    pub fn audit(&self) -> Vec<(Link, LinkRule)> {
        let mut violations = Vec::new();
        for link in self.links() {
            if let (Some(parent), Some(child)) = (self.get_node(link.parent), self.get_node(link.child)) {
                if let Err(rule) = self.evaluate(parent, child, true) {
                    violations.push((link, rule));
                }
            }
        }
        violations
    }
}

impl Default for RoomGraph {
    fn default() -> Self {
        Self::new(Arc::new(RoomTypeRegistry::standard()), GraphSettings::default())
    }
}
