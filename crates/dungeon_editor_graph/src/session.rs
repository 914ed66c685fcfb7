// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: the layer a graph editor window drives.
//!
//! Editor policy lives here rather than in [`RoomGraph`]:
//! - the first node created in an empty graph is preceded by an entrance
//! - entrances cannot be deleted or retyped, and only one may exist
//!
//! Everything else forwards to the graph.

use crate::graph::RoomGraph;
use crate::node::{Bounds, RoomNodeId};
use crate::room_type::{RoomTypeId, RoomTypeRegistry};
use crate::settings::GraphSettings;
use parking_lot::Mutex;
use std::sync::Arc;

/// Session shared between threads; one lock per graph
pub type SharedSession = Arc<Mutex<EditorSession>>;

/// A link being dragged out of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionDrag {
    /// Node the line starts from
    pub from: RoomNodeId,
    /// Current end of the line (graph space)
    pub current_pos: [f32; 2],
}

/// A single editing session over one room graph
#[derive(Debug, Clone)]
pub struct EditorSession {
    graph: RoomGraph,
    connection: Option<ConnectionDrag>,
}

impl EditorSession {
    /// Start a session on a new empty graph
    pub fn new(registry: Arc<RoomTypeRegistry>, settings: GraphSettings) -> Self {
        Self::from_graph(RoomGraph::new(registry, settings))
    }

    /// Start a session on an existing graph
    pub fn from_graph(graph: RoomGraph) -> Self {
        Self {
            graph,
            connection: None,
        }
    }

    /// Wrap the session for use from several threads
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// The graph being edited
    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    /// End the session, returning the graph
    pub fn into_graph(self) -> RoomGraph {
        self.graph
    }

    /// Create the entrance node if the graph has none.
    ///
    /// Returns the entrance, or `None` if the registry defines no entrance type.
    pub fn ensure_entrance(&mut self) -> Option<RoomNodeId> {
        if let Some(existing) = self.graph.entrance() {
            return Some(existing);
        }
        let Some(entrance_type) = self.graph.registry().entrance() else {
            tracing::warn!(
                "Room type registry '{}' has no entrance type",
                self.graph.registry().name()
            );
            return None;
        };
        let settings = self.graph.settings();
        let bounds = Bounds::new(settings.entrance_position, settings.node_size);
        self.graph.create_node(bounds, entrance_type)
    }

    /// Create a room node at `position`.
    ///
    /// An empty graph gets its entrance first. Returns `None` when asked for
    /// a second entrance or a type outside the registry.
    pub fn create_node(&mut self, position: [f32; 2], room_type: RoomTypeId) -> Option<RoomNodeId> {
        let is_entrance = self.graph.registry().get(room_type)?.is_entrance;

        if is_entrance && self.graph.entrance().is_some() {
            tracing::debug!("Refusing to create a second entrance");
            return None;
        }
        if self.graph.is_empty() && !is_entrance {
            self.ensure_entrance();
        }

        let bounds = Bounds::new(position, self.graph.settings().node_size);
        self.graph.create_node(bounds, room_type)
    }

    /// Link `parent → child`
    pub fn link(&mut self, parent: RoomNodeId, child: RoomNodeId) -> bool {
        self.graph.link(parent, child)
    }

    /// Remove `parent → child`
    pub fn unlink(&mut self, parent: RoomNodeId, child: RoomNodeId) -> bool {
        self.graph.unlink(parent, child)
    }

    /// Delete a node; entrances are protected
    pub fn delete_node(&mut self, id: RoomNodeId) -> bool {
        if self.graph.is_entrance(id) {
            tracing::debug!("Refusing to delete entrance {id:?}");
            return false;
        }
        self.drop_connection_from(id);
        self.graph.delete_node(id).is_some()
    }

    /// Delete every selected node except entrances; returns how many went
    pub fn delete_selected_nodes(&mut self) -> usize {
        let doomed: Vec<RoomNodeId> = self
            .graph
            .selected_ids()
            .filter(|id| !self.graph.is_entrance(*id))
            .collect();
        doomed.into_iter().filter(|id| self.delete_node(*id)).count()
    }

    /// Delete links between selected nodes; returns how many went
    pub fn delete_selected_links(&mut self) -> usize {
        self.graph.delete_links_among_selected()
    }

    /// Select every node
    pub fn select_all(&mut self) {
        self.graph.select_all();
    }

    /// Deselect every node
    pub fn clear_selection(&mut self) {
        self.graph.clear_selection();
    }

    /// Set one node's selection
    pub fn set_selected(&mut self, id: RoomNodeId, selected: bool) -> bool {
        self.graph.set_selected(id, selected)
    }

    /// Change a node's room type.
    ///
    /// The entrance keeps its type and no other node may become one.
    pub fn retype(&mut self, id: RoomNodeId, room_type: RoomTypeId) -> bool {
        let to_entrance = self
            .graph
            .registry()
            .get(room_type)
            .is_some_and(|t| t.is_entrance);
        if self.graph.is_entrance(id) || to_entrance {
            tracing::debug!("Refusing to retype {id:?}: entrance type is fixed");
            return false;
        }
        self.graph.retype(id, room_type)
    }

    /// Move a node
    pub fn move_node(&mut self, id: RoomNodeId, delta: [f32; 2]) -> bool {
        self.graph.move_node(id, delta)
    }

    /// Start dragging the selected nodes, with `id` under the pointer
    pub fn begin_drag(&mut self, id: RoomNodeId) -> bool {
        if !self.graph.contains(id) {
            return false;
        }
        if !self.graph.get_node(id).is_some_and(|n| n.selected) {
            self.graph.clear_selection();
            self.graph.set_selected(id, true);
        }
        let selected: Vec<_> = self.graph.selected_ids().collect();
        for node in selected {
            self.graph.set_dragging(node, true);
        }
        true
    }

    /// Move every node being dragged
    pub fn drag_by(&mut self, delta: [f32; 2]) {
        let dragging: Vec<_> = self
            .graph
            .nodes()
            .filter(|n| n.dragging)
            .map(|n| n.id())
            .collect();
        for id in dragging {
            self.graph.move_node(id, delta);
        }
    }

    /// Finish a drag
    pub fn end_drag(&mut self) {
        let ids: Vec<_> = self.graph.node_ids().collect();
        for id in ids {
            self.graph.set_dragging(id, false);
        }
    }

    /// Start dragging a connection line out of `from`
    pub fn begin_connection(&mut self, from: RoomNodeId, position: [f32; 2]) -> bool {
        if !self.graph.contains(from) {
            return false;
        }
        self.connection = Some(ConnectionDrag {
            from,
            current_pos: position,
        });
        true
    }

    /// Move the loose end of the connection line
    pub fn drag_connection(&mut self, position: [f32; 2]) {
        if let Some(drag) = self.connection.as_mut() {
            drag.current_pos = position;
        }
    }

    /// Drop the connection line at `position`, linking to the node there
    pub fn end_connection(&mut self, position: [f32; 2]) -> bool {
        let Some(drag) = self.connection.take() else {
            return false;
        };
        match self.graph.node_at(position) {
            Some(target) => self.graph.link(drag.from, target),
            None => false,
        }
    }

    /// Abandon the connection line
    pub fn cancel_connection(&mut self) {
        self.connection = None;
    }

    /// The connection line in progress
    pub fn connection(&self) -> Option<&ConnectionDrag> {
        self.connection.as_ref()
    }

    fn drop_connection_from(&mut self, id: RoomNodeId) {
        if self.connection.is_some_and(|drag| drag.from == id) {
            self.connection = None;
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::from_graph(RoomGraph::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_id(session: &EditorSession, name: &str) -> RoomTypeId {
        session.graph().registry().find_by_name(name).unwrap()
    }

    #[test]
    fn test_first_node_creates_entrance() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");

        let r = session.create_node([500.0, 300.0], room).unwrap();
        assert_eq!(session.graph().node_count(), 2);

        let entrance = session.graph().entrance().unwrap();
        assert_ne!(entrance, r);
        let bounds = session.graph().get_node(entrance).unwrap().bounds;
        assert_eq!(bounds.position(), [200.0, 200.0]);

        session.create_node([700.0, 300.0], room).unwrap();
        assert_eq!(session.graph().node_count(), 3);
    }

    #[test]
    fn test_only_one_entrance() {
        let mut session = EditorSession::default();
        let entrance = type_id(&session, "Entrance");

        assert!(session.create_node([0.0, 0.0], entrance).is_some());
        assert_eq!(session.graph().node_count(), 1);
        assert!(session.create_node([300.0, 0.0], entrance).is_none());
    }

    #[test]
    fn test_entrance_cannot_be_deleted() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        let r = session.create_node([500.0, 300.0], room).unwrap();
        let e = session.graph().entrance().unwrap();
        assert!(session.link(e, r));

        assert!(!session.delete_node(e));
        session.select_all();
        assert_eq!(session.delete_selected_nodes(), 1);
        assert_eq!(session.graph().node_count(), 1);
        assert!(session.graph().children_of(e).is_empty());
    }

    #[test]
    fn test_entrance_type_is_fixed() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        let entrance_type = type_id(&session, "Entrance");
        let r = session.create_node([500.0, 300.0], room).unwrap();
        let e = session.graph().entrance().unwrap();

        assert!(!session.retype(e, room));
        assert!(!session.retype(r, entrance_type));
        assert!(session.retype(r, type_id(&session, "Corridor")));
    }

    #[test]
    fn test_delete_selected_links() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        let a = session.create_node([500.0, 300.0], room).unwrap();
        let b = session.create_node([700.0, 300.0], room).unwrap();
        let e = session.graph().entrance().unwrap();
        assert!(session.link(e, a));
        assert!(session.link(a, b));

        session.set_selected(a, true);
        session.set_selected(b, true);
        assert_eq!(session.delete_selected_links(), 1);
        assert_eq!(session.graph().link_count(), 1);
    }

    #[test]
    fn test_unlink_and_move() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        let r = session.create_node([500.0, 300.0], room).unwrap();
        let e = session.graph().entrance().unwrap();
        assert!(session.link(e, r));

        assert!(session.unlink(e, r));
        assert!(!session.unlink(e, r));
        assert_eq!(session.graph().link_count(), 0);
        assert!(session.graph().parents_of(r).is_empty());

        assert!(session.move_node(r, [-100.0, 50.0]));
        let bounds = session.graph().get_node(r).unwrap().bounds;
        assert_eq!(bounds.position(), [400.0, 350.0]);

        assert!(session.delete_node(r));
        assert!(!session.move_node(r, [1.0, 1.0]));
        assert!(!session.unlink(e, r));
    }

    #[test]
    fn test_unknown_type_creates_nothing() {
        let mut session = EditorSession::default();
        let foreign = RoomTypeId(session.graph().registry().len());
        assert!(session.create_node([500.0, 300.0], foreign).is_none());
        assert!(session.graph().is_empty());
    }

    #[test]
    fn test_connection_drag() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        let r = session.create_node([500.0, 300.0], room).unwrap();
        let e = session.graph().entrance().unwrap();

        assert!(session.begin_connection(e, [280.0, 237.0]));
        session.drag_connection([520.0, 320.0]);
        assert_eq!(session.connection().unwrap().current_pos, [520.0, 320.0]);
        assert!(session.end_connection([520.0, 320.0]));
        assert!(session.connection().is_none());
        assert_eq!(session.graph().children_of(e), &[r]);

        // Dropping on empty space links nothing
        assert!(session.begin_connection(r, [0.0, 0.0]));
        assert!(!session.end_connection([2000.0, 2000.0]));
        assert_eq!(session.graph().link_count(), 1);
    }

    #[test]
    fn test_drag_moves_selection() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        let a = session.create_node([500.0, 300.0], room).unwrap();
        let b = session.create_node([700.0, 300.0], room).unwrap();

        session.set_selected(a, true);
        session.set_selected(b, true);
        assert!(session.begin_drag(a));
        session.drag_by([10.0, -10.0]);
        session.end_drag();

        let graph = session.graph();
        assert_eq!(graph.get_node(a).unwrap().bounds.position(), [510.0, 290.0]);
        assert_eq!(graph.get_node(b).unwrap().bounds.position(), [710.0, 290.0]);
        assert!(graph.nodes().all(|n| !n.dragging));
    }

    #[test]
    fn test_shared_session() {
        let mut session = EditorSession::default();
        let room = type_id(&session, "Small Room");
        session.create_node([500.0, 300.0], room);
        let shared = session.into_shared();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let mut session = shared.lock();
                    let parent = session.graph().entrance().unwrap();
                    let child = session
                        .create_node([i as f32 * 200.0, 600.0], room)
                        .unwrap();
                    session.link(parent, child)
                })
            })
            .collect();

        let linked = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(linked, 4);

        let session = shared.lock();
        assert_eq!(session.graph().node_count(), 6);
        assert!(session.graph().audit().is_empty());
    }
}
