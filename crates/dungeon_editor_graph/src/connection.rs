// SPDX-License-Identifier: MIT OR Apache-2.0
//! Links (edges) between room nodes and the rules that reject them.

use crate::node::RoomNodeId;

/// A directed parent → child link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    /// Upstream node
    pub parent: RoomNodeId,
    /// Downstream node
    pub child: RoomNodeId,
}

impl Link {
    /// Create a new link
    pub fn new(parent: RoomNodeId, child: RoomNodeId) -> Self {
        Self { parent, child }
    }

    /// Check if this link involves a specific node
    pub fn involves_node(&self, node_id: RoomNodeId) -> bool {
        self.parent == node_id || self.child == node_id
    }
}

/// Connectivity rule that rejected a link, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRule {
    /// The parent's type is unassigned
    ParentUnassigned,
    /// The child's type is unassigned
    ChildUnassigned,
    /// The link already exists
    Duplicate,
    /// Parent and child are the same node
    SelfLoop,
    /// The child is already a parent of this node
    ReverseLink,
    /// The parent has too many children to take a corridor
    CorridorCapReached,
    /// Entrances are always roots
    EntranceAsChild,
    /// A corridor leads to at most one node
    CorridorAlreadyLinked,
    /// Corridors and rooms must alternate
    NotAlternating,
}

impl LinkRule {
    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::ParentUnassigned => "parent room type is unassigned",
            Self::ChildUnassigned => "child room type is unassigned",
            Self::Duplicate => "link already exists",
            Self::SelfLoop => "a room cannot link to itself",
            Self::ReverseLink => "child is already a parent of this room",
            Self::CorridorCapReached => "too many children to add a corridor",
            Self::EntranceAsChild => "an entrance cannot be a child",
            Self::CorridorAlreadyLinked => "corridor already leads to a room",
            Self::NotAlternating => "corridors and rooms must alternate",
        }
    }
}

impl std::fmt::Display for LinkRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Error when creating a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(RoomNodeId),

    /// A connectivity rule rejected the link
    #[error("Link rejected: {0}")]
    Rejected(LinkRule),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_node() {
        let a = RoomNodeId::new(0, 0);
        let b = RoomNodeId::new(1, 0);
        let c = RoomNodeId::new(2, 0);
        let link = Link::new(a, b);
        assert!(link.involves_node(a));
        assert!(link.involves_node(b));
        assert!(!link.involves_node(c));
    }

    #[test]
    fn test_error_messages() {
        let err = LinkError::Rejected(LinkRule::EntranceAsChild);
        assert_eq!(err.to_string(), "Link rejected: an entrance cannot be a child");
    }
}
