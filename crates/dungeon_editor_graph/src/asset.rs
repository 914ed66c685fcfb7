// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saved room graph assets.
//!
//! Nodes are stored by persistent UUID and room types by name, so a saved
//! graph stays valid when the registry is reordered.

use crate::graph::RoomGraph;
use crate::node::{Bounds, RoomNodeId};
use crate::room_type::RoomTypeRegistry;
use crate::settings::GraphSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Current graph asset format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Conventional file extension for graph assets
pub const GRAPH_FILE_EXTENSION: &str = "roomgraph";

/// A persisted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomNodeRecord {
    /// Persistent identity
    pub id: Uuid,
    /// Rectangle in the graph UI
    pub bounds: Bounds,
    /// Room type name
    pub room_type: String,
    /// Parent node identities
    #[serde(default)]
    pub parents: Vec<Uuid>,
    /// Child node identities
    #[serde(default)]
    pub children: Vec<Uuid>,
}

/// A persisted room graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomGraphAsset {
    /// Format version
    pub version: u32,
    /// Name of the room type registry the graph was authored against
    pub room_types: String,
    /// Nodes in creation order
    pub nodes: Vec<RoomNodeRecord>,
}

impl RoomGraphAsset {
    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

impl RoomGraph {
    /// Snapshot the graph into its persisted layout
    pub fn to_asset(&self) -> RoomGraphAsset {
        let uuid_of = |id: &RoomNodeId| self.get_node(*id).map(|n| n.uuid());
        let nodes = self
            .nodes()
            .map(|node| RoomNodeRecord {
                id: node.uuid(),
                bounds: node.bounds,
                room_type: self
                    .type_name(node.id())
                    .unwrap_or_default()
                    .to_string(),
                parents: node.parents().iter().filter_map(uuid_of).collect(),
                children: node.children().iter().filter_map(uuid_of).collect(),
            })
            .collect();

        RoomGraphAsset {
            version: GRAPH_FORMAT_VERSION,
            room_types: self.registry().name().to_string(),
            nodes,
        }
    }

    /// Rebuild a graph from its persisted layout.
    ///
    /// Adjacency must be symmetric and free of self references, duplicates
    /// and unknown ids. Links are not re-checked against the connectivity
    /// rules; use [`RoomGraph::audit`] for that.
    pub fn from_asset(
        asset: &RoomGraphAsset,
        registry: Arc<RoomTypeRegistry>,
        settings: GraphSettings,
    ) -> Result<Self, AssetError> {
        if asset.version > GRAPH_FORMAT_VERSION {
            return Err(AssetError::UnsupportedVersion(asset.version));
        }
        if asset.room_types != registry.name() {
            tracing::warn!(
                "Graph was authored against room types '{}', loading with '{}'",
                asset.room_types,
                registry.name()
            );
        }

        let mut graph = RoomGraph::new(Arc::clone(&registry), settings);
        let mut seen = HashSet::with_capacity(asset.nodes.len());
        for record in &asset.nodes {
            if !seen.insert(record.id) {
                return Err(AssetError::DuplicateNodeId(record.id));
            }
            let room_type = registry
                .find_by_name(&record.room_type)
                .ok_or_else(|| AssetError::UnknownRoomType(record.room_type.clone()))?;
            graph.insert_loaded(record.id, record.bounds, room_type);
        }
        graph.rebuild_index();

        for record in &asset.nodes {
            let id = graph
                .find_by_uuid(record.id)
                .ok_or(AssetError::DanglingReference(record.id))?;
            let parents = resolve_list(&graph, record.id, &record.parents)?;
            let children = resolve_list(&graph, record.id, &record.children)?;
            graph.set_adjacency(id, parents, children);
        }

        for link in graph.links() {
            if !graph.parents_of(link.child).contains(&link.parent) {
                return Err(asymmetric(&graph, link.parent, link.child));
            }
        }
        for node in graph.nodes() {
            for parent in node.parents() {
                if !graph.children_of(*parent).contains(&node.id()) {
                    return Err(asymmetric(&graph, *parent, node.id()));
                }
            }
        }

        Ok(graph)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        self.to_asset().to_ron()
    }

    /// Deserialize from RON format
    pub fn from_ron(
        s: &str,
        registry: Arc<RoomTypeRegistry>,
        settings: GraphSettings,
    ) -> Result<Self, AssetError> {
        let asset = RoomGraphAsset::from_ron(s)?;
        Self::from_asset(&asset, registry, settings)
    }

    /// Save graph to file
    pub fn save(&self, path: &Path) -> Result<(), AssetError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!(
            "Saved room graph ({} nodes, {} links) to {}",
            self.node_count(),
            self.link_count(),
            path.display()
        );
        Ok(())
    }

    /// Load graph from file
    pub fn load(
        path: &Path,
        registry: Arc<RoomTypeRegistry>,
        settings: GraphSettings,
    ) -> Result<Self, AssetError> {
        let contents = std::fs::read_to_string(path)?;
        let graph = Self::from_ron(&contents, registry, settings)?;
        tracing::info!(
            "Loaded room graph ({} nodes, {} links) from {}",
            graph.node_count(),
            graph.link_count(),
            path.display()
        );
        Ok(graph)
    }
}

fn resolve_list(graph: &RoomGraph, owner: Uuid, ids: &[Uuid]) -> Result<Vec<RoomNodeId>, AssetError> {
    let mut resolved = Vec::with_capacity(ids.len());
    for uuid in ids {
        if *uuid == owner {
            return Err(AssetError::SelfReference(owner));
        }
        let id = graph
            .find_by_uuid(*uuid)
            .ok_or(AssetError::DanglingReference(*uuid))?;
        if resolved.contains(&id) {
            return Err(AssetError::DuplicateLink(owner, *uuid));
        }
        resolved.push(id);
    }
    Ok(resolved)
}

fn asymmetric(graph: &RoomGraph, parent: RoomNodeId, child: RoomNodeId) -> AssetError {
    let uuid = |id| graph.get_node(id).map(|n| n.uuid()).unwrap_or_default();
    AssetError::AsymmetricLink {
        parent: uuid(parent),
        child: uuid(child),
    }
}

/// Error when loading or saving a graph asset
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Graph could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer editor
    #[error("Unsupported graph format version: {0}")]
    UnsupportedVersion(u32),

    /// Room type name missing from the registry
    #[error("Unknown room type: {0}")]
    UnknownRoomType(String),

    /// Two nodes share an id
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(Uuid),

    /// Adjacency refers to a node that does not exist
    #[error("Reference to missing node: {0}")]
    DanglingReference(Uuid),

    /// A node lists itself as parent or child
    #[error("Node {0} references itself")]
    SelfReference(Uuid),

    /// An id appears twice in one adjacency list
    #[error("Node {0} lists {1} more than once")]
    DuplicateLink(Uuid, Uuid),

    /// Only one side of a link was recorded
    #[error("Link {parent} -> {child} is only recorded on one side")]
    AsymmetricLink {
        /// Upstream node
        parent: Uuid,
        /// Downstream node
        child: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RoomGraph {
        let mut graph = RoomGraph::default();
        let registry = Arc::clone(graph.registry());
        let entrance = registry.entrance().unwrap();
        let corridor = registry.find_by_name("Corridor").unwrap();
        let boss = registry.find_by_name("Boss Room").unwrap();

        let e = graph.create_node(Bounds::at([200.0, 200.0]), entrance).unwrap();
        let c = graph.create_node(Bounds::at([400.0, 200.0]), corridor).unwrap();
        let b = graph.create_node(Bounds::at([600.0, 200.0]), boss).unwrap();
        assert!(graph.link(e, c));
        assert!(graph.link(c, b));
        graph
    }

    fn reload(ron_str: &str) -> Result<RoomGraph, AssetError> {
        RoomGraph::from_ron(
            ron_str,
            Arc::new(RoomTypeRegistry::standard()),
            GraphSettings::default(),
        )
    }

    #[test]
    fn test_serialization() {
        let graph = sample();
        let ron_str = graph.to_ron().unwrap();
        let loaded = reload(&ron_str).unwrap();

        assert_eq!(loaded.node_count(), 3);
        assert_eq!(loaded.link_count(), 2);
        assert_eq!(loaded.to_asset(), graph.to_asset());
        assert!(loaded.audit().is_empty());

        let indexed: HashSet<_> = loaded.indexed_ids().collect();
        let sequence: HashSet<_> = loaded.node_ids().collect();
        assert_eq!(indexed, sequence);
    }

    #[test]
    fn test_loaded_uuids_resolve() {
        let graph = sample();
        let asset = graph.to_asset();
        let loaded = reload(&asset.to_ron().unwrap()).unwrap();

        for record in &asset.nodes {
            let id = loaded.find_by_uuid(record.id).unwrap();
            assert_eq!(loaded.type_name(id), Some(record.room_type.as_str()));
            assert_eq!(loaded.get_node(id).unwrap().bounds, record.bounds);
        }
    }

    #[test]
    fn test_rejects_unknown_room_type() {
        let mut asset = sample().to_asset();
        asset.nodes[1].room_type = "Throne Room".to_string();
        let result = reload(&asset.to_ron().unwrap());
        assert!(matches!(result, Err(AssetError::UnknownRoomType(name)) if name == "Throne Room"));
    }

    #[test]
    fn test_saved_types_always_reload() {
        let mut graph = sample();
        let foreign = crate::RoomTypeId(graph.registry().len() + 1);
        assert!(graph.create_node(Bounds::at([800.0, 200.0]), foreign).is_none());
        let b = graph.node_ids().last().unwrap();
        assert!(!graph.retype(b, foreign));

        let asset = graph.to_asset();
        assert!(asset.nodes.iter().all(|n| !n.room_type.is_empty()));
        let loaded = reload(&asset.to_ron().unwrap()).unwrap();
        assert_eq!(loaded.to_asset(), asset);
    }

    #[test]
    fn test_rejects_dangling_reference() {
        let mut asset = sample().to_asset();
        let ghost = Uuid::new_v4();
        asset.nodes[0].children.push(ghost);
        let result = reload(&asset.to_ron().unwrap());
        assert!(matches!(result, Err(AssetError::DanglingReference(id)) if id == ghost));
    }

    #[test]
    fn test_rejects_asymmetric_link() {
        let mut asset = sample().to_asset();
        asset.nodes[2].parents.clear();
        let result = reload(&asset.to_ron().unwrap());
        assert!(matches!(result, Err(AssetError::AsymmetricLink { .. })));
    }

    #[test]
    fn test_rejects_duplicate_node_id() {
        let mut asset = sample().to_asset();
        asset.nodes[2].id = asset.nodes[1].id;
        let result = reload(&asset.to_ron().unwrap());
        assert!(matches!(result, Err(AssetError::DuplicateNodeId(_))));
    }

    #[test]
    fn test_rejects_self_reference() {
        let mut asset = sample().to_asset();
        let own = asset.nodes[1].id;
        asset.nodes[1].parents.push(own);
        let result = reload(&asset.to_ron().unwrap());
        assert!(matches!(result, Err(AssetError::SelfReference(id)) if id == own));
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut asset = sample().to_asset();
        asset.version = GRAPH_FORMAT_VERSION + 1;
        let result = reload(&asset.to_ron().unwrap());
        assert!(matches!(result, Err(AssetError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_rule_violations_survive_load_for_audit() {
        let mut asset = sample().to_asset();
        // Entrance listed as child of the boss room
        let entrance = asset.nodes[0].id;
        let boss = asset.nodes[2].id;
        asset.nodes[2].children.push(entrance);
        asset.nodes[0].parents.push(boss);

        let loaded = reload(&asset.to_ron().unwrap()).unwrap();
        let violations = loaded.audit();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].1, crate::LinkRule::EntranceAsChild);
    }
}
