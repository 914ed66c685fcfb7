// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room type definitions and the registry they are loaded into.
//!
//! Room types replace an enum: the catalog is data, loaded once and then
//! shared read-only by every graph that references it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Index of a room type inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomTypeId(pub(crate) usize);

impl RoomTypeId {
    /// Position of the type in registry order
    pub fn index(self) -> usize {
        self.0
    }
}

/// A room type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    /// Display name, unique within a registry
    pub name: String,
    /// Shown in the node type picker
    #[serde(default = "default_display")]
    pub display_in_editor: bool,
    /// Corridor of any orientation
    #[serde(default)]
    pub is_corridor: bool,
    /// North-south corridor
    #[serde(default)]
    pub is_corridor_north_south: bool,
    /// East-west corridor
    #[serde(default)]
    pub is_corridor_east_west: bool,
    /// Dungeon entrance; always a root
    #[serde(default)]
    pub is_entrance: bool,
    /// Boss room
    #[serde(default)]
    pub is_boss_room: bool,
    /// Unassigned
    #[serde(default)]
    pub is_none: bool,
}

fn default_display() -> bool {
    true
}

impl RoomType {
    /// Create a plain room type with no capability flags
    pub fn room(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_in_editor: true,
            is_corridor: false,
            is_corridor_north_south: false,
            is_corridor_east_west: false,
            is_entrance: false,
            is_boss_room: false,
            is_none: false,
        }
    }

    /// The unassigned type
    pub fn none(name: impl Into<String>) -> Self {
        Self {
            is_none: true,
            ..Self::room(name)
        }
    }

    /// An entrance type
    pub fn entrance(name: impl Into<String>) -> Self {
        Self {
            is_entrance: true,
            ..Self::room(name)
        }
    }

    /// A boss room type
    pub fn boss_room(name: impl Into<String>) -> Self {
        Self {
            is_boss_room: true,
            ..Self::room(name)
        }
    }

    /// A corridor type
    pub fn corridor(name: impl Into<String>) -> Self {
        Self {
            is_corridor: true,
            ..Self::room(name)
        }
    }

    /// Hide this type from the editor picker
    pub fn hidden(mut self) -> Self {
        self.display_in_editor = false;
        self
    }
}

/// Name the standard catalog is registered under
pub const STANDARD_REGISTRY_NAME: &str = "Standard";

/// On-disk layout of a registry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryFile {
    name: String,
    types: Vec<RoomType>,
}

/// Immutable, validated catalog of room types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTypeRegistry {
    name: String,
    types: Vec<RoomType>,
}

impl RoomTypeRegistry {
    /// Validate and build a registry.
    ///
    /// Fails if the list is empty, a name is blank, or two types share a name.
    pub fn new(name: impl Into<String>, types: Vec<RoomType>) -> Result<Self, RegistryError> {
        if types.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::with_capacity(types.len());
        for (index, room_type) in types.iter().enumerate() {
            if room_type.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(index));
            }
            if !seen.insert(room_type.name.as_str()) {
                return Err(RegistryError::DuplicateName(room_type.name.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            types,
        })
    }

    /// The built-in dungeon catalog
    pub fn standard() -> Self {
        Self {
            name: STANDARD_REGISTRY_NAME.to_string(),
            types: vec![
                RoomType::none("None"),
                RoomType::entrance("Entrance"),
                RoomType::room("Small Room"),
                RoomType::room("Medium Room"),
                RoomType::room("Large Room"),
                RoomType::room("Chest Room"),
                RoomType::boss_room("Boss Room"),
                RoomType::corridor("Corridor"),
                RoomType {
                    is_corridor_north_south: true,
                    ..RoomType::corridor("CorridorNS").hidden()
                },
                RoomType {
                    is_corridor_east_west: true,
                    ..RoomType::corridor("CorridorEW").hidden()
                },
            ],
        }
    }

    /// Registry name, referenced by saved graphs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a type by ID
    pub fn get(&self, id: RoomTypeId) -> Option<&RoomType> {
        self.types.get(id.0)
    }

    /// First type matching `predicate`
    pub fn find_first(
        &self,
        mut predicate: impl FnMut(&RoomType) -> bool,
    ) -> Option<(RoomTypeId, &RoomType)> {
        self.types
            .iter()
            .enumerate()
            .find(|(_, t)| predicate(*t))
            .map(|(i, t)| (RoomTypeId(i), t))
    }

    /// Look up a type by exact name
    pub fn find_by_name(&self, name: &str) -> Option<RoomTypeId> {
        self.find_first(|t| t.name == name).map(|(id, _)| id)
    }

    /// The first entrance type
    pub fn entrance(&self) -> Option<RoomTypeId> {
        self.find_first(|t| t.is_entrance).map(|(id, _)| id)
    }

    /// The first unassigned type
    pub fn none_type(&self) -> Option<RoomTypeId> {
        self.find_first(|t| t.is_none).map(|(id, _)| id)
    }

    /// All types in registry order
    pub fn types(&self) -> impl Iterator<Item = (RoomTypeId, &RoomType)> {
        self.types.iter().enumerate().map(|(i, t)| (RoomTypeId(i), t))
    }

    /// Types offered in the editor's type picker
    pub fn displayed_in_editor(&self) -> impl Iterator<Item = (RoomTypeId, &RoomType)> {
        self.types().filter(|(_, t)| t.display_in_editor)
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false for a validated registry
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let file = RegistryFile {
            name: self.name.clone(),
            types: self.types.clone(),
        };
        ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::default())
    }

    /// Deserialize and validate from RON format
    pub fn from_ron(s: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = ron::from_str(s)?;
        Self::new(file.name, file.types)
    }

    /// Save registry to file
    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let ron_str = self.to_ron()?;
        std::fs::write(path, ron_str)?;
        Ok(())
    }

    /// Load registry from file
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        let registry = Self::from_ron(&contents)?;
        tracing::info!(
            "Loaded room type registry '{}' ({} types) from {}",
            registry.name,
            registry.len(),
            path.display()
        );
        Ok(registry)
    }
}

impl Default for RoomTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Error when loading a registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No types defined
    #[error("Room type registry is empty")]
    Empty,

    /// A type has a blank name
    #[error("Room type at index {0} has an empty name")]
    EmptyName(usize),

    /// Two types share a name
    #[error("Duplicate room type name: {0}")]
    DuplicateName(String),

    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Registry could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}
