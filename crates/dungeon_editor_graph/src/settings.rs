// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph editing settings.
//!
//! Loaded from a RON file next to the project; every field falls back to
//! its default when omitted.

use crate::node::{NODE_HEIGHT, NODE_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default child count at which a node stops accepting corridors
pub const DEFAULT_MAX_CHILD_CORRIDORS: usize = 3;

/// Where the implicit entrance node is placed
pub const DEFAULT_ENTRANCE_POSITION: [f32; 2] = [200.0, 200.0];

/// Settings shared by the graph model and the editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// A node with this many children accepts no further corridor child
    pub max_child_corridors: usize,
    /// Reject corridor → corridor and room → room links
    pub enforce_corridor_alternation: bool,
    /// Size of newly created nodes
    pub node_size: [f32; 2],
    /// Position of the entrance created with the first node
    pub entrance_position: [f32; 2],
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            max_child_corridors: DEFAULT_MAX_CHILD_CORRIDORS,
            enforce_corridor_alternation: false,
            node_size: [NODE_WIDTH, NODE_HEIGHT],
            entrance_position: DEFAULT_ENTRANCE_POSITION,
        }
    }
}

impl GraphSettings {
    /// Set the corridor cap
    pub fn with_max_child_corridors(mut self, max: usize) -> Self {
        self.max_child_corridors = max;
        self
    }

    /// Enable or disable corridor/room alternation
    pub fn with_corridor_alternation(mut self, enforce: bool) -> Self {
        self.enforce_corridor_alternation = enforce;
        self
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(s)?)
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load settings from file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&contents)?;
        tracing::info!("Loaded graph settings from {}", path.display());
        Ok(settings)
    }
}

/// Error when loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GraphSettings::default();
        assert_eq!(settings.max_child_corridors, 3);
        assert!(!settings.enforce_corridor_alternation);
        assert_eq!(settings.node_size, [160.0, 75.0]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = GraphSettings::from_ron("(max_child_corridors: 1)").unwrap();
        assert_eq!(settings.max_child_corridors, 1);
        assert_eq!(settings.entrance_position, DEFAULT_ENTRANCE_POSITION);
    }

    #[test]
    fn test_serialization() {
        let settings = GraphSettings::default().with_corridor_alternation(true);
        let ron_str = settings.to_ron().unwrap();
        let loaded = GraphSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }
}
