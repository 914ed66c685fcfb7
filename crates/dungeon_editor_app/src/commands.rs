// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.

use crate::cli::{Command, Sources};
use crate::summary::GraphSummary;
use dungeon_editor_graph::{
    AssetError, EditorSession, GraphSettings, RegistryError, RoomGraph, RoomTypeRegistry,
    SettingsError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Command errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Room type registry failed to load
    #[error("Room types: {0}")]
    Registry(#[from] RegistryError),

    /// Settings failed to load
    #[error("Settings: {0}")]
    Settings(#[from] SettingsError),

    /// Graph failed to load or save
    #[error("Graph: {0}")]
    Asset(#[from] AssetError),

    /// Summary could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Refusing to overwrite
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    /// Registry has no entrance type to seed the graph with
    #[error("Room type registry '{0}' has no entrance type")]
    NoEntrance(String),

    /// The checked graph is not valid
    #[error("Graph is invalid: {0} rule violation(s), entrance present: {1}")]
    Invalid(usize, bool),
}

/// Result type for commands
pub type Result<T> = std::result::Result<T, CliError>;

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Types { sources } => list_types(&sources),
        Command::New {
            output,
            sources,
            force,
        } => new_graph(&output, &sources, force),
        Command::Check {
            graph,
            sources,
            json,
        } => check_graph(&graph, &sources, json),
    }
}

fn load_sources(sources: &Sources) -> Result<(Arc<RoomTypeRegistry>, GraphSettings)> {
    let registry = match &sources.registry {
        Some(path) => RoomTypeRegistry::load(path)?,
        None => RoomTypeRegistry::standard(),
    };
    let settings = match &sources.settings {
        Some(path) => GraphSettings::load(path)?,
        None => GraphSettings::default(),
    };
    Ok((Arc::new(registry), settings))
}

fn list_types(sources: &Sources) -> Result<()> {
    let (registry, _) = load_sources(sources)?;
    println!("{}", registry.name());
    for (_, room_type) in registry.types() {
        let mut flags = Vec::new();
        if room_type.is_none {
            flags.push("none");
        }
        if room_type.is_entrance {
            flags.push("entrance");
        }
        if room_type.is_boss_room {
            flags.push("boss");
        }
        if room_type.is_corridor {
            flags.push("corridor");
        }
        if room_type.is_corridor_north_south {
            flags.push("north-south");
        }
        if room_type.is_corridor_east_west {
            flags.push("east-west");
        }
        if !room_type.display_in_editor {
            flags.push("hidden");
        }
        println!("  {:<14} {}", room_type.name, flags.join(", "));
    }
    Ok(())
}

/// Build a graph holding only the entrance node
pub fn seed_graph(registry: Arc<RoomTypeRegistry>, settings: GraphSettings) -> Result<RoomGraph> {
    let name = registry.name().to_string();
    let mut session = EditorSession::new(registry, settings);
    session.ensure_entrance().ok_or(CliError::NoEntrance(name))?;
    Ok(session.into_graph())
}

fn new_graph(output: &Path, sources: &Sources, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(CliError::AlreadyExists(output.to_path_buf()));
    }
    let (registry, settings) = load_sources(sources)?;
    let graph = seed_graph(registry, settings)?;
    graph.save(output)?;
    println!("Created {}", output.display());
    Ok(())
}

fn check_graph(path: &Path, sources: &Sources, json: bool) -> Result<()> {
    let (registry, settings) = load_sources(sources)?;
    let graph = RoomGraph::load(path, registry, settings)?;
    let summary = GraphSummary::new(&graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }

    if summary.is_valid() {
        Ok(())
    } else {
        Err(CliError::Invalid(summary.violations.len(), summary.has_entrance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_editor_graph::RoomType;

    #[test]
    fn test_seed_graph_has_entrance() {
        let graph = seed_graph(
            Arc::new(RoomTypeRegistry::standard()),
            GraphSettings::default(),
        )
        .unwrap();
        assert_eq!(graph.node_count(), 1);
        assert!(graph.entrance().is_some());
    }

    #[test]
    fn test_seed_graph_without_entrance_type() {
        let registry = RoomTypeRegistry::new("Rooms", vec![RoomType::room("Hall")]).unwrap();
        let result = seed_graph(Arc::new(registry), GraphSettings::default());
        assert!(matches!(result, Err(CliError::NoEntrance(name)) if name == "Rooms"));
    }

    #[test]
    fn test_seeded_graph_round_trips() {
        let registry = Arc::new(RoomTypeRegistry::standard());
        let graph = seed_graph(Arc::clone(&registry), GraphSettings::default()).unwrap();
        let ron_str = graph.to_ron().unwrap();
        let loaded = RoomGraph::from_ron(&ron_str, registry, GraphSettings::default()).unwrap();
        assert!(GraphSummary::new(&loaded).is_valid());
    }
}
