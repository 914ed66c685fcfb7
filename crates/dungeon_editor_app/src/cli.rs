// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dungeon_editor")]
#[command(author, version, about = "Room node graph tooling for dungeon layouts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where room types and settings come from
#[derive(Args, Debug, Clone, Default)]
pub struct Sources {
    /// Room type registry (RON); the built-in catalog when omitted
    #[arg(short = 'r', long = "registry")]
    pub registry: Option<PathBuf>,

    /// Graph settings (RON); defaults when omitted
    #[arg(short = 's', long = "settings")]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the room types of a registry
    Types {
        #[command(flatten)]
        sources: Sources,
    },

    /// Create a new graph asset holding only the entrance
    New {
        /// Output file
        output: PathBuf,

        #[command(flatten)]
        sources: Sources,

        /// Overwrite an existing file
        #[arg(short = 'f', long = "force")]
        force: bool,
    },

    /// Load a graph asset, re-check every link, and print a summary
    Check {
        /// Graph file
        graph: PathBuf,

        #[command(flatten)]
        sources: Sources,

        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "dungeon_editor",
            "check",
            "level1.roomgraph",
            "--registry",
            "types.ron",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Check {
                graph,
                sources,
                json,
            } => {
                assert_eq!(graph, PathBuf::from("level1.roomgraph"));
                assert_eq!(sources.registry, Some(PathBuf::from("types.ron")));
                assert!(sources.settings.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
