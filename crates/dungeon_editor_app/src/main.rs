// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dungeon Editor - headless tooling for room node graphs
//!
//! Lists room type catalogs, creates new graph assets, and checks saved
//! graphs against the connectivity rules. The visual editor drives the same
//! `dungeon_editor_graph` model.

mod cli;
mod commands;
mod summary;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["dungeon_editor=info", "dungeon_editor_graph=info"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting dungeon editor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = commands::run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
