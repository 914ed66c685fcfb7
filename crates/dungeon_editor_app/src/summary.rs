// SPDX-License-Identifier: MIT OR Apache-2.0
//! Printable summary of a room graph.

use dungeon_editor_graph::RoomGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A link that breaks a connectivity rule
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub parent: String,
    pub child: String,
    pub rule: String,
}

/// Counts and rule violations for one graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub room_types: String,
    pub nodes: usize,
    pub links: usize,
    pub has_entrance: bool,
    pub rooms_by_type: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
}

impl GraphSummary {
    pub fn new(graph: &RoomGraph) -> Self {
        let mut rooms_by_type = BTreeMap::new();
        for id in graph.node_ids() {
            let name = graph.type_name(id).unwrap_or("<unknown>").to_string();
            *rooms_by_type.entry(name).or_insert(0) += 1;
        }

        let describe = |id| {
            let node = graph.get_node(id);
            format!(
                "{} ({})",
                graph.type_name(id).unwrap_or("<unknown>"),
                node.map(|n| n.uuid().to_string()).unwrap_or_default()
            )
        };
        let violations = graph
            .audit()
            .into_iter()
            .map(|(link, rule)| Violation {
                parent: describe(link.parent),
                child: describe(link.child),
                rule: rule.to_string(),
            })
            .collect();

        Self {
            room_types: graph.registry().name().to_string(),
            nodes: graph.node_count(),
            links: graph.link_count(),
            has_entrance: graph.entrance().is_some(),
            rooms_by_type,
            violations,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.has_entrance && self.violations.is_empty()
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Room types: {}", self.room_types)?;
        writeln!(f, "Nodes: {} | Links: {}", self.nodes, self.links)?;
        for (name, count) in &self.rooms_by_type {
            writeln!(f, "  {name}: {count}")?;
        }
        if !self.has_entrance {
            writeln!(f, "Missing entrance")?;
        }
        if self.violations.is_empty() {
            write!(f, "All links valid")
        } else {
            writeln!(f, "{} invalid link(s):", self.violations.len())?;
            for v in &self.violations {
                writeln!(f, "  {} -> {}: {}", v.parent, v.child, v.rule)?;
            }
            Ok(())
        }
    }
}
