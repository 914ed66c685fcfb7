// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node graph model for the dungeon layout editor.
//!
//! A dungeon layout is a directed graph of typed rooms. This crate owns that
//! graph and the rules deciding which links are legal; a presentation layer
//! forwards user intents and renders the resulting state.
//!
//! ## Architecture
//!
//! - [`RoomTypeRegistry`]: validated, immutable catalog of room types
//! - [`RoomNode`]: a vertex with bounds, type, and parent/child lists
//! - [`RoomGraph`]: generational node arena, id index, connectivity rules
//! - [`EditorSession`]: editor policy (entrance handling) and intents
//! - [`RoomGraphAsset`]: RON persistence keyed by stable UUIDs

pub mod asset;
pub mod connection;
pub mod graph;
pub mod node;
pub mod room_type;
pub mod session;
pub mod settings;

pub use asset::{AssetError, RoomGraphAsset, RoomNodeRecord};
pub use connection::{Link, LinkError, LinkRule};
pub use graph::RoomGraph;
pub use node::{Bounds, RoomNode, RoomNodeId};
pub use room_type::{RegistryError, RoomType, RoomTypeId, RoomTypeRegistry};
pub use session::{ConnectionDrag, EditorSession, SharedSession};
pub use settings::{GraphSettings, SettingsError};
