//! Core types of the crate's public API:
//! - graph: the validated story graph (packs, nodes, transitions, assets)
//! - state: the engine's current display/playback state
//! - event: input events the host feeds into the engine
//! - output: side-effect descriptions the engine hands back
//! - metadata: header-only pack facts for the pack list

pub mod event;
pub mod graph;
pub mod metadata;
pub mod output;
pub mod state;

pub use event::InputEvent;
pub use graph::{
    ActionNode, AssetRef, ControlSettings, NodeKind, StageNode, StoryPack, Transition, classify,
};
pub use metadata::PackMetadata;
pub use output::{Effect, Output};
pub use state::PlaybackState;
