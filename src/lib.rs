//! # conteur
//!
//! A story-pack loader and navigation engine for branching audio stories.
//!
//! A *story pack* is a self-contained directory of narrative nodes, assets
//! and transitions. This crate loads such a directory into a validated,
//! immutable graph and walks it with a small deterministic state machine:
//! short taps preview an option, long presses descend into it, dedicated
//! controls move up toward an enclosing menu or back to the pack list.
//! Rendering, gesture dispatch and audio playback stay with the host; the
//! engine consumes input events and emits states plus side-effect
//! descriptions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use conteur::{Effect, FsPackReader, InputEvent, Navigator, PackReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pack = FsPackReader::new().read(Path::new("/media/card/.content/6BF7"))?;
//! let mut navigator = Navigator::new(pack);
//!
//! // Entry effects: a menu or story node starts its audio right away.
//! for effect in navigator.start().effects {
//!     if let Effect::PlayAudio { asset } = effect {
//!         println!("play {}", asset.path);
//!     }
//! }
//!
//! // Pick the first menu option, then descend into it.
//! navigator.handle(InputEvent::SelectOption { index: 0 });
//! navigator.handle(InputEvent::LongPress);
//! println!("now at {:?}", navigator.state());
//! # Ok(())
//! # }
//! ```
//!
//! ## Discovering packs
//!
//! ```rust,no_run
//! use conteur::{FsPackLibrary, PackLibrary};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let library = FsPackLibrary::new("/media/card/.content");
//! for entry in library.list_packs().await? {
//!     // A broken pack degrades to StoryPack::EMPTY instead of failing.
//!     let pack = library.load_pack_or_empty(&entry.dir).await;
//!     println!("{}: {} nodes", entry.metadata.uuid, pack.stage_nodes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod error;
pub mod library;
pub mod parser;
pub mod runtime;
pub mod types;

pub use assets::{AssetSource, AssetStream, FsAssetSource};
pub use error::{AssetError, LibraryError, NavigationFault, PackLoadError};
pub use library::{FsPackLibrary, PackEntry, PackLibrary};
pub use parser::{FsPackReader, PackReader};
pub use runtime::{Navigator, step, target_state_of};
pub use types::{
    ActionNode, AssetRef, ControlSettings, Effect, InputEvent, NodeKind, Output, PackMetadata,
    PlaybackState, StageNode, StoryPack, Transition, classify,
};
