//! Header-only pack metadata, readable without building the graph.

use serde::{Deserialize, Serialize};

/// Cheap per-pack facts for the pack list: read from the node-index header
/// and the directory itself, no node records touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackMetadata {
    /// Directory name, trimmed at the first dot (some tools append a
    /// timestamp suffix there).
    pub uuid: String,
    /// Story pack version from the node-index header.
    pub version: i16,
    /// Whether the pack ships a night-mode marker file.
    pub night_mode: bool,
}
