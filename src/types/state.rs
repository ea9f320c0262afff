//! Current display/playback state of the navigation engine.

use serde::{Deserialize, Serialize};

/// What the renderer should currently show, and which graph node it is
/// showing. Node references are indices into the pack's stage-node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// A single selectable choice: tap previews, long press descends.
    ///
    /// `menu` is the forced-tile context: when the tile is rendered as a
    /// menu entry it remembers the menu node so `Back` can return there.
    OptionTile { node: usize, menu: Option<usize> },
    /// A branch point enumerating selectable children.
    Menu { node: usize },
    /// Playing narrative content with pause/resume/back/ok controls.
    Story { node: usize, paused: bool },
    /// Display-only dead end for nodes of no known kind. No transition
    /// fires from here; the engine stays until an external reload.
    Unknown { node: usize },
    /// Terminal pseudo-state: the user backed out, reload the pack list.
    PackList,
}

impl PlaybackState {
    /// Stage-node index this state displays, if it displays one.
    pub fn node(&self) -> Option<usize> {
        match self {
            Self::OptionTile { node, .. }
            | Self::Menu { node }
            | Self::Story { node, .. }
            | Self::Unknown { node } => Some(*node),
            Self::PackList => None,
        }
    }

    pub fn is_pack_list(&self) -> bool {
        matches!(self, Self::PackList)
    }
}
