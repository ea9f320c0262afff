//! Input events the host wires into the navigation engine.

use serde::{Deserialize, Serialize};

/// Discrete input events driving navigation.
///
/// The host translates gestures and playback callbacks into these; the
/// engine never observes raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Short tap on an option tile: preview its audio.
    Tap,
    /// Long press on an option tile: descend into it.
    LongPress,
    /// Pick option `index` from the current menu.
    SelectOption { index: usize },
    /// The dedicated OK control.
    Ok,
    /// Move up toward the enclosing menu or out to the pack list.
    Back,
    /// Toggle playback pause. Only legal while a story plays.
    PauseResume,
    /// Reported by the playback collaborator when audio reaches its end.
    AutoComplete,
}
