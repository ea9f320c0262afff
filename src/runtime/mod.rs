//! Navigation engine: a pure state machine over the story graph.
//!
//! `step` computes the next [`PlaybackState`] plus the side effects the host
//! should perform. It owns no I/O and holds no timers; given the same node
//! and the same input sequence it always computes the same result. Audio is
//! always delegated through [`Output`] effects, never performed here.

use crate::error::NavigationFault;
use crate::types::{
    event::InputEvent,
    graph::{NodeKind, StoryPack, Transition, classify},
    output::Output,
    state::PlaybackState,
};


/// Process one input event to completion.
///
/// Inputs that are not legal for the current state are no-ops: the state
/// comes back unchanged and the output stays empty.
pub fn step(state: PlaybackState, pack: &StoryPack, event: InputEvent) -> (PlaybackState, Output) {
    let mut output = Output::new();
    let next = match state {
        PlaybackState::OptionTile { node, menu } => {
            step_option_tile(pack, node, menu, event, &mut output)
        }
        PlaybackState::Menu { node } => step_menu(pack, node, event, &mut output),
        PlaybackState::Story { node, paused } => {
            step_story(pack, node, paused, event, &mut output)
        }
        // Dead ends: the unknown-node diagnostic and the pack list accept
        // nothing; only an external reload moves on.
        PlaybackState::Unknown { .. } | PlaybackState::PackList => None,
    };
    (next.unwrap_or(state), output)
}

/// Resolve a transition at an explicit option index and reclassify the
/// landing node into its state. Pure in (transition, index); entry effects
/// (menu/story audio, unknown-node fault) go into `output`.
pub fn target_state_of(
    pack: &StoryPack,
    transition: Transition,
    index: usize,
    output: &mut Output,
) -> Option<PlaybackState> {
    let node = pack.resolve_at(&transition, index)?;
    Some(enter_node(pack, node, output))
}

/// Enter a node: classify it and emit its entry effects.
fn enter_node(pack: &StoryPack, node: usize, output: &mut Output) -> PlaybackState {
    let Some(stage) = pack.stage(node) else {
        return PlaybackState::PackList;
    };
    match classify(stage) {
        NodeKind::OptionTile => PlaybackState::OptionTile { node, menu: None },
        NodeKind::Menu => {
            if let Some(audio) = &stage.audio {
                output.play_audio(audio.clone());
            }
            PlaybackState::Menu { node }
        }
        NodeKind::Story => {
            if let Some(audio) = &stage.audio {
                output.play_audio(audio.clone());
            }
            PlaybackState::Story {
                node,
                paused: false,
            }
        }
        NodeKind::Unknown => {
            output.set_fault(NavigationFault::UnknownNodeKind {
                uuid: stage.uuid.clone(),
            });
            PlaybackState::Unknown { node }
        }
    }
}

fn follow(
    pack: &StoryPack,
    transition: Transition,
    output: &mut Output,
) -> Option<PlaybackState> {
    target_state_of(pack, transition, transition.selected_index, output)
}

/// Home transition if present, else exit to the pack list.
fn leave_home(pack: &StoryPack, node: usize, output: &mut Output) -> PlaybackState {
    pack.stage(node)
        .and_then(|stage| stage.home_transition)
        .and_then(|transition| follow(pack, transition, output))
        .unwrap_or(PlaybackState::PackList)
}

fn step_option_tile(
    pack: &StoryPack,
    node: usize,
    menu: Option<usize>,
    event: InputEvent,
    output: &mut Output,
) -> Option<PlaybackState> {
    match event {
        InputEvent::Tap => {
            if let Some(audio) = pack.stage(node).and_then(|s| s.audio.clone()) {
                output.play_audio(audio);
            }
            None
        }
        InputEvent::LongPress => {
            let transition = pack.stage(node)?.ok_transition?;
            follow(pack, transition, output)
        }
        InputEvent::Back => match menu {
            // Forced menu entry: climb back into the menu (which replays
            // its prompt on entry).
            Some(menu) => Some(enter_node(pack, menu, output)),
            None => Some(leave_home(pack, node, output)),
        },
        _ => None,
    }
}

fn step_menu(
    pack: &StoryPack,
    node: usize,
    event: InputEvent,
    output: &mut Output,
) -> Option<PlaybackState> {
    match event {
        InputEvent::SelectOption { index } => {
            let transition = pack.stage(node)?.ok_transition?;
            let child = pack.resolve_at(&transition, index)?;
            // Rendered as a forced tile; descending needs a long press.
            Some(PlaybackState::OptionTile {
                node: child,
                menu: Some(node),
            })
        }
        InputEvent::Back => Some(leave_home(pack, node, output)),
        _ => None,
    }
}

fn step_story(
    pack: &StoryPack,
    node: usize,
    paused: bool,
    event: InputEvent,
    output: &mut Output,
) -> Option<PlaybackState> {
    match event {
        InputEvent::PauseResume => {
            output.toggle_pause();
            Some(PlaybackState::Story {
                node,
                paused: !paused,
            })
        }
        InputEvent::AutoComplete => {
            let stage = pack.stage(node)?;
            if !stage.control_settings.auto_jump_enabled {
                return None;
            }
            // Playback already finished; nothing to stop.
            let transition = stage.ok_transition?;
            follow(pack, transition, output)
        }
        InputEvent::Ok => {
            let stage = pack.stage(node)?;
            if !stage.control_settings.ok_enabled {
                return None;
            }
            output.stop_audio();
            let transition = stage.ok_transition?;
            follow(pack, transition, output)
        }
        InputEvent::Back => {
            output.stop_audio();
            Some(leave_home(pack, node, output))
        }
        _ => None,
    }
}

/// Convenience wrapper owning a pack plus the current state.
///
/// The engine is single-threaded cooperative: one event is processed to
/// completion before the next is accepted. Each navigator is an
/// independent, disposable value.
#[derive(Debug, Clone)]
pub struct Navigator {
    pack: StoryPack,
    state: PlaybackState,
}

impl Navigator {
    /// Wrap a loaded pack. Call [`Navigator::start`] to enter it; until
    /// then (and for the `EMPTY` pack always) the state is the pack list.
    pub fn new(pack: StoryPack) -> Self {
        Self {
            pack,
            state: PlaybackState::PackList,
        }
    }

    /// Enter the pack at its entry node, returning the entry effects.
    /// Re-entering restarts from the top.
    pub fn start(&mut self) -> Output {
        let mut output = Output::new();
        self.state = if self.pack.is_empty() {
            PlaybackState::PackList
        } else {
            enter_node(&self.pack, 0, &mut output)
        };
        output
    }

    /// Process one input event.
    pub fn handle(&mut self, event: InputEvent) -> Output {
        let (state, output) = step(self.state, &self.pack, event);
        self.state = state;
        output
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn pack(&self) -> &StoryPack {
        &self.pack
    }

    /// Kind of the node the current state displays, if any.
    pub fn kind(&self) -> Option<NodeKind> {
        let node = self.state.node()?;
        self.pack.stage(node).map(classify)
    }
}
