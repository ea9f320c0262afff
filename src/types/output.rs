//! Output from a navigation step.
//!
//! The engine never touches audio or UI itself; it describes the desired
//! side effects here and the host performs them. This keeps the state
//! machine deterministic and unit-testable without real I/O.

use crate::error::NavigationFault;
use crate::types::graph::AssetRef;
use serde::{Deserialize, Serialize};

/// Side effects requested from the host, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Start playing an audio resource.
    PlayAudio { asset: AssetRef },
    /// Stop the currently playing audio, if any.
    StopAudio,
    /// Toggle the pause state of the current audio handle.
    TogglePause,
}

/// Result of handling one input event (or of entering the initial state).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Output {
    /// Side effects for the host to perform, in order.
    pub effects: Vec<Effect>,
    /// Non-fatal condition for the renderer to surface.
    pub fault: Option<NavigationFault>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play_audio(&mut self, asset: AssetRef) {
        self.effects.push(Effect::PlayAudio { asset });
    }

    pub fn stop_audio(&mut self) {
        self.effects.push(Effect::StopAudio);
    }

    pub fn toggle_pause(&mut self) {
        self.effects.push(Effect::TogglePause);
    }

    pub fn set_fault(&mut self, fault: NavigationFault) {
        self.fault = Some(fault);
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    /// True when the step changed nothing observable.
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty() && self.fault.is_none()
    }
}
