//! Mute and delivery-mode state machine.
//!
//! The controller recognises the mode gestures in the raw event stream and
//! reports which transition they ask for. Applying a transition (flushing
//! output, resetting the session) is left to the engine, which owns the
//! pieces involved.

use crate::host::capability;
use crate::key_event::{keyval, modifier, PhysicalKeyEvent};

/// A mode change requested by a gesture or an engine command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    Mute,
    Unmute,
    ToggleMute,
    ToggleImmediate,
}

impl ModeAction {
    /// Map an engine command name (case-insensitive) to a mode change.
    pub fn from_command(command: &str) -> Option<Self> {
        match command.trim().to_ascii_uppercase().as_str() {
            "SUSPEND" => Some(ModeAction::Mute),
            "RESUME" => Some(ModeAction::Unmute),
            "TOGGLE" => Some(ModeAction::ToggleMute),
            _ => None,
        }
    }
}

/// Outcome of the immediate-mode gesture check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Not a gesture
    None,
    /// Part of a gesture: consume the event, nothing to do yet
    Consumed,
    /// Gesture complete: consume the event and apply the action
    Trigger(ModeAction),
}

/// Current mode flags plus the shift tracking used for edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeState {
    pub muted: bool,
    pub immediate: bool,
    pub left_shift: bool,
    pub right_shift: bool,
}

impl ModeState {
    pub fn both_shift(&self) -> bool {
        self.left_shift && self.right_shift
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModeController {
    state: ModeState,
    surrounding_text: bool,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    pub fn is_muted(&self) -> bool {
        self.state.muted
    }

    pub fn is_immediate(&self) -> bool {
        self.state.immediate
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
    }

    pub fn set_immediate(&mut self, immediate: bool) {
        self.state.immediate = immediate;
    }

    /// Record host capabilities; immediate mode needs surrounding text.
    pub fn set_capabilities(&mut self, caps: u32) {
        self.surrounding_text = caps & capability::SURROUNDING_TEXT != 0;
    }

    pub fn supports_surrounding_text(&self) -> bool {
        self.surrounding_text
    }

    /// Hyper-only events select mute states directly (`d`, `e`, `t`).
    ///
    /// Returns `Some` for every hyper-only event, which is always consumed;
    /// the inner action is set when the key selects a transition.
    pub fn hyper_gesture(&self, event: &PhysicalKeyEvent) -> Option<Option<ModeAction>> {
        if event.modifiers != modifier::HYPER {
            return None;
        }
        let action = match event.keyval {
            keyval::LOWER_D => Some(ModeAction::Mute),
            keyval::LOWER_E => Some(ModeAction::Unmute),
            keyval::LOWER_T => Some(ModeAction::ToggleMute),
            _ => None,
        };
        Some(action)
    }

    /// Track both shift keys; releasing either while both were held toggles
    /// mute.
    pub fn track_shift(&mut self, event: &PhysicalKeyEvent) -> Option<ModeAction> {
        let was_both = self.state.both_shift();
        match event.keyval {
            keyval::SHIFT_L => self.state.left_shift = event.is_press,
            keyval::SHIFT_R => self.state.right_shift = event.is_press,
            _ => return None,
        }
        if was_both && !self.state.both_shift() {
            Some(ModeAction::ToggleMute)
        } else {
            None
        }
    }

    /// Control+Tab toggles immediate mode on release, when the host can
    /// delete surrounding text.
    pub fn immediate_gesture(&self, event: &PhysicalKeyEvent) -> Gesture {
        if !self.surrounding_text
            || event.keyval != keyval::TAB
            || event.modifiers & modifier::CONTROL == 0
        {
            return Gesture::None;
        }
        if event.is_press {
            Gesture::Consumed
        } else {
            Gesture::Trigger(ModeAction::ToggleImmediate)
        }
    }
}
