//! Host adapter interface.
//!
//! The host is the input-method framework side: it shows preedit text,
//! commits text into the focused application and forwards keys the engine
//! does not want. The engine owns its host and calls it synchronously.

/// Host capability bits, as passed to `StenoEngine::set_capabilities`.
pub mod capability {
    pub const PREEDIT_TEXT: u32 = 1 << 0;
    pub const AUXILIARY_TEXT: u32 = 1 << 1;
    pub const LOOKUP_TABLE: u32 = 1 << 2;
    pub const FOCUS: u32 = 1 << 3;
    pub const PROPERTY: u32 = 1 << 4;
    /// The client can answer surrounding-text queries and delete around the
    /// cursor; required for immediate mode.
    pub const SURROUNDING_TEXT: u32 = 1 << 5;
}

/// Operations the engine needs from the input-method framework.
pub trait Host {
    /// Show `Some(text)` as preedit, or hide the preedit with `None`.
    fn display_preedit(&mut self, text: Option<&str>);

    /// Insert text into the focused application.
    fn commit_text(&mut self, text: &str);

    /// Delete `count` characters before the cursor in the application.
    fn delete_surrounding(&mut self, count: usize);

    /// Send a key event on to the application.
    fn forward_key_event(&mut self, keyval: u32, keycode: u32, modifiers: u32);

    /// Engine command the core does not interpret itself.
    fn run_engine_command(&mut self, command: &str) {
        tracing::debug!("unhandled engine command: {}", command);
    }
}

impl<H: Host + ?Sized> Host for &mut H {
    fn display_preedit(&mut self, text: Option<&str>) {
        (**self).display_preedit(text)
    }

    fn commit_text(&mut self, text: &str) {
        (**self).commit_text(text)
    }

    fn delete_surrounding(&mut self, count: usize) {
        (**self).delete_surrounding(count)
    }

    fn forward_key_event(&mut self, keyval: u32, keycode: u32, modifiers: u32) {
        (**self).forward_key_event(keyval, keycode, modifiers)
    }

    fn run_engine_command(&mut self, command: &str) {
        (**self).run_engine_command(command)
    }
}

/// One call made by the engine into its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Preedit(Option<String>),
    Commit(String),
    DeleteSurrounding(usize),
    ForwardKey {
        keyval: u32,
        keycode: u32,
        modifiers: u32,
    },
    EngineCommand(String),
}

/// Host that records every call and tracks what the user would see.
///
/// Useful for tests and for replaying event scripts: `events` keeps the full
/// call history, `preedit` and `committed` the resulting state.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    /// Every call, in order
    pub events: Vec<HostEvent>,

    /// Currently displayed preedit, if any
    pub preedit: Option<String>,

    /// Text committed to the application so far, after surrounding deletes
    pub committed: String,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded calls, leaving the list empty.
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Last preedit display call, if any.
    pub fn last_preedit_call(&self) -> Option<&Option<String>> {
        self.events.iter().rev().find_map(|e| match e {
            HostEvent::Preedit(text) => Some(text),
            _ => None,
        })
    }

    /// All commit calls in order.
    pub fn commits(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Commit(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn display_preedit(&mut self, text: Option<&str>) {
        self.preedit = text.map(str::to_string);
        self.events.push(HostEvent::Preedit(self.preedit.clone()));
    }

    fn commit_text(&mut self, text: &str) {
        self.committed.push_str(text);
        self.events.push(HostEvent::Commit(text.to_string()));
    }

    fn delete_surrounding(&mut self, count: usize) {
        let keep = self.committed.chars().count().saturating_sub(count);
        self.committed = self.committed.chars().take(keep).collect();
        self.events.push(HostEvent::DeleteSurrounding(count));
    }

    fn forward_key_event(&mut self, keyval: u32, keycode: u32, modifiers: u32) {
        self.events.push(HostEvent::ForwardKey {
            keyval,
            keycode,
            modifiers,
        });
    }

    fn run_engine_command(&mut self, command: &str) {
        self.events.push(HostEvent::EngineCommand(command.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_host_tracks_state() {
        let mut host = RecordingHost::new();
        host.display_preedit(Some("hello"));
        assert_eq!(host.preedit.as_deref(), Some("hello"));

        host.commit_text("héllo world");
        host.delete_surrounding(6);
        assert_eq!(host.committed, "héllo");

        host.display_preedit(None);
        assert_eq!(host.last_preedit_call(), Some(&None));
        assert_eq!(host.commits(), vec!["héllo world"]);
    }

    #[test]
    fn test_take_events() {
        let mut host = RecordingHost::new();
        host.forward_key_event(0x20, 57, 0);
        host.run_engine_command("LOOKUP");
        let events = host.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], HostEvent::EngineCommand("LOOKUP".into()));
        assert!(host.events.is_empty());
    }
}
