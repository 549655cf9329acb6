//! Key event routing.
//!
//! `StenoEngine` is the entry point for the host adapter. Every raw key event
//! goes through the mode gestures first, then the commit/forward keys, then
//! the keymap and chord assembler. Completed chords are handed to the
//! session, which drives the translator and the preedit window.

use crate::chord::{Chord, ChordAssembler};
use crate::error::Result;
use crate::host::Host;
use crate::key_event::{keyval, KeyResult, PhysicalKeyEvent};
use crate::keymap::{in_fence, KeycodeMapper};
use crate::mode::{Gesture, ModeAction, ModeController};
use crate::session::StenoSession;
use crate::translator::Translator;
use crate::Config;

/// Steno input method engine bound to one host.
pub struct StenoEngine<T: Translator, H: Host> {
    mapper: KeycodeMapper,
    chords: ChordAssembler,
    mode: ModeController,
    session: StenoSession<T>,
    host: H,
    show_strokes: bool,
    /// Layout switch requested while a chord was forming
    pending_alternate: Option<bool>,
}

impl<T: Translator, H: Host> StenoEngine<T, H> {
    /// Build an engine from a validated configuration.
    ///
    /// Fails when the configuration is invalid or a configured keymap does
    /// not map any known key.
    pub fn new(config: &Config, translator: T, host: H) -> Result<Self> {
        config.validate()?;
        let mut mapper =
            KeycodeMapper::from_layouts(config.keymap.as_ref(), config.alt_keymap.as_ref())?;
        mapper.set_alternate(config.alternate_layout);
        let session = StenoSession::new(translator, config.preedit_strokes)
            .with_whitespace_marks(config.mark_whitespace);
        tracing::debug!(
            "steno engine ready (preedit_strokes={}, alternate_layout={})",
            config.preedit_strokes,
            config.alternate_layout
        );
        Ok(Self {
            mapper,
            chords: ChordAssembler::new(),
            mode: ModeController::new(),
            session,
            host,
            show_strokes: config.show_strokes,
            pending_alternate: None,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn session(&self) -> &StenoSession<T> {
        &self.session
    }

    pub fn mapper(&self) -> &KeycodeMapper {
        &self.mapper
    }

    pub fn is_muted(&self) -> bool {
        self.mode.is_muted()
    }

    pub fn is_immediate(&self) -> bool {
        self.mode.is_immediate()
    }

    /// True while steno keys are held.
    pub fn is_chord_forming(&self) -> bool {
        self.chords.is_forming()
    }

    /// Process a key event given as raw host fields.
    pub fn process_key_event(&mut self, keyval: u32, keycode: u32, modifiers: u32) -> KeyResult {
        self.process_key(PhysicalKeyEvent::new(keyval, keycode, modifiers))
    }

    /// Process one key event.
    ///
    /// Returns `KeyResult::Handled` if the engine consumed the key, or
    /// `KeyResult::NotHandled` if the host should pass it to the application.
    pub fn process_key(&mut self, event: PhysicalKeyEvent) -> KeyResult {
        tracing::debug!(
            "process_key_event(0x{:04x}, {}, {:04x})",
            event.keyval,
            event.keycode,
            event.modifiers
        );
        let result = KeyResult::from(self.route(&event));
        if result.is_handled() {
            tracing::debug!("handled");
        } else {
            tracing::debug!("forwarded");
        }
        result
    }

    fn route(&mut self, event: &PhysicalKeyEvent) -> bool {
        if let Some(action) = self.mode.hyper_gesture(event) {
            if let Some(action) = action {
                self.apply_mode_action(action);
            }
            return true;
        }

        if let Some(action) = self.mode.track_shift(event) {
            self.apply_mode_action(action);
        }

        if self.mode.is_muted() {
            return self.drain_muted(event);
        }

        if !self.chords.is_forming() {
            if event.has_shortcut_modifiers() {
                return match self.mode.immediate_gesture(event) {
                    Gesture::None => false,
                    Gesture::Consumed => true,
                    Gesture::Trigger(action) => {
                        self.apply_mode_action(action);
                        true
                    }
                };
            }

            if !self.mode.is_immediate() {
                match event.keyval {
                    keyval::SPACE => {
                        if self.session.has_preedit() {
                            self.session.flush(&mut self.host);
                            return true;
                        }
                        return false;
                    }
                    keyval::BACKSPACE => return self.session.has_preedit(),
                    keyval::ESCAPE | keyval::RETURN | keyval::TAB => {
                        self.session.flush(&mut self.host);
                        return false;
                    }
                    _ => {}
                }
            }
        }

        let Some(key) = self.mapper.resolve(event.keycode) else {
            return in_fence(event.keycode)
                && (self.chords.is_forming() || self.session.has_preedit());
        };

        if event.is_press {
            self.chords.on_press(key);
            if self.show_strokes {
                let preview = self.chords.preview();
                self.session.show_stroke(&preview, &mut self.host);
            }
        } else if let Some(chord) = self.chords.on_release(&key) {
            self.complete_chord(chord);
        }
        true
    }

    /// While muted, presses are ignored; releases of keys still held from
    /// before the mute let the chord finish.
    fn drain_muted(&mut self, event: &PhysicalKeyEvent) -> bool {
        if event.is_press || !self.chords.is_forming() {
            return false;
        }
        let Some(key) = self.mapper.resolve(event.keycode) else {
            return false;
        };
        if !self.chords.is_pressed(&key) {
            return false;
        }
        if let Some(chord) = self.chords.on_release(&key) {
            tracing::debug!("finishing chord started before mute");
            self.complete_chord(chord);
            if self.mode.is_muted() {
                self.session.flush(&mut self.host);
            }
        }
        true
    }

    fn complete_chord(&mut self, chord: Chord) {
        let immediate = self.mode.is_immediate();
        match self.session.stroke(&chord, &mut self.host, immediate) {
            Ok(commands) => {
                for command in commands {
                    self.run_engine_command(&command);
                }
            }
            Err(err) => {
                tracing::error!("dropping stroke {}: {}", chord, err);
                self.session.restart(&mut self.host);
            }
        }
        if let Some(enable) = self.pending_alternate.take() {
            self.apply_alternate(enable);
        }
    }

    fn run_engine_command(&mut self, command: &str) {
        match ModeAction::from_command(command) {
            Some(action) => self.apply_mode_action(action),
            None => self.host.run_engine_command(command),
        }
    }

    fn apply_mode_action(&mut self, action: ModeAction) {
        match action {
            ModeAction::Mute => self.mute(),
            ModeAction::Unmute => self.unmute(),
            ModeAction::ToggleMute => {
                if self.mode.is_muted() {
                    self.unmute();
                } else {
                    self.mute();
                }
            }
            ModeAction::ToggleImmediate => self.set_immediate(!self.mode.is_immediate()),
        }
    }

    /// Commit pending output and stop translating.
    pub fn mute(&mut self) {
        tracing::debug!("muting");
        self.session.flush(&mut self.host);
        self.mode.set_muted(true);
    }

    pub fn unmute(&mut self) {
        tracing::debug!("unmuting");
        self.mode.set_muted(false);
    }

    /// Switch between buffered and immediate delivery. Staged text is
    /// committed and the translator starts over.
    pub fn set_immediate(&mut self, enable: bool) {
        if self.mode.is_immediate() == enable {
            return;
        }
        tracing::debug!("immediate mode {}", enable);
        self.mode.set_immediate(enable);
        self.session.restart(&mut self.host);
    }

    /// Select the alternate keymap. Takes effect once no chord is forming.
    pub fn set_alternate_layout(&mut self, enable: bool) {
        if self.chords.is_forming() {
            tracing::debug!("deferring layout switch until chord completes");
            self.pending_alternate = Some(enable);
        } else {
            self.apply_alternate(enable);
        }
    }

    fn apply_alternate(&mut self, enable: bool) {
        if self.mapper.uses_alternate() != enable {
            tracing::debug!("alternate layout {}", enable);
        }
        self.mapper.set_alternate(enable);
    }

    /// Commit everything staged in the preedit.
    pub fn flush(&mut self) {
        self.session.flush(&mut self.host);
    }

    pub fn focus_in(&mut self) {
        tracing::debug!("focus_in");
    }

    pub fn focus_out(&mut self) {
        tracing::debug!("focus_out");
    }

    /// Host reset: drop the preedit and start from start-of-text. Held keys
    /// are left alone.
    pub fn reset(&mut self) {
        tracing::debug!("reset");
        self.session.reset(true, &mut self.host);
    }

    pub fn set_capabilities(&mut self, caps: u32) {
        tracing::debug!("set_capabilities({:x})", caps);
        self.mode.set_capabilities(caps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{capability, HostEvent, RecordingHost};
    use crate::key_event::modifier;
    use crate::output::Output;
    use crate::translator::HistoryReset;

    /// Emits each chord's label; `-D` asks for a named engine command.
    #[derive(Default)]
    struct EchoTranslator {
        strokes: Vec<String>,
    }

    impl Translator for EchoTranslator {
        type Tail = String;

        fn translate(&mut self, chord: &Chord, output: &mut dyn Output) -> crate::Result<()> {
            let label = self.describe(chord);
            if chord.contains("-D") {
                output.run_engine_command("LOOKUP");
            } else {
                output.append_text(&label);
            }
            self.strokes.push(label);
            Ok(())
        }

        fn history_tail(&self) -> Option<String> {
            self.strokes.last().cloned()
        }

        fn set_history(&mut self, _reset: HistoryReset<String>) {}

        fn set_min_undo_length(&mut self, _strokes: usize) {}
    }

    fn engine() -> StenoEngine<EchoTranslator, RecordingHost> {
        StenoEngine::new(&Config::default(), EchoTranslator::default(), RecordingHost::new())
            .unwrap()
    }

    fn press(engine: &mut StenoEngine<EchoTranslator, RecordingHost>, keycode: u32) -> KeyResult {
        engine.process_key(PhysicalKeyEvent::press(0x61, keycode))
    }

    fn release(engine: &mut StenoEngine<EchoTranslator, RecordingHost>, keycode: u32) -> KeyResult {
        engine.process_key(PhysicalKeyEvent::release(0x61, keycode))
    }

    #[test]
    fn test_chord_reaches_translator() {
        let mut engine = engine();
        assert!(press(&mut engine, 16).is_handled());
        assert!(press(&mut engine, 17).is_handled());
        assert!(release(&mut engine, 16).is_handled());
        assert!(engine.is_chord_forming());
        assert!(release(&mut engine, 17).is_handled());

        assert_eq!(engine.session().translator().strokes, vec!["ST"]);
        assert_eq!(engine.host().preedit.as_deref(), Some("ST"));
    }

    #[test]
    fn test_shortcut_modifiers_forwarded() {
        let mut engine = engine();
        let ctrl_s = PhysicalKeyEvent::press(0x73, 31).with_modifiers(modifier::CONTROL);
        assert_eq!(engine.process_key(ctrl_s), KeyResult::NotHandled);
        assert!(!engine.is_chord_forming());
    }

    #[test]
    fn test_unknown_engine_command_goes_to_host() {
        let mut engine = engine();
        press(&mut engine, 26);
        release(&mut engine, 26);
        assert_eq!(
            engine.host().events.last(),
            Some(&HostEvent::EngineCommand("LOOKUP".into()))
        );
    }

    #[test]
    fn test_raw_fields_decode_release_bit() {
        let mut engine = engine();
        engine.process_key_event(0x71, 16, 0);
        assert!(engine.is_chord_forming());
        engine.process_key_event(0x71, 16, modifier::RELEASE);
        assert!(!engine.is_chord_forming());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            preedit_strokes: 0,
            ..Config::default()
        };
        let result = StenoEngine::new(&config, EchoTranslator::default(), RecordingHost::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_capabilities_recorded() {
        let mut engine = engine();
        engine.set_capabilities(capability::SURROUNDING_TEXT);
        let ctrl_tab = PhysicalKeyEvent::release(keyval::TAB, 15).with_modifiers(modifier::CONTROL);
        assert!(engine.process_key(ctrl_tab).is_handled());
        assert!(engine.is_immediate());
    }
}
