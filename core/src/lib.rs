//! libsteno-core
//!
//! Steno input-method core: turns physical key events into chords, hands
//! completed chords to a translator and manages the correctable preedit
//! window shown to the user before text is committed.
//!
//! The translator (dictionary lookup, formatting) is supplied by the caller
//! through the [`Translator`] trait; the input-method framework through the
//! [`Host`] trait.
//!
//! Public API:
//! - `StenoEngine` - Key event router, the entry point for host adapters
//! - `ChordAssembler` - Held/contributing key tracking and chord detection
//! - `KeycodeMapper` - Physical keycode → steno key tables
//! - `OutputBuffer` - Bounded preedit window with eviction to commit
//! - `StenoSession` - Stroke framing and translator history resets
//! - `Config` - Configuration loaded from TOML
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Result, StenoError};

pub mod key_event;
pub use key_event::{KeyResult, PhysicalKeyEvent};

pub mod chord;
pub use chord::{Chord, ChordAssembler, StenoKey};

pub mod keymap;
pub use keymap::{KeyboardLayout, KeycodeMapper};

pub mod host;
pub use host::{Host, HostEvent, RecordingHost};

pub mod output;
pub use output::{Output, OutputBuffer, NB_PREEDIT_STROKES};

pub mod translator;
pub use translator::{HistoryReset, Translator};

pub mod session;
pub use session::StenoSession;

pub mod mode;
pub use mode::{ModeAction, ModeController, ModeState};

pub mod engine;
pub use engine::StenoEngine;

/// Engine configuration.
///
/// Translator-specific options (dictionaries, etc.) belong in the translator
/// crate's own config, which flattens this one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Number of fragments kept correctable in the preedit. Also the
    /// translator's min undo length.
    /// Default: 10
    pub preedit_strokes: usize,

    /// Show the forming chord after the preedit text while keys are held.
    pub show_strokes: bool,

    /// Display newlines and a trailing space with visible glyphs.
    pub mark_whitespace: bool,

    /// Start with the alternate keymap active.
    pub alternate_layout: bool,

    /// Steno key → physical key names. Replaces the built-in table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keymap: Option<KeyboardLayout>,

    /// Same as `keymap`, for the alternate table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_keymap: Option<KeyboardLayout>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preedit_strokes: NB_PREEDIT_STROKES,
            show_strokes: false,
            mark_whitespace: false,
            alternate_layout: false,
            keymap: None,
            alt_keymap: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| StenoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.preedit_strokes == 0 {
            return Err(StenoError::Config(
                "preedit_strokes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Utility helpers.
pub mod utils {
    /// Preedit rendering with visible whitespace: newlines become `␍` and a
    /// trailing space becomes `␠`.
    pub fn mark_whitespace(text: &str) -> String {
        let mut shown = text.replace('\n', "\u{240d}");
        if shown.ends_with(' ') {
            shown.pop();
            shown.push('\u{2420}');
        }
        shown
    }
}
