//! Chord assembly from individual key presses and releases.
//!
//! A chord starts with the first steno key press and completes when every
//! held key has been released. Keys pressed while others are still held
//! ("rolling" timing) join the same chord.

use ahash::AHashSet;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Canonical label of one steno keyboard position (e.g. `"S-"`, `"*"`, `"-Z"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StenoKey(Arc<str>);

impl StenoKey {
    pub fn new(label: &str) -> Self {
        Self(Arc::from(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StenoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StenoKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// The set of keys that took part in one completed stroke.
///
/// Keys are kept sorted by label only so that chords compare and print
/// deterministically; steno order is the translator's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Chord {
    keys: BTreeSet<StenoKey>,
}

impl Chord {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<StenoKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &StenoKey> {
        self.keys.iter()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.keys.iter().any(|k| k.as_str() == label)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.keys.iter().map(StenoKey::as_str).collect();
        write!(f, "{{{}}}", labels.join(","))
    }
}

/// Tracks held and contributing keys for the chord being formed.
///
/// Invariant: `contributing ⊇ pressed`. Both are empty between strokes.
#[derive(Debug, Clone, Default)]
pub struct ChordAssembler {
    pressed: AHashSet<StenoKey>,
    contributing: AHashSet<StenoKey>,
}

impl ChordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while at least one steno key is physically held.
    pub fn is_forming(&self) -> bool {
        !self.pressed.is_empty()
    }

    pub fn is_pressed(&self, key: &StenoKey) -> bool {
        self.pressed.contains(key)
    }

    pub fn on_press(&mut self, key: StenoKey) {
        self.contributing.insert(key.clone());
        self.pressed.insert(key);
    }

    /// Release a key. Returns the completed chord when the last held key
    /// goes up; releases of keys not held are ignored.
    pub fn on_release(&mut self, key: &StenoKey) -> Option<Chord> {
        if !self.pressed.remove(key) {
            return None;
        }
        if !self.pressed.is_empty() {
            return None;
        }
        let keys = std::mem::take(&mut self.contributing);
        Some(Chord {
            keys: keys.into_iter().collect(),
        })
    }

    /// Snapshot of every key contributing so far, for previews.
    pub fn preview(&self) -> Chord {
        Chord {
            keys: self.contributing.iter().cloned().collect(),
        }
    }
}
