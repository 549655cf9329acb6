//! Interface to the stroke translator.
//!
//! The translator owns the dictionaries and the translation history. The core
//! only hands it completed chords, decides how its history is reset, and
//! tells it how far back corrections may reach.

use crate::chord::Chord;
use crate::error::Result;
use crate::output::Output;

/// How the translator history is re-seeded by a reset.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryReset<T> {
    /// Start of text: install the translator's boundary sentinel, which lets
    /// the next translation attach without a leading separator.
    StartOfText,
    /// Keep this translation as context for spacing and attachment.
    CarryForward(T),
}

/// A stroke translator, e.g. a dictionary lookup with formatting.
pub trait Translator {
    /// Opaque history element carried across soft resets.
    type Tail: Clone;

    /// Translate one completed chord, emitting output through `output`.
    ///
    /// Corrections of earlier strokes are expressed as
    /// `output.delete_backward(n)` and never reach further back than the
    /// configured min undo length.
    fn translate(&mut self, chord: &Chord, output: &mut dyn Output) -> Result<()>;

    /// Last translation in the history, if any.
    fn history_tail(&self) -> Option<Self::Tail>;

    /// Replace the history wholesale.
    fn set_history(&mut self, reset: HistoryReset<Self::Tail>);

    /// Keep at least `strokes` translations available for correction.
    fn set_min_undo_length(&mut self, strokes: usize);

    /// Human readable label of a (possibly incomplete) chord, used for
    /// stroke previews.
    fn describe(&self, chord: &Chord) -> String {
        chord
            .keys()
            .map(|k| k.as_str().trim_matches('-'))
            .collect()
    }
}
