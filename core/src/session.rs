//! Stroke orchestration.
//!
//! `StenoSession` owns the translator and the preedit window. One call to
//! [`StenoSession::stroke`] frames a translation: evictions are reset, the
//! translator writes through the delivery target for the current mode, and
//! the host display is brought up to date afterwards.

use crate::chord::Chord;
use crate::error::Result;
use crate::host::Host;
use crate::output::{Buffered, Immediate, OutputBuffer};
use crate::translator::{HistoryReset, Translator};

/// Translator plus preedit window for one input context.
pub struct StenoSession<T: Translator> {
    translator: T,
    buffer: OutputBuffer,
    mark_whitespace: bool,
}

impl<T: Translator> StenoSession<T> {
    /// Create a session whose preedit window holds `capacity` fragments.
    ///
    /// The translator is told to keep the same number of strokes undoable and
    /// starts from a fresh start-of-text history.
    pub fn new(translator: T, capacity: usize) -> Self {
        let mut session = Self {
            translator,
            buffer: OutputBuffer::new(capacity),
            mark_whitespace: false,
        };
        session.reset_history(true);
        session
    }

    pub fn with_whitespace_marks(mut self, enable: bool) -> Self {
        self.mark_whitespace = enable;
        self
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn translator_mut(&mut self) -> &mut T {
        &mut self.translator
    }

    pub fn buffer(&self) -> &OutputBuffer {
        &self.buffer
    }

    /// True while text is staged in the preedit.
    pub fn has_preedit(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Translate one chord. Returns the engine commands the translator asked
    /// for during the stroke, in order.
    ///
    /// On a translator error the preedit window is put back as it was before
    /// the stroke and the host display is left alone; the caller decides how
    /// to recover.
    pub fn stroke<H: Host + ?Sized>(
        &mut self,
        chord: &Chord,
        host: &mut H,
        immediate: bool,
    ) -> Result<Vec<String>> {
        tracing::debug!("stroke({})", chord);
        let mut commands = Vec::new();
        self.buffer.stroke_start();
        let snapshot = self.buffer.clone();
        let translated = if immediate {
            let mut output = Immediate::new(&mut *host, &mut commands);
            self.translator.translate(chord, &mut output)
        } else {
            let mut output = Buffered::new(&mut self.buffer, &mut *host, &mut commands);
            self.translator.translate(chord, &mut output)
        };
        if let Err(err) = translated {
            tracing::debug!("restoring preedit after failed stroke");
            self.buffer = snapshot;
            return Err(err);
        }
        self.buffer.stroke_end(host, self.mark_whitespace);
        Ok(commands)
    }

    /// Commit all staged text, hide the preedit and soft-reset the history.
    pub fn flush<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.buffer.flush(host);
        self.reset_history(false);
    }

    /// Commit all staged text, then start over from start-of-text.
    pub fn restart<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.buffer.flush(host);
        self.reset_history(true);
    }

    /// Re-seed the translator history and drop the preedit.
    ///
    /// A full reset (or one with no history to carry) starts from the
    /// start-of-text sentinel; otherwise the last translation is kept so
    /// spacing continues naturally.
    pub fn reset<H: Host + ?Sized>(&mut self, full: bool, host: &mut H) {
        self.reset_history(full);
        tracing::debug!("reset output");
        self.buffer.clear();
        host.display_preedit(None);
    }

    fn reset_history(&mut self, full: bool) {
        tracing::debug!("reset steno state (full={})", full);
        let tail = if full {
            None
        } else {
            self.translator.history_tail()
        };
        match tail {
            Some(tail) => self.translator.set_history(HistoryReset::CarryForward(tail)),
            None => {
                self.translator.set_history(HistoryReset::StartOfText);
                self.translator.set_min_undo_length(self.buffer.capacity());
            }
        }
    }

    /// Label of a forming chord, for previews.
    pub fn describe(&self, chord: &Chord) -> String {
        self.translator.describe(chord)
    }

    /// Show the current preedit followed by the label of the forming chord.
    pub fn show_stroke<H: Host + ?Sized>(&self, chord: &Chord, host: &mut H) {
        let label = self.describe(chord);
        let text = if self.has_preedit() {
            let shown = if self.mark_whitespace {
                crate::utils::mark_whitespace(&self.buffer.text())
            } else {
                self.buffer.text()
            };
            format!("{} {}", shown, label)
        } else {
            label
        };
        host.display_preedit(Some(&text));
    }

    /// Redraw the preedit from the buffer, e.g. after a preview.
    pub fn redisplay<H: Host + ?Sized>(&self, host: &mut H) {
        self.buffer.redisplay(host, self.mark_whitespace);
    }
}
