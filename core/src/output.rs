//! Formatter output targets and the correctable preedit window.
//!
//! The translator writes through the [`Output`] trait. Two concrete targets
//! exist and the session picks one per stroke from the delivery mode:
//!
//! - [`Buffered`]: text is staged in an [`OutputBuffer`] and shown as
//!   preedit, so later strokes can still retract it with backspaces.
//! - [`Immediate`]: text goes straight to the host and corrections become
//!   surrounding-text deletions.

use crate::host::Host;
use crate::key_event::resolve_key_combination;
use std::collections::VecDeque;

/// Default number of fragments kept correctable in the preedit.
pub const NB_PREEDIT_STROKES: usize = 10;

/// Callbacks a translator uses to emit its output.
pub trait Output {
    /// Emit text after everything emitted so far.
    fn append_text(&mut self, text: &str);

    /// Retract the last `count` characters of emitted text.
    fn delete_backward(&mut self, count: usize);

    /// Inject a named key (e.g. `"Return"`) into the application.
    fn run_key_combination(&mut self, combo: &str);

    /// Ask the engine to run a command (e.g. `"TOGGLE"`).
    fn run_engine_command(&mut self, command: &str);
}

/// Bounded sliding window of pending text fragments.
///
/// Fragments past `capacity` are evicted from the head and collected for
/// commit at the end of the current stroke.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    fragments: VecDeque<String>,
    capacity: usize,
    /// Text evicted during the current stroke, oldest first
    evicted: String,
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            fragments: VecDeque::with_capacity(capacity + 1),
            capacity,
            evicted: String::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    /// Concatenation of all fragments, i.e. the preedit text.
    pub fn text(&self) -> String {
        self.fragments.iter().map(String::as_str).collect()
    }

    /// Text evicted since the last `stroke_start`.
    pub fn evicted(&self) -> &str {
        &self.evicted
    }

    pub fn append(&mut self, text: &str) {
        self.fragments.push_back(text.to_string());
        if self.fragments.len() > self.capacity {
            if let Some(head) = self.fragments.pop_front() {
                tracing::debug!("preedit window full, committing '{}'", head);
                self.evicted.push_str(&head);
            }
        }
    }

    /// Remove up to `count` characters from the tail. Whole fragments are
    /// dropped while they fit in the remainder; a longer fragment is
    /// truncated in place. Anything left once the buffer is empty is
    /// discarded.
    pub fn delete_back(&mut self, count: usize) {
        let mut remaining = count;
        while remaining > 0 {
            let Some(last) = self.fragments.back_mut() else {
                break;
            };
            let len = last.chars().count();
            if len <= remaining {
                self.fragments.pop_back();
                remaining -= len;
            } else {
                let keep = len - remaining;
                let cut = last
                    .char_indices()
                    .nth(keep)
                    .map(|(i, _)| i)
                    .unwrap_or(last.len());
                last.truncate(cut);
                remaining = 0;
            }
        }
        if remaining > 0 {
            tracing::debug!("ignoring {} backspace(s) past start of preedit", remaining);
        }
    }

    /// Drop all fragments and pending evictions without committing.
    pub fn clear(&mut self) {
        self.fragments.clear();
        self.evicted.clear();
    }

    pub fn stroke_start(&mut self) {
        self.evicted.clear();
    }

    /// Deliver evicted text, then show the remaining preedit or hide it.
    pub fn stroke_end<H: Host + ?Sized>(&mut self, host: &mut H, mark_whitespace: bool) {
        if !self.evicted.is_empty() {
            let text = std::mem::take(&mut self.evicted);
            host.commit_text(&text);
        }
        self.redisplay(host, mark_whitespace);
    }

    /// Commit every fragment as one unit and hide the preedit.
    pub fn flush<H: Host + ?Sized>(&mut self, host: &mut H) {
        let mut text = std::mem::take(&mut self.evicted);
        text.extend(self.fragments.drain(..));
        if !text.is_empty() {
            tracing::debug!("flushing preedit '{}'", text);
            host.commit_text(&text);
        }
        host.display_preedit(None);
    }

    pub fn redisplay<H: Host + ?Sized>(&self, host: &mut H, mark_whitespace: bool) {
        if self.is_empty() {
            host.display_preedit(None);
            return;
        }
        let text = self.text();
        if mark_whitespace {
            let shown = crate::utils::mark_whitespace(&text);
            tracing::debug!("updating preedit text: {}", shown);
            host.display_preedit(Some(&shown));
        } else {
            tracing::debug!("updating preedit text: {}", text);
            host.display_preedit(Some(&text));
        }
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(NB_PREEDIT_STROKES)
    }
}

fn forward_combination<H: Host + ?Sized>(host: &mut H, combo: &str) {
    match resolve_key_combination(combo) {
        Some((keyval, keycode)) => host.forward_key_event(keyval, keycode, 0),
        None => tracing::warn!("unsupported key combination: {}", combo),
    }
}

/// Output target staging text in the preedit window.
pub struct Buffered<'a, H: Host + ?Sized> {
    buffer: &'a mut OutputBuffer,
    host: &'a mut H,
    commands: &'a mut Vec<String>,
}

impl<'a, H: Host + ?Sized> Buffered<'a, H> {
    pub fn new(buffer: &'a mut OutputBuffer, host: &'a mut H, commands: &'a mut Vec<String>) -> Self {
        Self {
            buffer,
            host,
            commands,
        }
    }
}

impl<H: Host + ?Sized> Output for Buffered<'_, H> {
    fn append_text(&mut self, text: &str) {
        tracing::debug!("append_text({:?})", text);
        self.buffer.append(text);
    }

    fn delete_backward(&mut self, count: usize) {
        tracing::debug!("delete_backward({})", count);
        self.buffer.delete_back(count);
    }

    fn run_key_combination(&mut self, combo: &str) {
        tracing::debug!("run_key_combination({})", combo);
        forward_combination(&mut *self.host, combo);
    }

    fn run_engine_command(&mut self, command: &str) {
        tracing::debug!("run_engine_command({})", command);
        self.commands.push(command.to_string());
    }
}

/// Output target committing straight to the host.
pub struct Immediate<'a, H: Host + ?Sized> {
    host: &'a mut H,
    commands: &'a mut Vec<String>,
}

impl<'a, H: Host + ?Sized> Immediate<'a, H> {
    pub fn new(host: &'a mut H, commands: &'a mut Vec<String>) -> Self {
        Self { host, commands }
    }
}

impl<H: Host + ?Sized> Output for Immediate<'_, H> {
    fn append_text(&mut self, text: &str) {
        tracing::debug!("append_text({:?}) [immediate]", text);
        self.host.commit_text(text);
    }

    fn delete_backward(&mut self, count: usize) {
        tracing::debug!("delete_backward({}) [immediate]", count);
        self.host.delete_surrounding(count);
    }

    fn run_key_combination(&mut self, combo: &str) {
        forward_combination(&mut *self.host, combo);
    }

    fn run_engine_command(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }
}
