//! Rendering of dictionary entries.
//!
//! Entry text is plain words mixed with `{...}` meta commands:
//!
//! - `{^}` attaches the neighbouring words, `{^ing}` / `{re^}` attach a
//!   suffix or prefix
//! - `{#Return}` presses a named key
//! - `{PLOVER:TOGGLE}` runs an engine command
//!
//! Words are separated by one space unless attached. All text of an entry
//! is emitted as one run, so one translation fills one preedit fragment.

/// One side effect of a rendered entry, in entry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Text(String),
    KeyCombination(String),
    EngineCommand(String),
}

/// A rendered entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub actions: Vec<Action>,
    /// The next translation attaches without a space.
    pub attach_next: bool,
}

impl Rendered {
    /// All emitted text, concatenated.
    pub fn text(&self) -> String {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

enum Atom<'a> {
    Word(&'a str),
    Meta(&'a str),
}

fn atoms(entry: &str) -> Vec<Atom<'_>> {
    let mut atoms = Vec::new();
    let mut rest = entry;
    while !rest.is_empty() {
        match rest.find('{') {
            Some(open) => {
                atoms.extend(rest[..open].split_whitespace().map(Atom::Word));
                match rest[open..].find('}') {
                    Some(close) => {
                        atoms.push(Atom::Meta(&rest[open + 1..open + close]));
                        rest = &rest[open + close + 1..];
                    }
                    None => {
                        // Unterminated brace: keep it as text.
                        atoms.extend(rest[open..].split_whitespace().map(Atom::Word));
                        rest = "";
                    }
                }
            }
            None => {
                atoms.extend(rest.split_whitespace().map(Atom::Word));
                rest = "";
            }
        }
    }
    atoms
}

/// Text of one entry is a single action, placed where its first word is.
fn push_text(actions: &mut Vec<Action>, text: String) {
    if text.is_empty() {
        return;
    }
    let existing = actions.iter_mut().find_map(|a| match a {
        Action::Text(t) => Some(t),
        _ => None,
    });
    match existing {
        Some(run) => run.push_str(&text),
        None => actions.push(Action::Text(text)),
    }
}

/// Render `entry` following a translation whose `attach_next` was `attach`.
pub fn render(entry: &str, attach: bool) -> Rendered {
    let mut actions = Vec::new();
    let mut attach = attach;
    for atom in atoms(entry) {
        match atom {
            Atom::Word(word) => {
                let sep = if attach { "" } else { " " };
                push_text(&mut actions, format!("{}{}", sep, word));
                attach = false;
            }
            Atom::Meta(meta) => {
                if let Some(name) = meta.strip_prefix('#') {
                    actions.push(Action::KeyCombination(name.trim().to_string()));
                } else if let Some(command) = meta.strip_prefix("PLOVER:") {
                    actions.push(Action::EngineCommand(command.trim().to_uppercase()));
                } else {
                    let left = meta.starts_with('^');
                    let right = meta.len() > 1 && meta.ends_with('^');
                    let inner = meta.trim_start_matches('^').trim_end_matches('^');
                    if inner.is_empty() {
                        // {^}, {^^}
                        attach = true;
                        continue;
                    }
                    let sep = if attach || left { "" } else { " " };
                    push_text(&mut actions, format!("{}{}", sep, inner));
                    attach = right;
                }
            }
        }
    }
    Rendered {
        actions,
        attach_next: attach,
    }
}
