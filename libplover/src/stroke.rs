//! Steno strokes in canonical key order.
//!
//! A [`Stroke`] is a bitmask over the 23 keys of the steno keyboard, so two
//! strokes with the same keys are equal no matter how they were written.
//! Text form is RTF/CRE: left-bank keys, vowels and star, then right-bank
//! keys, with a hyphen separating the banks when no vowel or star is present.

use libsteno_core::{Chord, Result, StenoError};
use std::fmt;
use std::str::FromStr;

/// Steno keys in canonical order.
pub const STENO_KEYS: [&str; 23] = [
    "#", "S-", "T-", "K-", "P-", "W-", "H-", "R-", "A-", "O-", "*", "-E", "-U", "-F", "-R", "-P",
    "-B", "-L", "-G", "-T", "-S", "-D", "-Z",
];

const NUMBER_BAR: usize = 0;
/// First and last index of the vowel/star group.
const MIDDLE: (usize, usize) = (8, 12);
const FIRST_RIGHT: usize = 13;

/// Digit written for a key when the number bar is held.
fn digit(index: usize) -> Option<char> {
    match index {
        1 => Some('1'),
        2 => Some('2'),
        4 => Some('3'),
        6 => Some('4'),
        8 => Some('5'),
        9 => Some('0'),
        13 => Some('6'),
        15 => Some('7'),
        17 => Some('8'),
        19 => Some('9'),
        _ => None,
    }
}

fn letter(index: usize) -> char {
    STENO_KEYS[index]
        .trim_matches('-')
        .chars()
        .next()
        .unwrap_or('#')
}

fn is_middle(index: usize) -> bool {
    (MIDDLE.0..=MIDDLE.1).contains(&index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Stroke(u32);

impl Stroke {
    /// Stroke made of the given key labels (`"S-"`, `"*"`, `"-Z"`).
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bits = 0u32;
        for key in keys {
            let key = key.as_ref();
            let index = STENO_KEYS
                .iter()
                .position(|k| *k == key)
                .ok_or_else(|| StenoError::Translate(format!("unknown steno key '{}'", key)))?;
            bits |= 1 << index;
        }
        Ok(Self(bits))
    }

    pub fn from_chord(chord: &Chord) -> Result<Self> {
        Self::from_keys(chord.keys().map(|k| k.as_str()))
    }

    /// The lone asterisk, used for corrections.
    pub fn star() -> Self {
        Self(1 << 10)
    }

    pub fn is_star(&self) -> bool {
        *self == Self::star()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn has(&self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }

    /// Labels of the keys in this stroke, in steno order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        (0..STENO_KEYS.len())
            .filter(|&i| self.has(i))
            .map(|i| STENO_KEYS[i])
    }

    /// Parse RTF/CRE text such as `"STKPW"`, `"-T"`, `"PHO*EU"` or `"1-9"`.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        let mut bits = 0u32;
        let mut next = 1usize;
        for ch in text.chars() {
            match ch {
                '#' => bits |= 1 << NUMBER_BAR,
                '-' => {
                    if next > FIRST_RIGHT {
                        return None;
                    }
                    next = FIRST_RIGHT;
                }
                _ => {
                    let found = (next..STENO_KEYS.len()).find(|&i| {
                        letter(i) == ch || (ch.is_ascii_digit() && digit(i) == Some(ch))
                    })?;
                    if ch.is_ascii_digit() {
                        bits |= 1 << NUMBER_BAR;
                    }
                    bits |= 1 << found;
                    next = found + 1;
                }
            }
        }
        if bits == 0 {
            return None;
        }
        Some(Self(bits))
    }

    /// RTF/CRE rendering.
    pub fn rtfcre(&self) -> String {
        let numbers = self.has(NUMBER_BAR)
            && (1..STENO_KEYS.len()).any(|i| self.has(i) && digit(i).is_some());
        let mut out = String::new();
        if self.has(NUMBER_BAR) && !numbers {
            out.push('#');
        }
        let mut middle = false;
        for index in 1..STENO_KEYS.len() {
            if !self.has(index) {
                continue;
            }
            if is_middle(index) {
                middle = true;
            }
            if index >= FIRST_RIGHT && !middle {
                out.push('-');
                middle = true;
            }
            let shown = if numbers {
                digit(index).unwrap_or_else(|| letter(index))
            } else {
                letter(index)
            };
            out.push(shown);
        }
        out
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rtfcre())
    }
}

impl FromStr for Stroke {
    type Err = StenoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| StenoError::Translate(format!("invalid stroke '{}'", s)))
    }
}

/// Parse a `/`-separated outline like `"PWAOE/-FL"`.
pub fn parse_outline(text: &str) -> Option<Vec<Stroke>> {
    text.split('/').map(Stroke::parse).collect()
}

pub fn outline_to_string(outline: &[Stroke]) -> String {
    outline
        .iter()
        .map(Stroke::rtfcre)
        .collect::<Vec<_>>()
        .join("/")
}
