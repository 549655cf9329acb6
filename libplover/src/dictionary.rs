//! JSON steno dictionaries.
//!
//! A dictionary file is a JSON object mapping outlines to entry text:
//!
//! ```json
//! { "PWAOE/-FL": "beautiful", "KW-GS": "{#Return}" }
//! ```
//!
//! Outlines are parsed into [`Stroke`]s when loaded, so differently written
//! but equivalent keys (`"ST-T"` vs `"STT"`) land on the same entry.

use crate::stroke::{parse_outline, Stroke};
use ahash::AHashMap;
use libsteno_core::{Result, StenoError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    path: Option<PathBuf>,
    entries: AHashMap<Vec<Stroke>, String>,
    longest_key: usize,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dictionary from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StenoError::Dictionary {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut dict = Self::from_json_str(&content, &path.display().to_string())?;
        dict.path = Some(path.to_path_buf());
        tracing::debug!("loaded {} entries from {}", dict.len(), path.display());
        Ok(dict)
    }

    /// Parse dictionary JSON. `name` is only used in messages.
    pub fn from_json_str(content: &str, name: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(content).map_err(|e| StenoError::Dictionary {
                path: name.to_string(),
                reason: e.to_string(),
            })?;
        let mut dict = Self::new();
        for (outline, text) in raw {
            match parse_outline(&outline) {
                Some(strokes) => dict.insert(strokes, text),
                None => tracing::warn!("{}: skipping invalid outline '{}'", name, outline),
            }
        }
        Ok(dict)
    }

    pub fn insert(&mut self, outline: Vec<Stroke>, text: impl Into<String>) {
        self.longest_key = self.longest_key.max(outline.len());
        self.entries.insert(outline, text.into());
    }

    pub fn lookup(&self, outline: &[Stroke]) -> Option<&str> {
        self.entries.get(outline).map(String::as_str)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of strokes in the longest outline.
    pub fn longest_key(&self) -> usize {
        self.longest_key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dictionaries in priority order; the first one defining an outline wins.
#[derive(Debug, Clone, Default)]
pub struct DictionaryCollection {
    dicts: Vec<Dictionary>,
}

impl DictionaryCollection {
    pub fn new(dicts: Vec<Dictionary>) -> Self {
        Self { dicts }
    }

    /// Load every file, highest priority first. Any failure aborts.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let dicts = paths
            .iter()
            .map(Dictionary::load_json)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(dicts))
    }

    pub fn lookup(&self, outline: &[Stroke]) -> Option<&str> {
        self.dicts.iter().find_map(|d| d.lookup(outline))
    }

    pub fn longest_key(&self) -> usize {
        self.dicts.iter().map(Dictionary::longest_key).max().unwrap_or(0)
    }

    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(text: &str) -> Vec<Stroke> {
        parse_outline(text).unwrap()
    }

    #[test]
    fn test_from_json() {
        let dict = Dictionary::from_json_str(
            r#"{"PWAOE/-FL": "beautiful", "KAT": "cat", "nonsense!": "x"}"#,
            "test",
        )
        .unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.longest_key(), 2);
        assert_eq!(dict.lookup(&outline("KAT")), Some("cat"));
        assert_eq!(dict.lookup(&outline("PWAOE/-FL")), Some("beautiful"));
        assert_eq!(dict.lookup(&outline("PWAOE")), None);
    }

    #[test]
    fn test_equivalent_spellings_share_entry() {
        let dict = Dictionary::from_json_str(r#"{"ST-T": "stet"}"#, "test").unwrap();
        assert_eq!(dict.lookup(&outline("STT")), Some("stet"));
        assert_eq!(dict.lookup(&[Stroke::from_keys(["S-", "T-", "-T"]).unwrap()]), Some("stet"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = Dictionary::from_json_str("[1, 2]", "broken.json").unwrap_err();
        match err {
            StenoError::Dictionary { path, .. } => assert_eq!(path, "broken.json"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_collection_priority() {
        let mut user = Dictionary::new();
        user.insert(outline("KAT"), "Cat");
        let mut main = Dictionary::new();
        main.insert(outline("KAT"), "cat");
        main.insert(outline("TKOG"), "dog");
        main.insert(outline("A/KAT"), "a cat");

        let dicts = DictionaryCollection::new(vec![user, main]);
        assert_eq!(dicts.lookup(&outline("KAT")), Some("Cat"));
        assert_eq!(dicts.lookup(&outline("TKOG")), Some("dog"));
        assert_eq!(dicts.longest_key(), 2);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join(format!("plover_missing_{}.json", std::process::id()));
        let err = Dictionary::load_json(&path).unwrap_err();
        assert!(matches!(err, StenoError::Dictionary { .. }));
    }
}
