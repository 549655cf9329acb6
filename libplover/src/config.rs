//! Plover-specific configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All engine options from `libsteno_core::Config` (flattened via serde)
//! - The dictionary files to load, highest priority first
//!
//! # Example
//!
//! ```rust
//! use libplover::PloverConfig;
//!
//! let config = PloverConfig::from_toml_str(r#"
//! preedit_strokes = 5
//! dictionaries = ["user.json", "main.json"]
//! "#).unwrap();
//! assert_eq!(config.base.preedit_strokes, 5);
//! assert_eq!(config.dictionaries.len(), 2);
//! ```

use libsteno_core::{Config, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PloverConfig {
    /// Engine configuration (preedit size, keymaps, display options)
    #[serde(flatten)]
    pub base: Config,

    /// JSON dictionaries; the first one defining an outline wins
    #[serde(default)]
    pub dictionaries: Vec<PathBuf>,
}

impl PloverConfig {
    /// Load configuration from a TOML file.
    ///
    /// Relative dictionary paths are taken relative to the file's directory.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            for dict in &mut config.dictionaries {
                if dict.is_relative() {
                    *dict = dir.join(&*dict);
                }
            }
        }
        config.base.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn into_base(self) -> Config {
        self.base
    }

    pub fn base(&self) -> &Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Config {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsteno_core::StenoError;

    #[test]
    fn test_defaults() {
        let config = PloverConfig::from_toml_str("").unwrap();
        assert_eq!(config, PloverConfig::default());
        assert_eq!(config.base.preedit_strokes, 10);
        assert!(config.dictionaries.is_empty());
    }

    #[test]
    fn test_flattened_base_fields() {
        let config = PloverConfig::from_toml_str(
            r#"
show_strokes = true
mark_whitespace = true
dictionaries = ["main.json"]

[keymap]
"S-" = ["a"]
"#,
        )
        .unwrap();
        assert!(config.base.show_strokes);
        assert!(config.base.mark_whitespace);
        assert_eq!(config.dictionaries, vec![PathBuf::from("main.json")]);
        assert_eq!(config.base.keymap.unwrap()["S-"], vec!["a".to_string()]);
    }

    #[test]
    fn test_round_trip() {
        let mut config = PloverConfig::default();
        config.base_mut().preedit_strokes = 3;
        config.dictionaries.push(PathBuf::from("/tmp/main.json"));
        let text = config.to_toml_string().unwrap();
        assert_eq!(PloverConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_resolves_relative_dictionaries() {
        let dir = std::env::temp_dir().join(format!("plover_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("plover.toml");
        std::fs::write(&path, "dictionaries = [\"main.json\", \"/abs/user.json\"]\n").unwrap();

        let config = PloverConfig::load_toml(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(config.dictionaries[0], dir.join("main.json"));
        assert_eq!(config.dictionaries[1], PathBuf::from("/abs/user.json"));
    }

    #[test]
    fn test_load_validates() {
        let path = std::env::temp_dir().join(format!("plover_invalid_{}.toml", std::process::id()));
        std::fs::write(&path, "preedit_strokes = 0\n").unwrap();
        let err = PloverConfig::load_toml(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, StenoError::Config(_)));
    }
}
