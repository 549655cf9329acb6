//! Error types for the steno core.
//!
//! Only construction (configuration, dictionaries) and translation can fail.
//! Buffer operations and mode changes are total.

use thiserror::Error;

/// Top-level error type shared by the core and translator crates.
#[derive(Error, Debug)]
pub enum StenoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot load dictionary '{path}': {reason}")]
    Dictionary { path: String, reason: String },

    #[error("Translation failed: {0}")]
    Translate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using StenoError
pub type Result<T> = std::result::Result<T, StenoError>;
