//! libplover crate root
//!
//! This crate provides a dictionary-backed steno translator for the shared
//! `libsteno-core` engine: stroke parsing, JSON dictionaries, entry
//! formatting and the undoable translation history.
//!
//! Public API exported here:
//! - `PloverTranslator` and `Translation` from `translator`
//! - `Dictionary` and `DictionaryCollection` from `dictionary`
//! - `Stroke` from `stroke`
//! - `PloverConfig` from `config`
//! - `create_engine` to build a ready engine from a configuration

pub mod config;
pub mod dictionary;
pub mod format;
pub mod replay;
pub mod stroke;
pub mod translator;

// Re-export the engine surface from core so callers need only one crate.
pub use libsteno_core::{
    Chord, Config, Host, HostEvent, KeyResult, PhysicalKeyEvent, RecordingHost, Result,
    StenoEngine, StenoError,
};

pub use config::PloverConfig;
pub use dictionary::{Dictionary, DictionaryCollection};
pub use stroke::Stroke;
pub use translator::{PloverTranslator, Translation};

/// Load the configured dictionaries and build an engine around `host`.
pub fn create_engine<H: Host>(
    config: &PloverConfig,
    host: H,
) -> Result<StenoEngine<PloverTranslator, H>> {
    let dictionaries = DictionaryCollection::load(&config.dictionaries)?;
    tracing::info!(
        "loaded {} dictionaries, longest outline {} strokes",
        dictionaries.dictionaries().len(),
        dictionaries.longest_key()
    );
    StenoEngine::new(&config.base, PloverTranslator::new(dictionaries), host)
}
