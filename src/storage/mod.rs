// Storage module - Key-value persistence for presets and settings
//
// Everything lives under a handful of string keys holding JSON values.
// A missing key always means "use defaults".

pub mod presets;
pub mod settings;
pub mod store;

pub use presets::{
    CHORDS_PRESETS_KEY, ChordsPreset, METRONOME_PRESETS_KEY, MetronomePreset, Preset,
    PresetLibrary,
};
pub use settings::{
    CHORDS_SETTINGS_KEY, ChordSettings, THEME_KEY, ThemeMode, load_chord_settings, load_theme,
    save_chord_settings, save_theme,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, read_json, write_json};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid preset: {0}")]
    InvalidPreset(String),
}
