// Settings - Last-used chord configuration and theme

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::StorageError;
use super::store::{KeyValueStore, read_json, write_json};
use crate::chords::params::ChordPlayParams;
use crate::chords::selector::ChordSelection;
use crate::chords::theory::{ChordQuality, PitchClass, Tension};
use crate::sequencer::tempo::{TempoMode, clamp_bpm};

pub const CHORDS_SETTINGS_KEY: &str = "chords:settings";
pub const THEME_KEY: &str = "metronome:theme";

/// Chord configuration screen state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordSettings {
    pub bpm: u16,
    pub notes: Vec<PitchClass>,
    pub chords: Vec<ChordQuality>,
    pub tensions: Vec<Tension>,
}

impl Default for ChordSettings {
    fn default() -> Self {
        let selection = ChordSelection::all();
        Self {
            bpm: TempoMode::Chords.default_bpm(),
            notes: selection.notes,
            chords: selection.chords,
            tensions: selection.tensions,
        }
    }
}

impl ChordSettings {
    pub fn selection(&self) -> ChordSelection {
        ChordSelection::new(self.notes.clone(), self.chords.clone(), self.tensions.clone())
    }

    pub fn set_selection(&mut self, selection: ChordSelection) {
        self.notes = selection.notes;
        self.chords = selection.chords;
        self.tensions = selection.tensions;
    }

    pub fn play_params(&self) -> ChordPlayParams {
        ChordPlayParams::new(self.bpm as i32, self.selection())
    }

    /// Leave the configuration screen for play mode
    ///
    /// Needs at least one note and one quality. The settings are persisted
    /// (a failed write is only logged) and the play parameters returned.
    pub fn start_play(&self, store: &mut dyn KeyValueStore) -> Option<ChordPlayParams> {
        let params = self.play_params();
        if !params.selection.is_playable() {
            log::info!("Select at least one note and one chord to start");
            return None;
        }

        if let Err(e) = save_chord_settings(store, self) {
            log::warn!("Failed to save chord settings: {}", e);
        }
        Some(params)
    }
}

/// Stored chord settings, or the defaults when absent or unreadable
pub fn load_chord_settings(store: &dyn KeyValueStore) -> ChordSettings {
    match read_json::<ChordSettings>(store, CHORDS_SETTINGS_KEY) {
        Ok(Some(mut settings)) => {
            settings.bpm = clamp_bpm(TempoMode::Chords, settings.bpm as i32);
            settings
        }
        Ok(None) => ChordSettings::default(),
        Err(e) => {
            log::warn!("Failed to load chord settings: {}", e);
            ChordSettings::default()
        }
    }
}

pub fn save_chord_settings(
    store: &mut dyn KeyValueStore,
    settings: &ChordSettings,
) -> Result<(), StorageError> {
    write_json(store, CHORDS_SETTINGS_KEY, settings)
}

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
    Auto,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "auto" => Ok(ThemeMode::Auto),
            other => Err(StorageError::InvalidValue(format!("theme '{}'", other))),
        }
    }
}

pub fn load_theme(store: &dyn KeyValueStore) -> ThemeMode {
    match read_json::<ThemeMode>(store, THEME_KEY) {
        Ok(theme) => theme.unwrap_or_default(),
        Err(e) => {
            log::warn!("Failed to load theme: {}", e);
            ThemeMode::default()
        }
    }
}

pub fn save_theme(store: &mut dyn KeyValueStore, theme: ThemeMode) -> Result<(), StorageError> {
    write_json(store, THEME_KEY, &theme)
}
