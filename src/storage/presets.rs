// Presets - Named snapshots of metronome and chord configurations
//
// Each preset kind is a JSON array under its own key, newest first.
// Entries are checked one by one on load; a malformed entry is dropped
// without failing the rest of the list. Out-of-range numbers are clamped.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StorageError;
use super::store::{KeyValueStore, read_json, write_json};
use crate::chords::params::ChordPlayParams;
use crate::chords::selector::ChordSelection;
use crate::chords::theory::{ChordQuality, PitchClass, Tension};
use crate::sequencer::tempo::{TempoConfig, TempoMarking, TempoMode, clamp_bpm};

pub const METRONOME_PRESETS_KEY: &str = "metronome:presets";
pub const CHORDS_PRESETS_KEY: &str = "chords:presets";

/// A persisted preset kind
pub trait Preset: Serialize + DeserializeOwned + Clone {
    /// Key holding the preset list
    const STORAGE_KEY: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Creation time in milliseconds since the Unix epoch
    fn created_at(&self) -> i64;

    /// Pull numeric fields back into their ranges
    fn clamp_values(&mut self);

    /// Identity check beyond what deserialization enforces
    fn validate(&self) -> Result<(), StorageError> {
        if self.id().is_empty() {
            return Err(StorageError::InvalidPreset("Missing preset id".to_string()));
        }
        if self.name().trim().is_empty() {
            return Err(StorageError::InvalidPreset(format!(
                "Preset {} has no name",
                self.id()
            )));
        }
        Ok(())
    }
}

fn new_identity() -> (String, i64) {
    (Uuid::new_v4().to_string(), Utc::now().timestamp_millis())
}

fn clean_name(name: &str) -> Result<String, StorageError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidPreset(
            "Preset name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Saved metronome setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetronomePreset {
    pub id: String,
    pub name: String,
    pub bpm: u16,
    pub beat_per_bar: u8,
    pub click_per_beat: u8,
    pub tempo_name: String,
    pub created_at: i64,
}

impl MetronomePreset {
    /// Snapshot the current metronome state. The name is trimmed and must not be blank.
    pub fn new(name: &str, config: &TempoConfig, marking: &TempoMarking) -> Result<Self, StorageError> {
        let name = clean_name(name)?;
        let (id, created_at) = new_identity();
        Ok(Self {
            id,
            name,
            bpm: config.bpm(),
            beat_per_bar: config.beats_per_bar(),
            click_per_beat: config.subdivisions_per_beat(),
            tempo_name: marking.name.to_string(),
            created_at,
        })
    }

    pub fn tempo_config(&self) -> TempoConfig {
        TempoConfig::new(
            TempoMode::Metronome,
            self.bpm as i32,
            self.beat_per_bar as i32,
            self.click_per_beat as i32,
        )
    }

    /// Stored marking, `None` when the name is not in the table
    pub fn tempo_marking(&self) -> Option<&'static TempoMarking> {
        TempoMarking::find(&self.tempo_name)
    }
}

impl Preset for MetronomePreset {
    const STORAGE_KEY: &'static str = METRONOME_PRESETS_KEY;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn clamp_values(&mut self) {
        let config = self.tempo_config();
        self.bpm = config.bpm();
        self.beat_per_bar = config.beats_per_bar();
        self.click_per_beat = config.subdivisions_per_beat();
    }
}

/// Saved chord trainer setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordsPreset {
    pub id: String,
    pub name: String,
    pub bpm: u16,
    pub notes: Vec<PitchClass>,
    pub chords: Vec<ChordQuality>,
    pub tensions: Vec<Tension>,
    pub created_at: i64,
}

impl ChordsPreset {
    pub fn new(name: &str, params: &ChordPlayParams) -> Result<Self, StorageError> {
        let name = clean_name(name)?;
        let (id, created_at) = new_identity();
        Ok(Self {
            id,
            name,
            bpm: params.bpm,
            notes: params.selection.notes.clone(),
            chords: params.selection.chords.clone(),
            tensions: params.selection.tensions.clone(),
            created_at,
        })
    }

    pub fn selection(&self) -> ChordSelection {
        ChordSelection::new(self.notes.clone(), self.chords.clone(), self.tensions.clone())
    }

    pub fn play_params(&self) -> ChordPlayParams {
        ChordPlayParams::new(self.bpm as i32, self.selection())
    }
}

impl Preset for ChordsPreset {
    const STORAGE_KEY: &'static str = CHORDS_PRESETS_KEY;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn clamp_values(&mut self) {
        self.bpm = clamp_bpm(TempoMode::Chords, self.bpm as i32);
    }
}

/// In-memory copy of one preset list, written through to the store
///
/// The fallible `try_*` methods report errors; `load`, `save` and `delete`
/// log them and leave the library unchanged.
#[derive(Debug, Clone)]
pub struct PresetLibrary<P: Preset> {
    presets: Vec<P>,
}

impl<P: Preset> Default for PresetLibrary<P> {
    fn default() -> Self {
        Self {
            presets: Vec::new(),
        }
    }
}

impl<P: Preset> PresetLibrary<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let Some(entries) = read_json::<Vec<serde_json::Value>>(store, P::STORAGE_KEY)? else {
            return Ok(Self::new());
        };

        let total = entries.len();
        let mut presets: Vec<P> = entries.into_iter().filter_map(parse_entry::<P>).collect();
        presets.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        log::debug!(
            "Loaded {} of {} presets from '{}'",
            presets.len(),
            total,
            P::STORAGE_KEY
        );
        Ok(Self { presets })
    }

    /// Load the list, falling back to an empty library
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::try_load(store).unwrap_or_else(|e| {
            log::warn!("Failed to load presets from '{}': {}", P::STORAGE_KEY, e);
            Self::new()
        })
    }

    /// Presets, newest first
    pub fn presets(&self) -> &[P] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&P> {
        self.presets.iter().find(|p| p.id() == id)
    }

    /// Prepend a preset and persist the list
    pub fn try_save(&mut self, store: &mut dyn KeyValueStore, mut preset: P) -> Result<(), StorageError> {
        preset.validate()?;
        preset.clamp_values();

        let mut updated = Vec::with_capacity(self.presets.len() + 1);
        updated.push(preset);
        updated.extend(self.presets.iter().cloned());

        write_json(store, P::STORAGE_KEY, &updated)?;
        self.presets = updated;
        log::debug!("Saved preset, {} in '{}'", self.presets.len(), P::STORAGE_KEY);
        Ok(())
    }

    pub fn save(&mut self, store: &mut dyn KeyValueStore, preset: P) -> bool {
        match self.try_save(store, preset) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save preset: {}", e);
                false
            }
        }
    }

    /// Remove a preset by id. Returns `Ok(false)` when no preset has that id.
    pub fn try_delete(&mut self, store: &mut dyn KeyValueStore, id: &str) -> Result<bool, StorageError> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let updated: Vec<P> = self.presets.iter().filter(|p| p.id() != id).cloned().collect();
        write_json(store, P::STORAGE_KEY, &updated)?;
        self.presets = updated;
        log::debug!("Deleted preset {}", id);
        Ok(true)
    }

    pub fn delete(&mut self, store: &mut dyn KeyValueStore, id: &str) -> bool {
        match self.try_delete(store, id) {
            Ok(deleted) => deleted,
            Err(e) => {
                log::warn!("Failed to delete preset {}: {}", id, e);
                false
            }
        }
    }
}

fn parse_entry<P: Preset>(value: serde_json::Value) -> Option<P> {
    let mut preset = match serde_json::from_value::<P>(value) {
        Ok(preset) => preset,
        Err(e) => {
            log::warn!("Dropping malformed preset in '{}': {}", P::STORAGE_KEY, e);
            return None;
        }
    };

    if let Err(e) = preset.validate() {
        log::warn!("Dropping preset in '{}': {}", P::STORAGE_KEY, e);
        return None;
    }
    preset.clamp_values();
    Some(preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;

    fn metronome_preset(name: &str, created_at: i64) -> MetronomePreset {
        let mut preset = MetronomePreset::new(
            name,
            &TempoConfig::metronome().with_bpm(96).with_subdivisions(2),
            TempoMarking::default_marking(),
        )
        .unwrap();
        preset.created_at = created_at;
        preset
    }

    #[test]
    fn test_new_preset_trims_name() {
        let preset = metronome_preset("  Warmup  ", 1);
        assert_eq!(preset.name, "Warmup");
        assert_eq!(preset.bpm, 96);
        assert_eq!(preset.click_per_beat, 2);
        assert_eq!(preset.tempo_name, "Allegro");
        assert!(!preset.id.is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = MetronomePreset::new(
            "   ",
            &TempoConfig::metronome(),
            TempoMarking::default_marking(),
        );
        assert!(matches!(result, Err(StorageError::InvalidPreset(_))));
    }

    #[test]
    fn test_serialized_field_names() {
        let preset = metronome_preset("Ballad", 1700000000000);
        let value = serde_json::to_value(&preset).unwrap();
        assert_eq!(value["beatPerBar"], 4);
        assert_eq!(value["clickPerBeat"], 2);
        assert_eq!(value["tempoName"], "Allegro");
        assert_eq!(value["createdAt"], 1700000000000i64);
    }

    #[test]
    fn test_save_prepends() {
        let mut store = MemoryStore::new();
        let mut library = PresetLibrary::new();
        assert!(library.save(&mut store, metronome_preset("first", 1)));
        assert!(library.save(&mut store, metronome_preset("second", 2)));

        let names: Vec<&str> = library.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);

        let reloaded = PresetLibrary::<MetronomePreset>::load(&store);
        assert_eq!(reloaded.presets(), library.presets());
    }

    #[test]
    fn test_load_sorts_newest_first() {
        let mut store = MemoryStore::new();
        let presets = vec![
            metronome_preset("old", 10),
            metronome_preset("new", 30),
            metronome_preset("mid", 20),
        ];
        write_json(&mut store, METRONOME_PRESETS_KEY, &presets).unwrap();

        let library = PresetLibrary::<MetronomePreset>::load(&store);
        let names: Vec<&str> = library.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let mut store = MemoryStore::new();
        let data = r#"[
            {"id":"a","name":"ok","bpm":100,"beatPerBar":4,"clickPerBeat":1,"tempoName":"Andante","createdAt":5},
            {"id":"b","name":"no bpm","beatPerBar":4,"clickPerBeat":1,"tempoName":"Andante","createdAt":6},
            {"id":"","name":"no id","bpm":100,"beatPerBar":4,"clickPerBeat":1,"tempoName":"Presto","createdAt":7},
            {"id":"d","name":"  ","bpm":100,"beatPerBar":4,"clickPerBeat":1,"tempoName":"Presto","createdAt":8},
            {"id":"e","name":"beats as text","bpm":100,"beatPerBar":"four","clickPerBeat":1,"tempoName":"Presto","createdAt":9},
            "garbage",
            42
        ]"#;
        store.set(METRONOME_PRESETS_KEY, data).unwrap();

        let library = PresetLibrary::<MetronomePreset>::load(&store);
        assert_eq!(library.len(), 1);
        assert_eq!(library.presets()[0].id, "a");
    }

    #[test]
    fn test_unreadable_list_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(CHORDS_PRESETS_KEY, "{not json").unwrap();
        assert!(PresetLibrary::<ChordsPreset>::try_load(&store).is_err());
        assert!(PresetLibrary::<ChordsPreset>::load(&store).is_empty());
    }

    #[test]
    fn test_delete_by_id() {
        let mut store = MemoryStore::new();
        let mut library = PresetLibrary::new();
        let keep = metronome_preset("keep", 1);
        let drop = metronome_preset("drop", 2);
        let drop_id = drop.id.clone();
        library.save(&mut store, keep.clone());
        library.save(&mut store, drop);

        assert!(library.delete(&mut store, &drop_id));
        assert!(!library.delete(&mut store, &drop_id));
        assert_eq!(library.presets(), &[keep]);
        assert_eq!(PresetLibrary::<MetronomePreset>::load(&store).len(), 1);
    }

    #[test]
    fn test_metronome_preset_restores_config() {
        let preset = metronome_preset("x", 1);
        let config = preset.tempo_config();
        assert_eq!(config.bpm(), 96);
        assert_eq!(config.beats_per_bar(), 4);
        assert_eq!(config.subdivisions_per_beat(), 2);
        assert_eq!(preset.tempo_marking().map(|m| m.name), Some("Allegro"));

        let mut unknown = preset.clone();
        unknown.tempo_name = "Allegrissimo".to_string();
        assert!(unknown.tempo_marking().is_none());
    }

    #[test]
    fn test_chords_preset_labels() {
        let params = ChordPlayParams::new(
            100,
            ChordSelection::new(
                vec![PitchClass::Gb],
                vec![ChordQuality::Dominant7],
                vec![Tension::FlatNine],
            ),
        );
        let preset = ChordsPreset::new("Tritone", &params).unwrap();
        let value = serde_json::to_value(&preset).unwrap();
        assert_eq!(value["notes"][0], "Gb(F#)");
        assert_eq!(value["chords"][0], "7");
        assert_eq!(value["tensions"][0], "b9");
        assert_eq!(preset.play_params(), params);
    }

    #[test]
    fn test_chords_preset_unknown_quality_dropped() {
        let mut store = MemoryStore::new();
        let data = r#"[
            {"id":"a","name":"ok","bpm":80,"notes":["C"],"chords":["M7"],"tensions":[],"createdAt":1},
            {"id":"b","name":"bad","bpm":80,"notes":["C"],"chords":["maj13"],"tensions":[],"createdAt":2}
        ]"#;
        store.set(CHORDS_PRESETS_KEY, data).unwrap();

        let library = PresetLibrary::<ChordsPreset>::load(&store);
        assert_eq!(library.len(), 1);
        assert_eq!(library.presets()[0].id, "a");
    }

    #[test]
    fn test_out_of_range_metronome_values_clamped_on_load() {
        let mut store = MemoryStore::new();
        let data = r#"[
            {"id":"a","name":"too fast","bpm":900,"beatPerBar":0,"clickPerBeat":40,"tempoName":"Presto","createdAt":1},
            {"id":"b","name":"too slow","bpm":3,"beatPerBar":20,"clickPerBeat":0,"tempoName":"Largo","createdAt":2}
        ]"#;
        store.set(METRONOME_PRESETS_KEY, data).unwrap();

        let library = PresetLibrary::<MetronomePreset>::load(&store);
        assert_eq!(library.len(), 2);

        let fast = library.get("a").unwrap();
        assert_eq!((fast.bpm, fast.beat_per_bar, fast.click_per_beat), (300, 1, 16));
        let slow = library.get("b").unwrap();
        assert_eq!((slow.bpm, slow.beat_per_bar, slow.click_per_beat), (20, 16, 1));
    }

    #[test]
    fn test_fast_chord_preset_kept_and_clamped() {
        let mut store = MemoryStore::new();
        let data = r#"[
            {"id":"1700000000000","name":"Fast","bpm":260,"notes":["C"],"chords":["M7"],"tensions":[],"createdAt":1700000000000}
        ]"#;
        store.set(CHORDS_PRESETS_KEY, data).unwrap();

        let library = PresetLibrary::<ChordsPreset>::load(&store);
        assert_eq!(library.len(), 1);
        assert_eq!(library.presets()[0].bpm, 240);
        assert_eq!(library.presets()[0].play_params().bpm, 240);
    }

    #[test]
    fn test_save_clamps_hand_built_preset() {
        let mut store = MemoryStore::new();
        let mut library = PresetLibrary::new();
        let mut preset = ChordsPreset::new("Slow", &ChordPlayParams::new(60, ChordSelection::all())).unwrap();
        preset.bpm = 10;

        assert!(library.save(&mut store, preset));
        assert_eq!(library.presets()[0].bpm, 30);
        assert_eq!(PresetLibrary::<ChordsPreset>::load(&store).presets()[0].bpm, 30);
    }
}
