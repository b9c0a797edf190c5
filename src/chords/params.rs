// Chord play parameters - Hand-off from the configuration screen to play mode
//
// Values travel as flat string parameters: `bpm` plus comma-joined `notes`,
// `chords` and `tensions`. Parsing never fails; anything missing or
// malformed falls back to an empty list or `FALLBACK_BPM`.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use super::selector::ChordSelection;
use crate::sequencer::tempo::{TempoMode, clamp_bpm};

pub const PARAM_BPM: &str = "bpm";
pub const PARAM_NOTES: &str = "notes";
pub const PARAM_CHORDS: &str = "chords";
pub const PARAM_TENSIONS: &str = "tensions";

/// Play-mode tempo when no usable `bpm` parameter arrives.
/// Differs from the configuration screen's default of 80.
pub const FALLBACK_BPM: i32 = 120;

/// Everything chord play mode needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordPlayParams {
    pub bpm: u16,
    pub selection: ChordSelection,
}

impl ChordPlayParams {
    pub fn new(bpm: i32, selection: ChordSelection) -> Self {
        Self {
            bpm: clamp_bpm(TempoMode::Chords, bpm),
            selection,
        }
    }

    /// Encode as request parameters
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(PARAM_BPM.to_string(), self.bpm.to_string());
        params.insert(
            PARAM_NOTES.to_string(),
            join(self.selection.notes.iter().map(|n| n.label())),
        );
        params.insert(
            PARAM_CHORDS.to_string(),
            join(self.selection.chords.iter().map(|c| c.symbol())),
        );
        params.insert(
            PARAM_TENSIONS.to_string(),
            join(self.selection.tensions.iter().map(|t| t.symbol())),
        );
        params
    }

    /// Decode request parameters with safe fallbacks
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut bpm = None;
        let mut selection = ChordSelection::default();

        for (key, value) in params {
            match key {
                PARAM_BPM => bpm = parse_bpm(value),
                PARAM_NOTES => selection.notes = parse_list(key, value),
                PARAM_CHORDS => selection.chords = parse_list(key, value),
                PARAM_TENSIONS => selection.tensions = parse_list(key, value),
                _ => log::debug!("Ignoring unknown chord play parameter '{}'", key),
            }
        }

        let bpm = bpm.unwrap_or(FALLBACK_BPM);
        Self::new(
            bpm,
            ChordSelection::new(selection.notes, selection.chords, selection.tensions),
        )
    }
}

fn join<S: AsRef<str>>(items: impl Iterator<Item = S>) -> String {
    items
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_bpm(value: &str) -> Option<i32> {
    match value.trim().parse::<i32>() {
        Ok(bpm) => Some(bpm),
        Err(e) => {
            log::warn!("Invalid bpm parameter '{}': {}", value, e);
            None
        }
    }
}

fn parse_list<T>(key: &str, value: &str) -> Vec<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("Dropping entry from '{}' parameter: {}", key, e);
                None
            }
        })
        .collect()
}
