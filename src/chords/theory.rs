// Chord theory - Pitch classes, chord qualities and tensions
// Text forms match what the practice screens display and what presets store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised when parsing chord vocabulary from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TheoryError {
    #[error("Unknown note: {0}")]
    UnknownNote(String),

    #[error("Unknown chord quality: {0}")]
    UnknownQuality(String),

    #[error("Unknown tension: {0}")]
    UnknownTension(String),
}

/// Strip the parenthesised enharmonic alternative from a note label
///
/// `"Db(C#)"` becomes `"Db"`; labels without an alternative are only trimmed.
pub fn normalize_note(label: &str) -> &str {
    label
        .split_once('(')
        .map_or(label, |(head, _)| head)
        .trim()
}

/// One of the twelve pitch classes, spelled with flats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PitchClass {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Db,
        PitchClass::D,
        PitchClass::Eb,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Gb,
        PitchClass::G,
        PitchClass::Ab,
        PitchClass::A,
        PitchClass::Bb,
        PitchClass::B,
    ];

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Db => "Db",
            PitchClass::D => "D",
            PitchClass::Eb => "Eb",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Gb => "Gb",
            PitchClass::G => "G",
            PitchClass::Ab => "Ab",
            PitchClass::A => "A",
            PitchClass::Bb => "Bb",
            PitchClass::B => "B",
        }
    }

    /// Sharp spelling for the black keys
    pub fn sharp_name(&self) -> Option<&'static str> {
        match self {
            PitchClass::Db => Some("C#"),
            PitchClass::Eb => Some("D#"),
            PitchClass::Gb => Some("F#"),
            PitchClass::Ab => Some("G#"),
            PitchClass::Bb => Some("A#"),
            _ => None,
        }
    }

    /// Selection label, e.g. `"Db(C#)"`
    pub fn label(&self) -> String {
        match self.sharp_name() {
            Some(sharp) => format!("{}({})", self.name(), sharp),
            None => self.name().to_string(),
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let note = normalize_note(s);
        PitchClass::ALL
            .iter()
            .copied()
            .find(|p| p.name() == note || p.sharp_name() == Some(note))
            .ok_or_else(|| TheoryError::UnknownNote(s.to_string()))
    }
}

impl TryFrom<String> for PitchClass {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(value: PitchClass) -> Self {
        value.label()
    }
}

/// Seventh-chord qualities offered by the chord trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChordQuality {
    Major7,
    Minor7,
    Dominant7,
    HalfDiminished7,
    Diminished7,
    MinorMajor7,
    Augmented7,
    Sus4,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 8] = [
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Dominant7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Diminished7,
        ChordQuality::MinorMajor7,
        ChordQuality::Augmented7,
        ChordQuality::Sus4,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ChordQuality::Major7 => "M7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::HalfDiminished7 => "m7(b5)",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::MinorMajor7 => "mM7",
            ChordQuality::Augmented7 => "aug7",
            ChordQuality::Sus4 => "sus4",
        }
    }

    /// Tensions that may decorate this quality
    pub fn allowed_tensions(&self) -> &'static [Tension] {
        use Tension::*;
        match self {
            ChordQuality::Major7 | ChordQuality::Dominant7 => &[FlatNine, Nine, SharpNine, Thirteen],
            ChordQuality::Minor7 => &[FlatNine, Nine, SharpNine, Eleven],
            _ => &[],
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ChordQuality {
    type Err = TheoryError;

    // Symbols are case sensitive: "M7" and "m7" are different chords
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        ChordQuality::ALL
            .iter()
            .copied()
            .find(|q| q.symbol() == symbol)
            .ok_or_else(|| TheoryError::UnknownQuality(s.to_string()))
    }
}

impl TryFrom<String> for ChordQuality {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChordQuality> for String {
    fn from(value: ChordQuality) -> Self {
        value.symbol().to_string()
    }
}

/// Family a tension belongs to; a chord carries at most one per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TensionGroup {
    Ninth,
    Eleventh,
    Thirteenth,
}

impl TensionGroup {
    /// Groups in display order
    pub const ALL: [TensionGroup; 3] = [
        TensionGroup::Ninth,
        TensionGroup::Eleventh,
        TensionGroup::Thirteenth,
    ];

    pub fn members(&self) -> &'static [Tension] {
        use Tension::*;
        match self {
            TensionGroup::Ninth => &[FlatNine, Nine, SharpNine],
            TensionGroup::Eleventh => &[Eleven, SharpEleven],
            TensionGroup::Thirteenth => &[FlatThirteen, Thirteen],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TensionGroup::Ninth => "9",
            TensionGroup::Eleventh => "11",
            TensionGroup::Thirteenth => "13",
        }
    }
}

/// Chord extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tension {
    FlatNine,
    Nine,
    SharpNine,
    Eleven,
    SharpEleven,
    FlatThirteen,
    Thirteen,
}

impl Tension {
    pub const ALL: [Tension; 7] = [
        Tension::FlatNine,
        Tension::Nine,
        Tension::SharpNine,
        Tension::Eleven,
        Tension::SharpEleven,
        Tension::FlatThirteen,
        Tension::Thirteen,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Tension::FlatNine => "b9",
            Tension::Nine => "9",
            Tension::SharpNine => "#9",
            Tension::Eleven => "11",
            Tension::SharpEleven => "#11",
            Tension::FlatThirteen => "b13",
            Tension::Thirteen => "13",
        }
    }

    pub fn group(&self) -> TensionGroup {
        match self {
            Tension::FlatNine | Tension::Nine | Tension::SharpNine => TensionGroup::Ninth,
            Tension::Eleven | Tension::SharpEleven => TensionGroup::Eleventh,
            Tension::FlatThirteen | Tension::Thirteen => TensionGroup::Thirteenth,
        }
    }
}

impl fmt::Display for Tension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Tension {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        Tension::ALL
            .iter()
            .copied()
            .find(|t| t.symbol() == symbol)
            .ok_or_else(|| TheoryError::UnknownTension(s.to_string()))
    }
}

impl TryFrom<String> for Tension {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tension> for String {
    fn from(value: Tension) -> Self {
        value.symbol().to_string()
    }
}
