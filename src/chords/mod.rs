// Chords module
// Chord vocabulary, random selection and the chord play mode

pub mod params;
pub mod rotation;
pub mod selector;
pub mod theory;
pub mod trainer;

pub use params::ChordPlayParams;
pub use rotation::{ChordRotation, ChordSlots};
pub use selector::{ChordEvent, ChordSelection, ChordSelector, select_next, select_tensions};
pub use theory::{ChordQuality, PitchClass, Tension, TensionGroup, TheoryError, normalize_note};
pub use trainer::ChordTrainer;
