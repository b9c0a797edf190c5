// Tempo - Validated tempo model for the beat clock
// Every setter clamps into range; nothing here ever returns an error.

use std::fmt;
use std::time::Duration;

/// Inclusive BPM bounds for one mode of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpmRange {
    pub min: u16,
    pub max: u16,
}

impl BpmRange {
    pub const METRONOME: BpmRange = BpmRange { min: 20, max: 300 };
    pub const CHORDS: BpmRange = BpmRange { min: 30, max: 240 };

    /// Clamp a requested BPM into this range
    ///
    /// Out-of-range values snap to the nearest bound. Accepts a signed
    /// value so that slider/increment arithmetic can overshoot freely.
    pub fn clamp(&self, value: i32) -> u16 {
        value.clamp(self.min as i32, self.max as i32) as u16
    }

    pub fn contains(&self, bpm: u16) -> bool {
        (self.min..=self.max).contains(&bpm)
    }
}

/// Which part of the app a tempo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TempoMode {
    #[default]
    Metronome,
    Chords,
}

impl TempoMode {
    pub fn bpm_range(&self) -> BpmRange {
        match self {
            TempoMode::Metronome => BpmRange::METRONOME,
            TempoMode::Chords => BpmRange::CHORDS,
        }
    }

    pub fn default_bpm(&self) -> u16 {
        match self {
            TempoMode::Metronome => 120,
            TempoMode::Chords => 80,
        }
    }
}

/// Clamp a BPM value for the given mode
pub fn clamp_bpm(mode: TempoMode, value: i32) -> u16 {
    mode.bpm_range().clamp(value)
}

/// Apply an increment to a BPM value, then clamp
pub fn adjust_bpm(mode: TempoMode, current: u16, delta: i32) -> u16 {
    clamp_bpm(mode, current as i32 + delta)
}

/// Tempo configuration driving the beat clock
///
/// Fields are private so that the clamping invariant cannot be bypassed:
/// bpm always lies inside the mode's range, and both counts lie in
/// `[1, MAX_BEATS_PER_BAR]` / `[1, MAX_SUBDIVISIONS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoConfig {
    mode: TempoMode,
    bpm: u16,
    beats_per_bar: u8,
    subdivisions_per_beat: u8,
}

impl TempoConfig {
    pub const MAX_BEATS_PER_BAR: u8 = 16;
    pub const MAX_SUBDIVISIONS: u8 = 16;

    /// Create a config, clamping every field
    pub fn new(mode: TempoMode, bpm: i32, beats_per_bar: i32, subdivisions_per_beat: i32) -> Self {
        Self {
            mode,
            bpm: clamp_bpm(mode, bpm),
            beats_per_bar: clamp_count(beats_per_bar, Self::MAX_BEATS_PER_BAR),
            subdivisions_per_beat: clamp_count(subdivisions_per_beat, Self::MAX_SUBDIVISIONS),
        }
    }

    /// Metronome defaults: 120 BPM, 4 beats, no subdivision
    pub fn metronome() -> Self {
        Self::new(TempoMode::Metronome, 120, 4, 1)
    }

    /// Chord play mode: fixed 4/4 without subdivision clicks
    pub fn chords(bpm: i32) -> Self {
        Self::new(TempoMode::Chords, bpm, 4, 1)
    }

    pub fn mode(&self) -> TempoMode {
        self.mode
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn beats_per_bar(&self) -> u8 {
        self.beats_per_bar
    }

    pub fn subdivisions_per_beat(&self) -> u8 {
        self.subdivisions_per_beat
    }

    pub fn set_bpm(&mut self, bpm: i32) {
        self.bpm = clamp_bpm(self.mode, bpm);
    }

    pub fn adjust_bpm(&mut self, delta: i32) {
        self.bpm = adjust_bpm(self.mode, self.bpm, delta);
    }

    pub fn set_beats_per_bar(&mut self, beats: i32) {
        self.beats_per_bar = clamp_count(beats, Self::MAX_BEATS_PER_BAR);
    }

    pub fn set_subdivisions_per_beat(&mut self, subdivisions: i32) {
        self.subdivisions_per_beat = clamp_count(subdivisions, Self::MAX_SUBDIVISIONS);
    }

    pub fn with_bpm(mut self, bpm: i32) -> Self {
        self.set_bpm(bpm);
        self
    }

    pub fn with_beats_per_bar(mut self, beats: i32) -> Self {
        self.set_beats_per_bar(beats);
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: i32) -> Self {
        self.set_subdivisions_per_beat(subdivisions);
        self
    }

    /// Interval between two primary beats (60000 / bpm ms)
    ///
    /// Computed in whole nanoseconds so repeated scheduling never
    /// accumulates floating point error.
    pub fn beat_interval(&self) -> Duration {
        Duration::from_nanos(60_000_000_000 / self.bpm as u64)
    }

    /// Interval between two subdivision clicks inside one beat
    pub fn subdivision_interval(&self) -> Duration {
        self.beat_interval() / self.subdivisions_per_beat as u32
    }

    /// Duration of a whole bar
    pub fn bar_duration(&self) -> Duration {
        self.beat_interval() * self.beats_per_bar as u32
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self::metronome()
    }
}

impl fmt::Display for TempoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} BPM, {} beats/bar, {} clicks/beat",
            self.bpm, self.beats_per_bar, self.subdivisions_per_beat
        )
    }
}

fn clamp_count(value: i32, max: u8) -> u8 {
    value.clamp(1, max as i32) as u8
}

/// A classical tempo marking with its reference BPM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoMarking {
    pub name: &'static str,
    pub bpm: u16,
}

pub const TEMPO_MARKINGS: [TempoMarking; 15] = [
    TempoMarking { name: "Larghissimo", bpm: 24 },
    TempoMarking { name: "Grave", bpm: 35 },
    TempoMarking { name: "Lento", bpm: 50 },
    TempoMarking { name: "Largo", bpm: 50 },
    TempoMarking { name: "Larghetto", bpm: 63 },
    TempoMarking { name: "Adagio", bpm: 71 },
    TempoMarking { name: "Adagietto", bpm: 75 },
    TempoMarking { name: "Andante", bpm: 92 },
    TempoMarking { name: "Andantino", bpm: 94 },
    TempoMarking { name: "Moderato", bpm: 114 },
    TempoMarking { name: "Allegretto", bpm: 116 },
    TempoMarking { name: "Allegro", bpm: 144 },
    TempoMarking { name: "Vivace", bpm: 166 },
    TempoMarking { name: "Presto", bpm: 184 },
    TempoMarking { name: "Prestissimo", bpm: 200 },
];

impl TempoMarking {
    /// Marking selected when the metronome opens
    pub fn default_marking() -> &'static TempoMarking {
        &TEMPO_MARKINGS[11]
    }

    pub fn find(name: &str) -> Option<&'static TempoMarking> {
        TEMPO_MARKINGS.iter().find(|m| m.name == name)
    }

    /// Next marking in the table, wrapping after Prestissimo
    ///
    /// An unknown name restarts the cycle at the first marking.
    pub fn next_after(name: &str) -> &'static TempoMarking {
        let next = TEMPO_MARKINGS
            .iter()
            .position(|m| m.name == name)
            .map_or(0, |i| (i + 1) % TEMPO_MARKINGS.len());
        &TEMPO_MARKINGS[next]
    }
}

impl fmt::Display for TempoMarking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} BPM)", self.name, self.bpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bpm_to_nearest_bound() {
        assert_eq!(clamp_bpm(TempoMode::Metronome, 5), 20);
        assert_eq!(clamp_bpm(TempoMode::Metronome, -40), 20);
        assert_eq!(clamp_bpm(TempoMode::Metronome, 301), 300);
        assert_eq!(clamp_bpm(TempoMode::Metronome, 10_000), 300);
        assert_eq!(clamp_bpm(TempoMode::Metronome, 140), 140);

        assert_eq!(clamp_bpm(TempoMode::Chords, 29), 30);
        assert_eq!(clamp_bpm(TempoMode::Chords, 241), 240);
    }

    #[test]
    fn test_adjust_bpm() {
        assert_eq!(adjust_bpm(TempoMode::Metronome, 120, 1), 121);
        assert_eq!(adjust_bpm(TempoMode::Metronome, 120, -1), 119);
        assert_eq!(adjust_bpm(TempoMode::Metronome, 20, -1), 20);
        assert_eq!(adjust_bpm(TempoMode::Metronome, 300, 5), 300);
        assert_eq!(adjust_bpm(TempoMode::Chords, 235, 10), 240);
    }

    #[test]
    fn test_config_clamps_counts() {
        let config = TempoConfig::new(TempoMode::Metronome, 120, 0, 99);
        assert_eq!(config.beats_per_bar(), 1);
        assert_eq!(config.subdivisions_per_beat(), 16);

        let config = TempoConfig::metronome().with_beats_per_bar(-3).with_subdivisions(0);
        assert_eq!(config.beats_per_bar(), 1);
        assert_eq!(config.subdivisions_per_beat(), 1);
    }

    #[test]
    fn test_intervals() {
        let config = TempoConfig::metronome();
        assert_eq!(config.beat_interval(), Duration::from_millis(500));
        assert_eq!(config.bar_duration(), Duration::from_secs(2));

        let config = TempoConfig::metronome().with_bpm(60).with_subdivisions(3);
        assert_eq!(config.beat_interval(), Duration::from_secs(1));
        assert_eq!(config.subdivision_interval(), Duration::from_nanos(333_333_333));
    }

    #[test]
    fn test_intervals_always_positive() {
        for bpm in [i32::MIN, 0, 1, 300, i32::MAX] {
            let config = TempoConfig::metronome().with_bpm(bpm).with_subdivisions(16);
            assert!(config.beat_interval() > Duration::ZERO);
            assert!(config.subdivision_interval() > Duration::ZERO);
        }
    }

    #[test]
    fn test_chord_mode_uses_its_own_range() {
        let config = TempoConfig::chords(300);
        assert_eq!(config.bpm(), 240);
        assert_eq!(config.beats_per_bar(), 4);
        assert_eq!(config.subdivisions_per_beat(), 1);
    }

    #[test]
    fn test_tempo_marking_cycle() {
        assert_eq!(TempoMarking::default_marking().name, "Allegro");
        assert_eq!(TempoMarking::next_after("Allegro").name, "Vivace");
        assert_eq!(TempoMarking::next_after("Prestissimo").name, "Larghissimo");
        assert_eq!(TempoMarking::next_after("Unknown").name, "Larghissimo");
        assert_eq!(TempoMarking::find("Andante").map(|m| m.bpm), Some(92));
        assert!(TempoMarking::find("Nope").is_none());
    }

    #[test]
    fn test_markings_fit_metronome_range() {
        for marking in TEMPO_MARKINGS.iter() {
            assert!(BpmRange::METRONOME.contains(marking.bpm), "{}", marking);
        }
    }
}
