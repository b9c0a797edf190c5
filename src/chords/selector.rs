// Random chord selection
// Pure functions over an injected random source; the same seed always
// produces the same chord sequence.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;

use super::theory::{ChordQuality, PitchClass, Tension, TensionGroup};

/// What the user has enabled on the chord configuration screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChordSelection {
    pub notes: Vec<PitchClass>,
    pub chords: Vec<ChordQuality>,
    pub tensions: Vec<Tension>,
}

impl ChordSelection {
    /// Build a selection, dropping duplicates but keeping the given order
    pub fn new(notes: Vec<PitchClass>, chords: Vec<ChordQuality>, tensions: Vec<Tension>) -> Self {
        Self {
            notes: dedup(notes),
            chords: dedup(chords),
            tensions: dedup(tensions),
        }
    }

    /// Configuration screen defaults: every note and quality, no tensions
    pub fn all() -> Self {
        Self::new(PitchClass::ALL.to_vec(), ChordQuality::ALL.to_vec(), Vec::new())
    }

    /// A chord can only be drawn with at least one note and one quality
    pub fn is_playable(&self) -> bool {
        !self.notes.is_empty() && !self.chords.is_empty()
    }

    /// Flip a note on or off
    pub fn toggle_note(&mut self, note: PitchClass) {
        toggle(&mut self.notes, note);
    }

    pub fn toggle_chord(&mut self, quality: ChordQuality) {
        toggle(&mut self.chords, quality);
    }

    pub fn toggle_tension(&mut self, tension: Tension) {
        toggle(&mut self.tensions, tension);
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

/// One chord shown to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordEvent {
    pub root: PitchClass,
    pub quality: ChordQuality,
    /// At most one tension per group, in group order
    pub tensions: Vec<Tension>,
}

impl fmt::Display for ChordEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality)?;
        if !self.tensions.is_empty() {
            let symbols: Vec<&str> = self.tensions.iter().map(|t| t.symbol()).collect();
            write!(f, "({})", symbols.join(","))?;
        }
        Ok(())
    }
}

/// Pick the tensions decorating one chord
///
/// The configured tensions are intersected with what the quality allows;
/// each group then contributes one uniformly chosen member, or nothing when
/// none of its members survived the intersection.
pub fn select_tensions<R: Rng + ?Sized>(
    quality: ChordQuality,
    configured: &[Tension],
    rng: &mut R,
) -> Vec<Tension> {
    let allowed = quality.allowed_tensions();
    let mut selected = Vec::new();

    for group in TensionGroup::ALL {
        let candidates: Vec<Tension> = group
            .members()
            .iter()
            .copied()
            .filter(|t| allowed.contains(t) && configured.contains(t))
            .collect();

        if let Some(&tension) = candidates.choose(rng) {
            selected.push(tension);
        }
    }

    selected
}

/// Draw the next chord from a selection
///
/// Returns `None` when no note or no quality is selected.
pub fn select_next<R: Rng + ?Sized>(selection: &ChordSelection, rng: &mut R) -> Option<ChordEvent> {
    let root = *selection.notes.choose(rng)?;
    let quality = *selection.chords.choose(rng)?;
    let tensions = select_tensions(quality, &selection.tensions, rng);

    Some(ChordEvent {
        root,
        quality,
        tensions,
    })
}

/// Random chord source owning its generator
#[derive(Debug, Clone)]
pub struct ChordSelector<R: Rng = StdRng> {
    rng: R,
}

impl ChordSelector<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic selector for reproducible sequences
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ChordSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn next_chord(&mut self, selection: &ChordSelection) -> Option<ChordEvent> {
        select_next(selection, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const DRAWS: usize = 500;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        let mut rng = rng();
        let no_notes = ChordSelection::new(vec![], vec![ChordQuality::Major7], vec![]);
        let no_chords = ChordSelection::new(vec![PitchClass::C], vec![], vec![]);

        assert!(select_next(&no_notes, &mut rng).is_none());
        assert!(select_next(&no_chords, &mut rng).is_none());
        assert!(!no_notes.is_playable());
    }

    #[test]
    fn test_dim7_never_has_tensions() {
        let mut rng = rng();
        let selection = ChordSelection::new(
            PitchClass::ALL.to_vec(),
            vec![ChordQuality::Diminished7],
            Tension::ALL.to_vec(),
        );

        for _ in 0..DRAWS {
            let chord = select_next(&selection, &mut rng).unwrap();
            assert!(chord.tensions.is_empty());
        }
    }

    #[test]
    fn test_major7_excludes_eleven() {
        let mut rng = rng();
        let selection = ChordSelection::new(
            vec![PitchClass::C],
            vec![ChordQuality::Major7],
            vec![Tension::Nine, Tension::Eleven, Tension::Thirteen],
        );

        let mut seen = HashSet::new();
        for _ in 0..DRAWS {
            let chord = select_next(&selection, &mut rng).unwrap();
            seen.extend(chord.tensions.iter().copied());
        }

        assert!(!seen.contains(&Tension::Eleven));
        assert!(seen.contains(&Tension::Nine));
        assert!(seen.contains(&Tension::Thirteen));
    }

    #[test]
    fn test_one_tension_per_group_in_order() {
        let mut rng = rng();
        let selection = ChordSelection::new(
            vec![PitchClass::F],
            vec![ChordQuality::Minor7],
            Tension::ALL.to_vec(),
        );

        for _ in 0..DRAWS {
            let chord = select_next(&selection, &mut rng).unwrap();
            // m7 allows one ninth and the natural eleventh
            assert_eq!(chord.tensions.len(), 2);
            assert_eq!(chord.tensions[0].group(), TensionGroup::Ninth);
            assert_eq!(chord.tensions[1], Tension::Eleven);
        }
    }

    #[test]
    fn test_no_configured_tensions() {
        let mut rng = rng();
        let selection = ChordSelection::new(vec![PitchClass::G], vec![ChordQuality::Dominant7], vec![]);
        let chord = select_next(&selection, &mut rng).unwrap();
        assert_eq!(chord.root, PitchClass::G);
        assert_eq!(chord.quality, ChordQuality::Dominant7);
        assert!(chord.tensions.is_empty());
    }

    #[test]
    fn test_every_note_and_quality_reachable() {
        let mut rng = rng();
        let selection = ChordSelection::all();
        let mut roots = HashSet::new();
        let mut qualities = HashSet::new();
        for _ in 0..2000 {
            let chord = select_next(&selection, &mut rng).unwrap();
            roots.insert(chord.root);
            qualities.insert(chord.quality);
        }
        assert_eq!(roots.len(), 12);
        assert_eq!(qualities.len(), 8);
    }

    #[test]
    fn test_seeded_selector_is_deterministic() {
        let selection = ChordSelection::new(
            PitchClass::ALL.to_vec(),
            ChordQuality::ALL.to_vec(),
            Tension::ALL.to_vec(),
        );
        let mut a = ChordSelector::seeded(7);
        let mut b = ChordSelector::seeded(7);
        for _ in 0..50 {
            assert_eq!(a.next_chord(&selection), b.next_chord(&selection));
        }
    }

    #[test]
    fn test_selection_dedup_and_toggle() {
        let mut selection = ChordSelection::new(
            vec![PitchClass::C, PitchClass::C, PitchClass::D],
            vec![ChordQuality::Major7],
            vec![],
        );
        assert_eq!(selection.notes, vec![PitchClass::C, PitchClass::D]);

        selection.toggle_note(PitchClass::C);
        assert_eq!(selection.notes, vec![PitchClass::D]);
        selection.toggle_tension(Tension::Nine);
        assert_eq!(selection.tensions, vec![Tension::Nine]);
    }

    #[test]
    fn test_chord_event_display() {
        let chord = ChordEvent {
            root: PitchClass::Db,
            quality: ChordQuality::Major7,
            tensions: vec![Tension::Nine, Tension::Thirteen],
        };
        assert_eq!(chord.to_string(), "DbM7(9,13)");

        let plain = ChordEvent {
            root: PitchClass::A,
            quality: ChordQuality::HalfDiminished7,
            tensions: vec![],
        };
        assert_eq!(plain.to_string(), "Am7(b5)");
    }
}
