// Chord rotation - Two-slot look-ahead display for chord play mode
//
// Slot A is the chord to play now, slot B the one coming next bar. At every
// bar boundary B moves into A and a freshly drawn chord fills B: a FIFO of
// depth two, never an independent redraw of both slots.

use rand::Rng;
use rand::rngs::StdRng;

use super::selector::{ChordEvent, ChordSelection, ChordSelector};

/// The pair of chords on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSlots {
    /// Slot A
    pub current: ChordEvent,
    /// Slot B
    pub upcoming: ChordEvent,
}

impl ChordSlots {
    pub fn new(current: ChordEvent, upcoming: ChordEvent) -> Self {
        Self { current, upcoming }
    }

    /// Shift B into A and put `fresh` in B. Returns the chord leaving A.
    pub fn rotate(&mut self, fresh: ChordEvent) -> ChordEvent {
        let next_current = std::mem::replace(&mut self.upcoming, fresh);
        std::mem::replace(&mut self.current, next_current)
    }
}

/// Rotating chord state driven by bar boundaries
#[derive(Debug, Clone)]
pub struct ChordRotation<R: Rng = StdRng> {
    selector: ChordSelector<R>,
    selection: ChordSelection,
    slots: Option<ChordSlots>,
    rotations: u64,
}

impl<R: Rng> ChordRotation<R> {
    /// Create the rotation and draw both slots
    pub fn new(selection: ChordSelection, selector: ChordSelector<R>) -> Self {
        let mut rotation = Self {
            selector,
            selection,
            slots: None,
            rotations: 0,
        };
        rotation.slots = rotation.draw_slots();
        rotation
    }

    pub fn selection(&self) -> &ChordSelection {
        &self.selection
    }

    /// Replace the selection and redraw both slots
    pub fn set_selection(&mut self, selection: ChordSelection) {
        self.selection = selection;
        self.slots = self.draw_slots();
        self.rotations = 0;
    }

    /// Chords on screen, `None` when the selection cannot produce any
    pub fn slots(&self) -> Option<&ChordSlots> {
        self.slots.as_ref()
    }

    /// Number of bar boundaries that moved the display
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Advance to the next bar
    ///
    /// With no chords on screen both slots are drawn fresh. When the
    /// selection yields nothing the display is left untouched.
    pub fn advance(&mut self) {
        let Some(slots) = self.slots.as_mut() else {
            self.slots = self.draw_slots();
            return;
        };

        match self.selector.next_chord(&self.selection) {
            Some(fresh) => {
                let left = slots.rotate(fresh);
                self.rotations += 1;
                log::trace!("Chord rotated: {} -> {}", left, slots.current);
            }
            None => log::debug!("Chord selection is empty, keeping current chords"),
        }
    }

    fn draw_slots(&mut self) -> Option<ChordSlots> {
        let current = self.selector.next_chord(&self.selection)?;
        let upcoming = self.selector.next_chord(&self.selection)?;
        Some(ChordSlots::new(current, upcoming))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::theory::{ChordQuality, PitchClass};

    fn chord(root: PitchClass) -> ChordEvent {
        ChordEvent {
            root,
            quality: ChordQuality::Major7,
            tensions: Vec::new(),
        }
    }

    #[test]
    fn test_rotate_is_fifo() {
        let mut slots = ChordSlots::new(chord(PitchClass::C), chord(PitchClass::D));
        let left = slots.rotate(chord(PitchClass::E));

        assert_eq!(left, chord(PitchClass::C));
        assert_eq!(slots.current, chord(PitchClass::D));
        assert_eq!(slots.upcoming, chord(PitchClass::E));
    }

    #[test]
    fn test_advance_moves_upcoming_to_current() {
        let mut rotation = ChordRotation::new(ChordSelection::all(), ChordSelector::seeded(3));
        for _ in 0..20 {
            let before = rotation.slots().cloned().unwrap();
            rotation.advance();
            let after = rotation.slots().cloned().unwrap();
            assert_eq!(after.current, before.upcoming);
        }
        assert_eq!(rotation.rotations(), 20);
    }

    #[test]
    fn test_unplayable_selection_has_no_slots() {
        let empty = ChordSelection::new(vec![], ChordQuality::ALL.to_vec(), vec![]);
        let mut rotation = ChordRotation::new(empty, ChordSelector::seeded(1));
        assert!(rotation.slots().is_none());

        rotation.advance();
        assert!(rotation.slots().is_none());
        assert_eq!(rotation.rotations(), 0);

        rotation.set_selection(ChordSelection::all());
        assert!(rotation.slots().is_some());
    }

    #[test]
    fn test_single_option_selection_repeats() {
        let selection = ChordSelection::new(vec![PitchClass::A], vec![ChordQuality::Sus4], vec![]);
        let mut rotation = ChordRotation::new(selection, ChordSelector::seeded(9));
        rotation.advance();

        let slots = rotation.slots().unwrap();
        assert_eq!(slots.current.to_string(), "Asus4");
        assert_eq!(slots.upcoming.to_string(), "Asus4");
    }
}
