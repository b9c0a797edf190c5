// Chord trainer - Chord play mode
// A 4/4 beat clock whose bar hook rotates the chord display.

use rand::Rng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::params::ChordPlayParams;
use super::rotation::{ChordRotation, ChordSlots};
use super::selector::{ChordSelection, ChordSelector};
use crate::messaging::command::Command;
use crate::sequencer::clock::{BeatClock, ClockObserver};
use crate::sequencer::feedback::FeedbackSink;
use crate::sequencer::scheduler::Scheduler;
use crate::sequencer::tempo::TempoConfig;

pub struct ChordTrainer<S: Scheduler, R: Rng + 'static = StdRng> {
    clock: BeatClock<S>,
    rotation: Rc<RefCell<ChordRotation<R>>>,
}

impl<S: Scheduler, R: Rng + 'static> ChordTrainer<S, R> {
    /// Enter play mode: both chord slots are drawn, the clock is stopped
    pub fn new(scheduler: S, params: ChordPlayParams, selector: ChordSelector<R>) -> Self {
        let rotation = Rc::new(RefCell::new(ChordRotation::new(params.selection, selector)));
        let mut clock = BeatClock::new(scheduler, TempoConfig::chords(params.bpm as i32));

        let hook_rotation = Rc::clone(&rotation);
        clock.set_bar_hook(Box::new(move |_bar| hook_rotation.borrow_mut().advance()));

        Self { clock, rotation }
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.clock.set_feedback(feedback);
        self
    }

    /// Observe beats, e.g. to light the beat indicator
    pub fn subscribe(&mut self, observer: ClockObserver) {
        self.clock.subscribe(observer);
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn toggle(&mut self) {
        self.clock.toggle();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn bpm(&self) -> u16 {
        self.clock.config().bpm()
    }

    pub fn current_beat_index(&self) -> u8 {
        self.clock.current_beat_index()
    }

    /// Chords currently on screen
    pub fn slots(&self) -> Option<ChordSlots> {
        self.rotation.borrow().slots().cloned()
    }

    pub fn selection(&self) -> ChordSelection {
        self.rotation.borrow().selection().clone()
    }

    pub fn set_bpm(&mut self, bpm: i32) {
        let config = self.clock.config().with_bpm(bpm);
        self.clock.set_config(config);
    }

    /// Switch to new parameters (e.g. a loaded preset)
    ///
    /// Both chord slots are redrawn and a running clock starts a fresh run.
    pub fn load(&mut self, params: ChordPlayParams) {
        let was_running = self.clock.is_running();
        self.clock.stop();

        self.rotation.borrow_mut().set_selection(params.selection);
        self.clock
            .set_config(TempoConfig::chords(params.bpm as i32));

        if was_running {
            self.clock.start();
        }
    }

    /// Apply one command. Returns `false` once the driver should quit.
    ///
    /// The bar is fixed to 4/4 without subdivisions here, so commands that
    /// change them or the tempo marking are ignored.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Toggle => self.toggle(),
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::AdjustBpm(delta) => self.set_bpm(self.bpm() as i32 + delta),
            Command::SetBpm(bpm) => self.set_bpm(bpm),
            Command::SetBeatsPerBar(_) | Command::SetSubdivisions(_) | Command::NextTempoMarking => {
                log::debug!("Ignoring {:?} in chord mode", command);
            }
            Command::Quit => {
                self.stop();
                return false;
            }
        }
        true
    }

    pub fn run_until(&mut self, deadline: Duration) -> usize {
        self.clock.run_until(deadline)
    }

    pub fn advance(&mut self, duration: Duration) -> usize {
        self.clock.advance(duration)
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::theory::{ChordQuality, PitchClass};
    use crate::sequencer::scheduler::VirtualScheduler;

    fn trainer(bpm: i32) -> ChordTrainer<VirtualScheduler> {
        ChordTrainer::new(
            VirtualScheduler::new(),
            ChordPlayParams::new(bpm, ChordSelection::all()),
            ChordSelector::seeded(11),
        )
    }

    #[test]
    fn test_chords_drawn_before_start() {
        let trainer = trainer(120);
        assert!(!trainer.is_running());
        assert!(trainer.slots().is_some());
    }

    #[test]
    fn test_rotation_only_on_bar_boundaries() {
        let mut trainer = trainer(120);
        let initial = trainer.slots().unwrap();
        trainer.start();

        // Beats 0..3 of the first bar
        trainer.run_until(Duration::from_millis(1999));
        assert_eq!(trainer.slots().unwrap(), initial);

        // Second downbeat
        trainer.run_until(Duration::from_millis(2000));
        let rotated = trainer.slots().unwrap();
        assert_eq!(rotated.current, initial.upcoming);
    }

    #[test]
    fn test_load_redraws_and_restarts() {
        let mut trainer = trainer(120);
        trainer.start();
        trainer.run_until(Duration::from_millis(700));
        assert_eq!(trainer.current_beat_index(), 1);

        let selection = ChordSelection::new(vec![PitchClass::E], vec![ChordQuality::Minor7], vec![]);
        trainer.load(ChordPlayParams::new(90, selection.clone()));

        assert!(trainer.is_running());
        assert_eq!(trainer.current_beat_index(), 0);
        assert_eq!(trainer.bpm(), 90);
        assert_eq!(trainer.selection(), selection);
        assert_eq!(trainer.slots().unwrap().current.to_string(), "Em7");
    }

    #[test]
    fn test_commands() {
        let mut trainer = trainer(80);
        trainer.handle(Command::AdjustBpm(500));
        assert_eq!(trainer.bpm(), 240);
        trainer.handle(Command::SetBeatsPerBar(3));
        trainer.handle(Command::Start);
        trainer.run_until(Duration::from_millis(1000));
        assert_eq!(trainer.current_beat_index(), 0);
        assert!(!trainer.handle(Command::Quit));
        assert!(!trainer.is_running());
    }

    #[test]
    fn test_load_while_stopped_stays_stopped() {
        let mut trainer = trainer(120);
        trainer.load(ChordPlayParams::new(100, ChordSelection::all()));
        assert!(!trainer.is_running());
        assert_eq!(trainer.bpm(), 100);
    }
}
