// Metronome - Metronome mode state around a beat clock
// Holds the tempo marking next to the clock and applies user commands.

use std::time::Duration;

use super::clock::{BeatClock, ClockObserver};
use super::feedback::FeedbackSink;
use super::scheduler::Scheduler;
use super::tempo::{TempoConfig, TempoMarking};
use crate::messaging::command::Command;
use crate::storage::StorageError;
use crate::storage::presets::MetronomePreset;

pub struct Metronome<S: Scheduler> {
    clock: BeatClock<S>,
    marking: &'static TempoMarking,
}

impl<S: Scheduler> Metronome<S> {
    /// Stopped metronome at 120 BPM, 4/4, no subdivisions
    pub fn new(scheduler: S) -> Self {
        Self {
            clock: BeatClock::new(scheduler, TempoConfig::metronome()),
            marking: TempoMarking::default_marking(),
        }
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.clock.set_feedback(feedback);
        self
    }

    pub fn subscribe(&mut self, observer: ClockObserver) {
        self.clock.subscribe(observer);
    }

    pub fn config(&self) -> TempoConfig {
        self.clock.config()
    }

    pub fn marking(&self) -> &'static TempoMarking {
        self.marking
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn current_beat_index(&self) -> u8 {
        self.clock.current_beat_index()
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

    pub fn set_bpm(&mut self, bpm: i32) {
        self.clock.set_config(self.config().with_bpm(bpm));
    }

    pub fn adjust_bpm(&mut self, delta: i32) {
        let mut config = self.config();
        config.adjust_bpm(delta);
        self.clock.set_config(config);
    }

    pub fn set_beats_per_bar(&mut self, beats: i32) {
        self.clock.set_config(self.config().with_beats_per_bar(beats));
    }

    pub fn set_subdivisions(&mut self, subdivisions: i32) {
        self.clock.set_config(self.config().with_subdivisions(subdivisions));
    }

    /// Move to the next marking and take over its tempo
    pub fn next_tempo_marking(&mut self) {
        let marking = TempoMarking::next_after(self.marking.name);
        self.select_marking(marking);
    }

    pub fn select_marking(&mut self, marking: &'static TempoMarking) {
        self.marking = marking;
        self.set_bpm(marking.bpm as i32);
    }

    /// Load a preset. An unknown marking name keeps the current marking.
    pub fn apply_preset(&mut self, preset: &MetronomePreset) {
        if let Some(marking) = preset.tempo_marking() {
            self.marking = marking;
        }
        self.clock.set_config(preset.tempo_config());
    }

    pub fn snapshot(&self, name: &str) -> Result<MetronomePreset, StorageError> {
        MetronomePreset::new(name, &self.config(), self.marking)
    }

    /// Apply one command. Returns `false` once the driver should quit.
    pub fn handle(&mut self, command: Command) -> bool {
        log::debug!("Metronome command: {:?}", command);
        match command {
            Command::Toggle => self.toggle(),
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::AdjustBpm(delta) => self.adjust_bpm(delta),
            Command::SetBpm(bpm) => self.set_bpm(bpm),
            Command::SetBeatsPerBar(beats) => self.set_beats_per_bar(beats),
            Command::SetSubdivisions(subdivisions) => self.set_subdivisions(subdivisions),
            Command::NextTempoMarking => self.next_tempo_marking(),
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
