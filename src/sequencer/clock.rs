// Beat Clock - Drives beat and subdivision ticks from a Scheduler
//
// One run = one chain of timers: a repeating beat timer plus, inside each
// beat, a short-lived subdivision timer. The subdivision timer is cancelled
// and recreated on every primary beat, so sub-ticks never cross a beat
// boundary. Any change to the tempo config while running tears the whole
// chain down and starts a fresh run.

use std::time::Duration;

use super::feedback::{ClickType, FeedbackSink, HapticIntensity, SilentFeedback};
use super::scheduler::{Scheduler, TimerHandle};
use super::tempo::TempoConfig;

/// A primary beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatTick {
    /// Position in the bar, 0 = downbeat
    pub beat_index: u8,
    /// Number of bars completed in this run before this tick's bar
    pub bar: u64,
    /// Scheduler time the tick fired at
    pub at: Duration,
}

/// A secondary click between two primary beats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivisionTick {
    /// Beat this click belongs to
    pub beat_index: u8,
    /// Position inside the beat, 1..subdivisions_per_beat (0 is the beat itself)
    pub subdivision: u8,
    pub at: Duration,
}

/// State changes published to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Started(TempoConfig),
    Beat(BeatTick),
    Subdivision(SubdivisionTick),
    Stopped,
}

/// Read-only subscription to clock events
pub type ClockObserver = Box<dyn FnMut(&ClockEvent)>;

/// Called once per completed bar with the number of bars completed so far
pub type BarHook = Box<dyn FnMut(u64)>;

#[derive(Debug)]
struct SubdivisionRun {
    timer: TimerHandle,
    fired: u8,
}

#[derive(Debug)]
struct Run {
    beat_timer: TimerHandle,
    subdivision: Option<SubdivisionRun>,
    beat_index: u8,
    beats_fired: u64,
    bars_completed: u64,
}

/// Metronome clock
///
/// Owns its scheduler. Drive it with [`BeatClock::run_until`] (or
/// [`BeatClock::advance`]) from a single loop; all callbacks run
/// synchronously inside those calls.
pub struct BeatClock<S: Scheduler> {
    scheduler: S,
    config: TempoConfig,
    feedback: Box<dyn FeedbackSink>,
    observers: Vec<ClockObserver>,
    bar_hook: Option<BarHook>,
    run: Option<Run>,
}

impl<S: Scheduler> BeatClock<S> {
    /// Create a stopped clock with silent feedback
    pub fn new(scheduler: S, config: TempoConfig) -> Self {
        Self {
            scheduler,
            config,
            feedback: Box::new(SilentFeedback),
            observers: Vec::new(),
            bar_hook: None,
            run: None,
        }
    }

    /// Replace the audio/haptic sink
    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn set_feedback(&mut self, feedback: Box<dyn FeedbackSink>) {
        self.feedback = feedback;
    }

    /// Register an observer for every clock event
    pub fn subscribe(&mut self, observer: ClockObserver) {
        self.observers.push(observer);
    }

    /// Install the bar-boundary hook, replacing any previous one
    pub fn set_bar_hook(&mut self, hook: BarHook) {
        self.bar_hook = Some(hook);
    }

    pub fn config(&self) -> TempoConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Current position in the bar (0 while stopped)
    pub fn current_beat_index(&self) -> u8 {
        self.run.as_ref().map_or(0, |run| run.beat_index)
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Start a run. The downbeat fires immediately, before this returns.
    pub fn start(&mut self) {
        if self.run.is_some() {
            return;
        }

        let beat_timer = self.scheduler.schedule_repeating(self.config.beat_interval());
        self.run = Some(Run {
            beat_timer,
            subdivision: None,
            beat_index: 0,
            beats_fired: 0,
            bars_completed: 0,
        });
        log::debug!("Beat clock started: {}", self.config);

        self.emit(ClockEvent::Started(self.config));
        let now = self.scheduler.now();
        self.fire_beat(now);
    }

    /// Stop the run, cancelling every pending timer
    pub fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };

        self.scheduler.cancel(run.beat_timer);
        if let Some(subdivision) = run.subdivision {
            self.scheduler.cancel(subdivision.timer);
        }
        log::debug!("Beat clock stopped after {} beats", run.beats_fired + 1);

        self.emit(ClockEvent::Stopped);
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Apply a new tempo config
    ///
    /// While running, a changed config restarts the clock exactly as a
    /// stop followed by a start would. An identical config is a no-op.
    pub fn set_config(&mut self, config: TempoConfig) {
        if config == self.config {
            return;
        }
        self.config = config;

        if self.is_running() {
            log::debug!("Tempo changed while running, restarting: {}", config);
            self.stop();
            self.start();
        }
    }

    /// Dispatch every timer due up to `deadline`. Returns the number of ticks fired.
    pub fn run_until(&mut self, deadline: Duration) -> usize {
        let mut fired = 0;
        while let Some((due, handle)) = self.scheduler.next_due(deadline) {
            if self.dispatch(due, handle) {
                fired += 1;
            }
        }
        fired
    }

    /// Dispatch every timer due within `duration` from now
    pub fn advance(&mut self, duration: Duration) -> usize {
        let deadline = self.scheduler.now() + duration;
        self.run_until(deadline)
    }

    fn dispatch(&mut self, due: Duration, handle: TimerHandle) -> bool {
        let Some(run) = self.run.as_mut() else {
            log::trace!("Timer {:?} fired with clock stopped", handle);
            return false;
        };

        if handle == run.beat_timer {
            run.beat_index = (run.beat_index + 1) % self.config.beats_per_bar();
            run.beats_fired += 1;
            self.fire_beat(due);
            true
        } else if run.subdivision.as_ref().is_some_and(|s| s.timer == handle) {
            self.fire_subdivision(due);
            true
        } else {
            log::trace!("Ignoring stale timer {:?}", handle);
            false
        }
    }

    /// `at` is the beat's due time; the sub-ticks are laid out from it so
    /// that a late wake-up does not shift them
    fn fire_beat(&mut self, at: Duration) {
        let subdivisions = self.config.subdivisions_per_beat();
        let Some(run) = self.run.as_mut() else {
            return;
        };

        if let Some(previous) = run.subdivision.take() {
            self.scheduler.cancel(previous.timer);
        }
        if subdivisions > 1 {
            let timer = self
                .scheduler
                .schedule_repeating_at(at, self.config.subdivision_interval());
            run.subdivision = Some(SubdivisionRun { timer, fired: 0 });
        }

        let beat_index = run.beat_index;
        let bar_completed = beat_index == 0 && run.beats_fired > 0;
        if bar_completed {
            run.bars_completed += 1;
        }
        let tick = BeatTick {
            beat_index,
            bar: run.bars_completed,
            at,
        };
        log::trace!("Beat {} of bar {} at {:?}", tick.beat_index, tick.bar, tick.at);

        let click = if beat_index == 0 {
            ClickType::Accent
        } else {
            ClickType::Regular
        };
        if let Err(e) = self.feedback.play_click(click) {
            log::warn!("Beat click failed: {}", e);
        }
        self.feedback
            .haptic_pulse(HapticIntensity::for_beat(beat_index));

        self.emit(ClockEvent::Beat(tick));

        if bar_completed && let Some(hook) = self.bar_hook.as_mut() {
            hook(tick.bar);
        }
    }

    fn fire_subdivision(&mut self, at: Duration) {
        let last = self.config.subdivisions_per_beat().saturating_sub(1);
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let Some(subdivision) = run.subdivision.as_mut() else {
            return;
        };

        subdivision.fired += 1;
        let tick = SubdivisionTick {
            beat_index: run.beat_index,
            subdivision: subdivision.fired,
            at,
        };

        // The last sub-tick of a beat retires the timer before the next beat
        if subdivision.fired >= last {
            self.scheduler.cancel(subdivision.timer);
            run.subdivision = None;
        }

        if let Err(e) = self.feedback.play_click(ClickType::Subdivision) {
            log::warn!("Subdivision click failed: {}", e);
        }
        self.emit(ClockEvent::Subdivision(tick));
    }

    fn emit(&mut self, event: ClockEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

impl<S: Scheduler> Drop for BeatClock<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
