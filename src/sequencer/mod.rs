// Sequencer module
// Tempo model, timer scheduling, the beat clock and metronome mode

pub mod clock;
pub mod feedback;
pub mod metronome;
pub mod scheduler;
pub mod tempo;

pub use clock::{BarHook, BeatClock, BeatTick, ClockEvent, ClockObserver, SubdivisionTick};
pub use feedback::{ClickType, FeedbackError, FeedbackSink, HapticIntensity, SilentFeedback};
pub use metronome::Metronome;
pub use scheduler::{RealtimeScheduler, Scheduler, TimerHandle, TimerQueue, VirtualScheduler};
pub use tempo::{
    BpmRange, TEMPO_MARKINGS, TempoConfig, TempoMarking, TempoMode, adjust_bpm, clamp_bpm,
};
