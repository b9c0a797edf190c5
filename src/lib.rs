// Beat Trainer - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod chords;
pub mod config;
pub mod messaging;
pub mod sequencer;
pub mod storage;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioFeedback, ClickEngine, open_click_output};
pub use chords::{
    ChordEvent, ChordPlayParams, ChordQuality, ChordRotation, ChordSelection, ChordSelector,
    ChordSlots, ChordTrainer, PitchClass, Tension,
};
pub use config::AppConfig;
pub use messaging::{Command, create_click_channel, create_command_channel};
pub use sequencer::{
    BeatClock, BeatTick, ClickType, ClockEvent, FeedbackSink, Metronome, RealtimeScheduler,
    Scheduler, SilentFeedback, TempoConfig, TempoMarking, TempoMode, VirtualScheduler,
    adjust_bpm, clamp_bpm,
};
pub use storage::{
    ChordSettings, ChordsPreset, FileStore, KeyValueStore, MemoryStore, MetronomePreset,
    PresetLibrary, StorageError, ThemeMode,
};
