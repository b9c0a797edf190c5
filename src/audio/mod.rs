// Module audio - CPAL backend playing the metronome clicks

pub mod click;
pub mod engine;

pub use click::{ClickSound, ClickVoice};
pub use engine::{AudioFeedback, ClickEngine, open_click_output};

/// Errors raised while opening the audio output
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Audio configuration error: {0}")]
    Config(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Error in stream creation: {0}")]
    BuildStream(String),

    #[error("Error starting stream: {0}")]
    PlayStream(String),
}
