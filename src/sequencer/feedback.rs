// Feedback - Audio and haptic outputs triggered by the beat clock

/// Which click sound a tick should trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    /// First beat of a bar (downbeat)
    Accent,
    /// Any other primary beat
    Regular,
    /// Secondary click between two primary beats
    Subdivision,
}

/// Strength of the haptic pulse sent on a primary beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticIntensity {
    /// Downbeat
    Medium,
    Light,
}

impl HapticIntensity {
    pub fn for_beat(beat_index: u8) -> Self {
        if beat_index == 0 {
            HapticIntensity::Medium
        } else {
            HapticIntensity::Light
        }
    }
}

/// Errors raised while triggering feedback
///
/// The clock logs these and carries on; they never stop playback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Click queue is full, trigger dropped")]
    QueueFull,

    #[error("Output device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Destination for the clock's audio and haptic triggers
///
/// Implementations must return quickly: triggers are fire-and-forget and
/// the clock does not wait for a sound to finish.
pub trait FeedbackSink {
    /// Start playing a click
    fn play_click(&mut self, click: ClickType) -> Result<(), FeedbackError>;

    /// Fire a haptic pulse. Platforms without haptics ignore it.
    fn haptic_pulse(&mut self, _intensity: HapticIntensity) {}
}

/// Feedback sink that does nothing (sound disabled, or no output device)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn play_click(&mut self, _click: ClickType) -> Result<(), FeedbackError> {
        Ok(())
    }
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for Box<T> {
    fn play_click(&mut self, click: ClickType) -> Result<(), FeedbackError> {
        (**self).play_click(click)
    }

    fn haptic_pulse(&mut self, intensity: HapticIntensity) {
        (**self).haptic_pulse(intensity)
    }
}
