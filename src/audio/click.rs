// Click sounds - Synthesized metronome clicks
// Pre-generates short click samples for low CPU overhead

use std::f32::consts::PI;

use crate::sequencer::feedback::ClickType;

/// Pre-rendered click samples, one buffer per click type
#[derive(Debug, Clone)]
pub struct ClickSound {
    accent: Vec<f32>,
    regular: Vec<f32>,
    subdivision: Vec<f32>,
}

impl ClickSound {
    const CLICK_DURATION_MS: f32 = 10.0;
    const SUBDIVISION_DURATION_MS: f32 = 6.0;

    pub fn new(sample_rate: f32) -> Self {
        let samples = |ms: f32| ((sample_rate * ms) / 1000.0) as usize;
        let click = samples(Self::CLICK_DURATION_MS);
        let short = samples(Self::SUBDIVISION_DURATION_MS);

        Self {
            accent: Self::generate(sample_rate, click, 1200.0, 0.6),
            regular: Self::generate(sample_rate, click, 800.0, 0.4),
            subdivision: Self::generate(sample_rate, short, 600.0, 0.25),
        }
    }

    /// Sine burst with a fast exponential decay
    fn generate(sample_rate: f32, num_samples: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / sample_rate;

        (0..num_samples)
            .map(|i| {
                let t = i as f32 / num_samples as f32;
                let envelope = (-t * 8.0).exp();
                (i as f32 * phase_increment).sin() * envelope * amplitude
            })
            .collect()
    }

    pub fn samples(&self, click: ClickType) -> &[f32] {
        match click {
            ClickType::Accent => &self.accent,
            ClickType::Regular => &self.regular,
            ClickType::Subdivision => &self.subdivision,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    click: ClickType,
    position: usize,
}

/// Monophonic click player
///
/// A new trigger cuts off the click still sounding.
#[derive(Debug, Clone)]
pub struct ClickVoice {
    sound: ClickSound,
    volume: f32,
    playback: Option<Playback>,
}

impl ClickVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sound: ClickSound::new(sample_rate),
            volume: 0.8,
            playback: None,
        }
    }

    /// Set volume (0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn trigger(&mut self, click: ClickType) {
        self.playback = Some(Playback { click, position: 0 });
    }

    pub fn is_active(&self) -> bool {
        self.playback.is_some()
    }

    /// Next output sample, 0.0 when silent
    pub fn next_sample(&mut self) -> f32 {
        let Some(playback) = self.playback.as_mut() else {
            return 0.0;
        };

        match self.sound.samples(playback.click).get(playback.position) {
            Some(sample) => {
                playback.position += 1;
                sample * self.volume
            }
            None => {
                self.playback = None;
                0.0
            }
        }
    }
}
