// Click engine - CPAL output stream playing metronome clicks
//
// The clock thread pushes click triggers into a lock-free ring buffer; the
// audio callback drains it and renders the click voice. Clicks are mixed in
// f32 and converted to the device sample format when written out.
//
// Note: on macOS (CoreAudio) the Stream is not Send, so the engine has to stay
// on the thread that created it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer};

use super::AudioError;
use super::click::ClickVoice;
use crate::messaging::channels::{ClickConsumer, ClickProducer, create_click_channel};
use crate::sequencer::feedback::{ClickType, FeedbackError, FeedbackSink, HapticIntensity};

/// Room for pending triggers between two audio callbacks
pub const CLICK_QUEUE_CAPACITY: usize = 64;

pub struct ClickEngine {
    _stream: Stream,
    sample_rate: f32,
    channels: usize,
}

impl ClickEngine {
    /// Open the default output device and start playing triggers from `triggers`
    pub fn start(triggers: ClickConsumer, volume: f32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;
        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let config: StreamConfig = supported_config.into();
        let channels = config.channels as usize;

        let mut voice = ClickVoice::new(sample_rate);
        voice.set_volume(volume);

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, triggers, voice),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, triggers, voice),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, triggers, voice),
            other => Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    mut triggers: ClickConsumer,
    mut voice: ClickVoice,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // No allocations, no I/O, no locks
                while let Some(click) = triggers.try_pop() {
                    voice.trigger(click);
                }

                for frame in data.chunks_mut(channels) {
                    write_mono_frame(voice.next_sample(), frame);
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::BuildStream(e.to_string()))
}

/// Copy one mono sample to every channel of an interleaved frame
#[inline]
fn write_mono_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    let sample = sample.clamp(-1.0, 1.0);
    for channel_sample in frame.iter_mut() {
        *channel_sample = T::from_sample(sample);
    }
}

/// Feedback sink pushing clicks to a [`ClickEngine`]
pub struct AudioFeedback {
    triggers: ClickProducer,
    sound_enabled: bool,
    haptics_enabled: bool,
}

impl AudioFeedback {
    pub fn new(triggers: ClickProducer, sound_enabled: bool, haptics_enabled: bool) -> Self {
        Self {
            triggers,
            sound_enabled,
            haptics_enabled,
        }
    }
}

impl FeedbackSink for AudioFeedback {
    fn play_click(&mut self, click: ClickType) -> Result<(), FeedbackError> {
        if !self.sound_enabled {
            return Ok(());
        }
        self.triggers
            .try_push(click)
            .map_err(|_| FeedbackError::QueueFull)
    }

    fn haptic_pulse(&mut self, intensity: HapticIntensity) {
        // No vibration motor on desktop
        if self.haptics_enabled {
            log::trace!("Haptic pulse: {:?}", intensity);
        }
    }
}

/// Start the click engine and the sink feeding it
pub fn open_click_output(
    volume: f32,
    sound_enabled: bool,
    haptics_enabled: bool,
) -> Result<(ClickEngine, AudioFeedback), AudioError> {
    let (producer, consumer) = create_click_channel(CLICK_QUEUE_CAPACITY);
    let engine = ClickEngine::start(consumer, volume)?;
    Ok((engine, AudioFeedback::new(producer, sound_enabled, haptics_enabled)))
}
