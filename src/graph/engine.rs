use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use crossbeam_channel::bounded;

use super::{Controls, Renderer};
use crate::assets::TickClip;
use crate::capture::{CaptureBuffer, CaptureSink, CAPTURE_SECONDS};
use crate::command::{RenderBus, RenderCommand, RenderSender};
use crate::metronome::{Metronome, MetronomeScheduler};

/// Initial control positions, applied during configuration so the first
/// rendered frame already reflects them.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// WAV file for the metronome tick; a built-in click when absent.
    pub tick_path: Option<PathBuf>,
    pub frequency: f64,
    pub bpm: f64,
    pub tone_volume: f32,
    pub metronome_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_path: None,
            frequency: 100.0,
            bpm: 60.0,
            tone_volume: 0.5,
            metronome_volume: 0.5,
        }
    }
}

/// The assembled audio graph and its session lifecycle.
///
/// `new` is the configuration step: it loads the tick asset, negotiates
/// formats with the host audio subsystem (cpal, injected by the
/// platform, not global state of this engine), wires the renderer into
/// the output stream and the capture sink into the input stream, and
/// spawns the scheduler thread. No callback fires before `start()`.
/// Reconfiguration is dropping the engine and building a new one.
pub struct AudioEngine {
    // Declared first so teardown stops the scheduler before the streams:
    // no in-flight tick can be scheduled into a stopped graph.
    scheduler: MetronomeScheduler,
    output: Stream,
    input: Option<Stream>,
    controls: Arc<Controls>,
    capture: Arc<CaptureBuffer>,
    render_tx: RenderSender,
}

impl AudioEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device available")?;
        let output_config = device
            .default_output_config()
            .context("No default output config")?;
        let sample_rate = output_config.sample_rate().0 as f64;

        let tick = match &config.tick_path {
            Some(path) => TickClip::load(path, sample_rate)?,
            None => TickClip::synthesized(sample_rate),
        };

        let controls = Controls::new(
            config.frequency,
            config.bpm,
            config.tone_volume,
            config.metronome_volume,
        );
        let bus = RenderBus::new();
        let (completions_tx, completions_rx) = bounded(64);

        let renderer = Renderer::new(
            sample_rate,
            tick.samples.clone(),
            controls.clone(),
            bus.receiver(),
            completions_tx,
        );
        let output = match output_config.sample_format() {
            SampleFormat::F32 => {
                build_output_stream::<f32>(&device, &output_config.into(), renderer)?
            }
            SampleFormat::I16 => {
                build_output_stream::<i16>(&device, &output_config.into(), renderer)?
            }
            SampleFormat::U16 => {
                build_output_stream::<u16>(&device, &output_config.into(), renderer)?
            }
            format => anyhow::bail!("Unsupported output sample format: {:?}", format),
        };

        let (input, capture) = match host.default_input_device() {
            Some(in_device) => {
                let in_config = in_device
                    .default_input_config()
                    .context("No default input config")?;
                let in_rate = in_config.sample_rate().0 as f64;
                let capture = CaptureBuffer::new((in_rate * CAPTURE_SECONDS) as usize);
                let sink = CaptureSink::new(capture.clone(), controls.recording.clone());
                let stream = match in_config.sample_format() {
                    SampleFormat::F32 => {
                        build_input_stream::<f32>(&in_device, &in_config.into(), sink)?
                    }
                    SampleFormat::I16 => {
                        build_input_stream::<i16>(&in_device, &in_config.into(), sink)?
                    }
                    SampleFormat::U16 => {
                        build_input_stream::<u16>(&in_device, &in_config.into(), sink)?
                    }
                    format => anyhow::bail!("Unsupported input sample format: {:?}", format),
                };
                (Some(stream), capture)
            }
            None => {
                eprintln!("Warning: no input device available, recording disabled");
                (None, CaptureBuffer::new((sample_rate * CAPTURE_SECONDS) as usize))
            }
        };

        let scheduler = MetronomeScheduler::spawn(
            Metronome::new(tick.native_rate, sample_rate),
            controls.bpm.clone(),
            controls.render_position.clone(),
            bus.sender(),
            completions_rx,
        )?;

        Ok(Self {
            scheduler,
            output,
            input,
            controls,
            capture,
            render_tx: bus.sender(),
        })
    }

    /// Activate hardware I/O, then start the metronome chain.
    /// A failure here is retryable: call `start` again.
    pub fn start(&self) -> Result<()> {
        self.output.play().context("Failed to start audio output")?;
        if let Some(input) = &self.input {
            input.play().context("Failed to start audio input")?;
        }
        self.scheduler.start();
        Ok(())
    }

    /// Stop players before hardware: scheduler chain first, then the
    /// streams, and invalidate the published render time.
    pub fn stop(&self) -> Result<()> {
        self.scheduler.stop();
        self.controls.render_position.set(None);
        self.output.pause().context("Failed to stop audio output")?;
        if let Some(input) = &self.input {
            input.pause().context("Failed to stop audio input")?;
        }
        Ok(())
    }

    pub fn set_frequency(&self, hz: f64) {
        self.controls.frequency.set(hz);
    }

    /// Tempo change: the tick grid restarts at the new spacing.
    pub fn set_bpm(&self, bpm: f64) {
        self.scheduler.set_bpm(bpm);
    }

    /// Tone path gain; 0 mutes.
    pub fn set_tone_volume(&self, gain: f32) {
        self.controls.tone_volume.set(gain.clamp(0.0, 1.0));
    }

    /// Metronome path gain; 0 mutes (the chain keeps ticking).
    pub fn set_metronome_volume(&self, gain: f32) {
        self.controls.metronome_volume.set(gain.clamp(0.0, 1.0));
    }

    /// Toggle recording. Starting a session clears the previous take
    /// before the capture callback can observe the raised flag.
    pub fn set_recording(&self, recording: bool) {
        if recording && !self.controls.recording.get() {
            self.capture.clear();
        }
        self.controls.recording.set(recording);
    }

    pub fn is_recording(&self) -> bool {
        self.controls.recording.get()
    }

    /// Frames captured in the current take.
    pub fn recorded_frames(&self) -> usize {
        self.capture.len()
    }

    /// Replay the captured buffer. While playback is already sounding,
    /// the new take queues behind it (first-in-first-out).
    pub fn play_recording(&self) {
        if self.capture.is_empty() {
            eprintln!("Nothing recorded yet");
            return;
        }
        let snapshot = Arc::new(self.capture.snapshot());
        self.render_tx.send(RenderCommand::PlayClip(snapshot));
    }
}

fn build_output_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut renderer: Renderer,
) -> Result<Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            let mix = renderer.render(frames);
            // the mono mix goes identically into every channel
            for (frame, &sample) in data.chunks_mut(channels).zip(mix) {
                for channel_sample in frame.iter_mut() {
                    *channel_sample = T::from_sample(sample);
                }
            }
        },
        |err| {
            eprintln!("Audio output stream error: {}", err);
        },
        None,
    )?;
    Ok(stream)
}

fn build_input_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut sink: CaptureSink,
) -> Result<Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels as usize;
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            sink.deliver(data, channels);
        },
        |err| {
            eprintln!("Audio input stream error: {}", err);
        },
        None,
    )?;
    Ok(stream)
}
