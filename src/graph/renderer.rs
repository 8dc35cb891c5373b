use std::sync::Arc;

use crossbeam_channel::Sender;

use super::Controls;
use crate::command::{RenderCommand, RenderReceiver};
use crate::player::{ClipPlayer, ClipTag, Completion, ScheduledClip};
use crate::synth::ToneGenerator;

/// Mix buffer size in frames; covers any common host period.
const MIX_FRAMES: usize = 8192;

/// The output-side signal graph, independent of the audio backend.
///
/// Owns the tone generator and the two clip players and sums them into
/// a mono master buffer: tone through the tone gain, tick player through
/// the metronome gain, recording player at unity. Render commands are
/// drained non-blockingly at the top of each cycle, and the tick
/// player's timeline position is published afterwards for the scheduler
/// thread's render-time queries.
pub struct Renderer {
    tone: ToneGenerator,
    tick_player: ClipPlayer,
    recording_player: ClipPlayer,
    tick_clip: Arc<Vec<f32>>,
    clock: u64,
    mix: Vec<f32>,
    controls: Arc<Controls>,
    commands: RenderReceiver,
    completions: Sender<Completion>,
}

impl Renderer {
    pub fn new(
        sample_rate: f64,
        tick_clip: Arc<Vec<f32>>,
        controls: Arc<Controls>,
        commands: RenderReceiver,
        completions: Sender<Completion>,
    ) -> Self {
        Self {
            tone: ToneGenerator::new(sample_rate),
            tick_player: ClipPlayer::new(),
            recording_player: ClipPlayer::new(),
            tick_clip,
            clock: 0,
            mix: vec![0.0; MIX_FRAMES],
            controls,
            commands,
            completions,
        }
    }

    /// Render `frames` mono frames and return the mixed buffer.
    pub fn render(&mut self, frames: usize) -> &[f32] {
        while let Some(cmd) = self.commands.try_recv() {
            match cmd {
                RenderCommand::ScheduleTick { start } => {
                    self.tick_player.schedule(ScheduledClip {
                        samples: self.tick_clip.clone(),
                        start,
                        tag: ClipTag::Tick,
                    });
                }
                RenderCommand::ResetTickPlayer => self.tick_player.reset(),
                RenderCommand::PlayClip(samples) => {
                    self.recording_player.append(samples, ClipTag::Recording);
                }
            }
        }

        if frames > self.mix.len() {
            // only reachable with an unusually large host period
            self.mix.resize(frames, 0.0);
        }
        let mix = &mut self.mix[..frames];
        mix.fill(0.0);

        // Tone path: pure function of the absolute sample clock, gain
        // applied at the mix. The clock advances even while muted so the
        // tone stays on its absolute time base.
        let frequency = self.controls.frequency.get();
        let tone_gain = self.controls.tone_volume.get();
        if tone_gain != 0.0 {
            for (i, slot) in mix.iter_mut().enumerate() {
                *slot += self.tone.sample(self.clock + i as u64, frequency) * tone_gain;
            }
        }
        self.clock += frames as u64;

        // Player paths. Both advance their timelines regardless of gain:
        // a muted metronome still ticks and still completes.
        let metronome_gain = self.controls.metronome_volume.get();
        self.tick_player
            .render_add(mix, metronome_gain, &self.completions);
        self.recording_player
            .render_add(mix, 1.0, &self.completions);

        self.controls
            .render_position
            .set(self.tick_player.position());

        &self.mix[..frames]
    }
}
