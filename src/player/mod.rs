use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::Sender;

/// Pending clips a player will hold without reallocating its queue.
const QUEUE_CAPACITY: usize = 16;

/// Identifies which playback chain a completion notice belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipTag {
    Tick,
    Recording,
}

/// A clip placed on a player's own sample timeline.
#[derive(Clone)]
pub struct ScheduledClip {
    pub samples: Arc<Vec<f32>>,
    pub start: u64,
    pub tag: ClipTag,
}

/// Sent to the scheduler thread when a scheduled clip finishes playing.
#[derive(Clone, Copy, Debug)]
pub struct Completion {
    pub tag: ClipTag,
}

/// Plays scheduled clips against a monotonic sample-time base.
///
/// Lives inside the render callback. The timeline advances one frame per
/// rendered frame; a clip scheduled at `start` begins sounding when the
/// timeline reaches that position (or immediately, partway in, if it was
/// scheduled late). When a clip's last frame has passed, a completion
/// notice is pushed to the scheduler thread over a bounded channel.
/// Clips retire in FIFO order, matching an ordered player timeline.
pub struct ClipPlayer {
    position: u64,
    started: bool,
    queue: VecDeque<ScheduledClip>,
}

impl ClipPlayer {
    pub fn new() -> Self {
        Self {
            position: 0,
            started: false,
            queue: VecDeque::with_capacity(QUEUE_CAPACITY),
        }
    }

    /// Current timeline position, `None` until the first render.
    pub fn position(&self) -> Option<u64> {
        self.started.then_some(self.position)
    }

    /// Place a clip at an absolute timeline position.
    pub fn schedule(&mut self, clip: ScheduledClip) {
        self.queue.push_back(clip);
    }

    /// Queue a clip to start now, or after everything already queued
    /// (first-in-first-out, never interrupting active playback).
    pub fn append(&mut self, samples: Arc<Vec<f32>>, tag: ClipTag) {
        let start = self
            .queue
            .back()
            .map(|c| (c.start + c.samples.len() as u64).max(self.position))
            .unwrap_or(self.position);
        self.queue.push_back(ScheduledClip {
            samples,
            start,
            tag,
        });
    }

    /// Drop all pending clips and rewind the timeline to zero.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.position = 0;
        self.started = false;
    }

    /// Mix `out.len()` frames of playback into `out`, scaled by `gain`,
    /// and advance the timeline. Clips that end inside this buffer emit
    /// a completion notice on `completions` (non-blocking; a full
    /// channel drops the notice rather than stall the render thread).
    pub fn render_add(&mut self, out: &mut [f32], gain: f32, completions: &Sender<Completion>) {
        self.started = true;
        for (i, slot) in out.iter_mut().enumerate() {
            let pos = self.position + i as u64;
            for clip in &self.queue {
                if pos < clip.start {
                    continue;
                }
                let idx = (pos - clip.start) as usize;
                if idx < clip.samples.len() {
                    *slot += clip.samples[idx] * gain;
                }
            }
        }
        self.position += out.len() as u64;

        // Retire finished clips from the front of the queue.
        while self
            .queue
            .front()
            .is_some_and(|c| c.start + c.samples.len() as u64 <= self.position)
        {
            if let Some(done) = self.queue.pop_front() {
                let _ = completions.try_send(Completion { tag: done.tag });
            }
        }
    }
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new()
    }
}
