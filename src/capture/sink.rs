use std::sync::Arc;

use cpal::{FromSample, Sample};

use super::buffer::CaptureBuffer;
use crate::sync::SynchronizedCell;

/// Scratch size for folding interleaved input down to mono, in frames.
const SCRATCH_FRAMES: usize = 4096;

/// Append path for the input stream.
///
/// On each capture callback delivery, copies the incoming frames into
/// the capture buffer while the recording flag is set; does nothing
/// otherwise. Multi-channel input is folded to channel 0, matching the
/// mono capture format. The scratch buffer is preallocated so the
/// callback never allocates.
pub struct CaptureSink {
    buffer: Arc<CaptureBuffer>,
    recording: Arc<SynchronizedCell<bool>>,
    scratch: Vec<f32>,
}

impl CaptureSink {
    pub fn new(buffer: Arc<CaptureBuffer>, recording: Arc<SynchronizedCell<bool>>) -> Self {
        Self {
            buffer,
            recording,
            scratch: Vec::with_capacity(SCRATCH_FRAMES),
        }
    }

    /// Handle one capture callback of interleaved input samples.
    pub fn deliver<T>(&mut self, input: &[T], channels: usize)
    where
        T: cpal::SizedSample,
        f32: FromSample<T>,
    {
        if !self.recording.get() {
            return;
        }
        let channels = channels.max(1);
        for chunk in input.chunks(SCRATCH_FRAMES * channels) {
            self.scratch.clear();
            self.scratch.extend(
                chunk
                    .iter()
                    .step_by(channels)
                    .map(|&s| f32::from_sample(s)),
            );
            self.buffer.append(&self.scratch);
        }
    }
}
