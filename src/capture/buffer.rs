use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Fixed-capacity recording buffer shared between the capture callback
/// and the control thread.
///
/// Single-writer discipline: bulk samples and the fill length advance
/// only from the capture callback; the control thread resets the length
/// between sessions (while the recording flag is off, so the callback is
/// quiescent) and snapshots the filled region for playback. Storage is
/// allocated once and never resized.
pub struct CaptureBuffer {
    samples: Mutex<Vec<f32>>,
    len: AtomicUsize,
    capacity: usize,
}

impl CaptureBuffer {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            samples: Mutex::new(vec![0.0; capacity]),
            len: AtomicUsize::new(0),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames recorded so far.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset the fill length to zero. Control thread only, and only
    /// while recording is off.
    pub fn clear(&self) {
        self.len.store(0, Ordering::Release);
    }

    /// Append frames at the current fill point. Writes that would run
    /// past capacity are truncated rather than wrapped or rejected.
    /// Returns the number of frames actually written.
    ///
    /// Called from the capture callback; uses `try_lock` so a concurrent
    /// snapshot can never stall the real-time thread. A failed lock
    /// drops this block of frames (contention is only possible while a
    /// playback snapshot is in progress).
    pub fn append(&self, input: &[f32]) -> usize {
        let Some(mut samples) = self.samples.try_lock() else {
            return 0;
        };
        let len = self.len.load(Ordering::Acquire);
        let n = input.len().min(self.capacity - len);
        samples[len..len + n].copy_from_slice(&input[..n]);
        self.len.store(len + n, Ordering::Release);
        n
    }

    /// Copy of the filled region, frames `0..len`. Control thread only.
    pub fn snapshot(&self) -> Vec<f32> {
        let samples = self.samples.lock();
        let len = self.len.load(Ordering::Acquire).min(samples.len());
        samples[..len].to_vec()
    }
}
