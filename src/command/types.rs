use std::sync::Arc;

/// Commands bound for the render callback.
///
/// Produced on the control domain (the control surface or the metronome
/// scheduler thread) and drained non-blockingly at the top of each output
/// callback. Payloads are `Arc`s so the callback only ever clones a
/// pointer, never sample data.
#[derive(Debug, Clone)]
pub enum RenderCommand {
    /// Play the tick clip starting at `start` on the tick player's
    /// own sample timeline.
    ScheduleTick { start: u64 },

    /// Drop all pending ticks and rewind the tick player's timeline to
    /// zero. Issued on tempo changes and metronome stop.
    ResetTickPlayer,

    /// Queue a captured buffer for playback. Starts immediately, or
    /// after the clips already queued (FIFO).
    PlayClip(Arc<Vec<f32>>),
}
