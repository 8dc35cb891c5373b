mod engine;
mod renderer;

pub use engine::{AudioEngine, EngineConfig};
pub use renderer::Renderer;

use std::sync::Arc;

use crate::sync::SynchronizedCell;

/// Parameters shared between the control surface and the audio
/// callbacks. Every cross-domain value goes through a SynchronizedCell;
/// the cells the scheduler thread and capture path also share are
/// individually Arc'd so they can be handed out without the whole
/// struct.
pub struct Controls {
    pub frequency: SynchronizedCell<f64>,
    pub bpm: Arc<SynchronizedCell<f64>>,
    pub tone_volume: SynchronizedCell<f32>,
    pub metronome_volume: SynchronizedCell<f32>,
    pub recording: Arc<SynchronizedCell<bool>>,
    /// Tick player timeline position, published by the render callback
    /// after each cycle; `None` until rendering has begun.
    pub render_position: Arc<SynchronizedCell<Option<u64>>>,
}

impl Controls {
    pub fn new(frequency: f64, bpm: f64, tone_volume: f32, metronome_volume: f32) -> Arc<Self> {
        Arc::new(Self {
            frequency: SynchronizedCell::new(frequency),
            bpm: Arc::new(SynchronizedCell::new(bpm)),
            tone_volume: SynchronizedCell::new(tone_volume),
            metronome_volume: SynchronizedCell::new(metronome_volume),
            recording: Arc::new(SynchronizedCell::new(false)),
            render_position: Arc::new(SynchronizedCell::new(None)),
        })
    }
}
