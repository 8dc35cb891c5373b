mod scheduler;

pub use scheduler::MetronomeScheduler;

/// Where the metronome chain stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetronomeState {
    Stopped,
    /// First tick scheduled, waiting for its completion.
    Armed,
    /// Completion chain is live and self-sustaining.
    Playing,
}

/// Instruction for the render thread: play the tick clip starting at
/// `start` on the tick player's timeline (engine sample rate).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSchedule {
    pub start: u64,
}

/// Sample-accurate tick scheduling.
///
/// Keeps the clock base in the tick clip's native sample-time base, the
/// same way the playback times are derived from the clip's own format.
/// The base only ever increases between restarts; each completion
/// advances it by one tempo interval and yields exactly one future
/// schedule, so the chain sustains itself without recursion or races.
pub struct Metronome {
    state: MetronomeState,
    base: u64,
    native_rate: f64,
    engine_rate: f64,
}

impl Metronome {
    pub fn new(native_rate: f64, engine_rate: f64) -> Self {
        Self {
            state: MetronomeState::Stopped,
            base: 0,
            native_rate,
            engine_rate,
        }
    }

    pub fn state(&self) -> MetronomeState {
        self.state
    }

    /// Frames between ticks at `bpm`, in the native time base.
    /// Truncating integer arithmetic: fixed, reproducible spacing.
    pub fn interval(&self, bpm: f64) -> u64 {
        (60.0 * self.native_rate / bpm) as u64
    }

    /// Begin the chain: reset the clock and schedule the first tick at
    /// sample 0 of the playback timeline.
    pub fn start(&mut self) -> TickSchedule {
        self.base = 0;
        self.state = MetronomeState::Armed;
        TickSchedule { start: 0 }
    }

    pub fn stop(&mut self) {
        self.state = MetronomeState::Stopped;
        self.base = 0;
    }

    /// Handle a tick-finished notification.
    ///
    /// `render_position` is the tick player's current timeline position,
    /// `None` while the graph has not rendered anything (or is stopped).
    /// Returns the next schedule, or `None` when the chain is stopped or
    /// this cycle is skipped because no valid render time is available.
    /// A skipped cycle stalls the chain until an explicit restart.
    pub fn on_tick_complete(
        &mut self,
        render_position: Option<u64>,
        bpm: f64,
    ) -> Option<TickSchedule> {
        if self.state == MetronomeState::Stopped {
            return None;
        }
        render_position?;
        self.state = MetronomeState::Playing;
        self.base += self.interval(bpm);
        Some(TickSchedule {
            start: self.to_engine_time(self.base),
        })
    }

    /// Convert an absolute native-base sample time to the engine
    /// timeline. Rescaling the absolute value (not the increments)
    /// keeps the conversion free of accumulated rounding drift.
    fn to_engine_time(&self, native: u64) -> u64 {
        if self.native_rate == self.engine_rate {
            native
        } else {
            (native as f64 * self.engine_rate / self.native_rate) as u64
        }
    }
}
