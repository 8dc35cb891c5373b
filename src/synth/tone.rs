use std::f64::consts::TAU;

/// Sine synthesis driven by an absolute sample index.
///
/// The generator keeps no phase state: every sample is a pure function of
/// the absolute frame index, the sample rate, and the frequency passed in.
/// Restarting at any index is always consistent, and splitting a render
/// into smaller chunks with offset indices produces identical output.
/// Runs inside the render callback, so it never allocates or locks.
pub struct ToneGenerator {
    sample_rate: f64,
}

impl ToneGenerator {
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// One sample of `sin(2π · f · frame / sample_rate)`.
    #[inline]
    pub fn sample(&self, frame: u64, frequency: f64) -> f32 {
        let t = frame as f64 / self.sample_rate;
        (TAU * frequency * t).sin() as f32
    }

    /// Fill `out` with consecutive samples starting at absolute `start`.
    pub fn render(&self, start: u64, frequency: f64, out: &mut [f32]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.sample(start + i as u64, frequency);
        }
    }
}
