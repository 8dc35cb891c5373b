mod buffer;
mod sink;

pub use buffer::CaptureBuffer;
pub use sink::CaptureSink;

/// Capture buffer capacity in seconds of input audio.
pub const CAPTURE_SECONDS: f64 = 30.0;
