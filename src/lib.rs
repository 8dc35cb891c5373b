//! Real-time audio signal graph: a continuous sine tone, a
//! sample-accurate self-rescheduling metronome, and a bounded
//! microphone capture path with on-demand replay.
//!
//! The crate splits into two scheduling domains. The control domain
//! (the CLI surface and the metronome scheduler thread) mutates shared
//! parameters through [`sync::SynchronizedCell`] and sends bounded
//! commands toward the audio thread. The real-time domain (the cpal
//! render and capture callbacks) reads those parameters and produces or
//! consumes samples without blocking, allocating, or erroring across
//! the callback boundary.

pub mod assets;
pub mod capture;
pub mod command;
pub mod graph;
pub mod metronome;
pub mod player;
pub mod sync;
pub mod synth;
