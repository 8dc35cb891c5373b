mod tone;

pub use tone::ToneGenerator;
