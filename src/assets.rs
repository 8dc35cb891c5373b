use std::f64::consts::TAU;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

/// The metronome's tick sound: a short clip loaded once at startup and
/// immutable afterwards.
///
/// Sample data is folded to mono and resampled to the engine rate for
/// playback; `native_rate` keeps the file's own sample rate, which is
/// the time base all tick scheduling math runs in.
pub struct TickClip {
    pub samples: Arc<Vec<f32>>,
    pub native_rate: f64,
}

impl TickClip {
    /// Load a WAV tick clip from disk.
    pub fn load(path: &Path, engine_rate: f64) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open tick clip: {}", path.display()))?;

        let spec = reader.spec();
        let channels = spec.channels as usize;
        let native_rate = spec.sample_rate as f64;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .filter_map(|s| s.ok())
                    .map(|s| s as f32 / max_val)
                    .collect()
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .filter_map(|s| s.ok())
                .collect(),
        };

        if samples.is_empty() {
            bail!("Tick clip is empty: {}", path.display());
        }

        // Fold to mono (average channels)
        let mono: Vec<f32> = if channels > 1 {
            samples
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        } else {
            samples
        };

        Ok(Self {
            samples: Arc::new(resample(&mono, native_rate, engine_rate)),
            native_rate,
        })
    }

    /// Built-in click used when no tick file is given: a 30 ms burst of
    /// 2 kHz sine under an exponential decay.
    pub fn synthesized(engine_rate: f64) -> Self {
        let len = (engine_rate * 0.03) as usize;
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f64 / engine_rate;
                ((TAU * 2000.0 * t).sin() * (-t * 140.0).exp() * 0.9) as f32
            })
            .collect();
        Self {
            samples: Arc::new(samples),
            native_rate: engine_rate,
        }
    }
}

/// Linear-interpolation resampling from `from_rate` to `to_rate`.
fn resample(mono: &[f32], from_rate: f64, to_rate: f64) -> Vec<f32> {
    if (from_rate - to_rate).abs() <= 1.0 {
        return mono.to_vec();
    }
    let ratio = from_rate / to_rate;
    let new_len = (mono.len() as f64 / ratio) as usize;
    let mut resampled = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let s0 = mono.get(idx).copied().unwrap_or(0.0);
        let s1 = mono.get(idx + 1).copied().unwrap_or(s0);
        resampled.push(s0 + (s1 - s0) * frac);
    }
    resampled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_click_is_short_and_decays() {
        let clip = TickClip::synthesized(44100.0);
        assert_eq!(clip.native_rate, 44100.0);
        assert_eq!(clip.samples.len(), 1323); // 30 ms at 44.1 kHz
        let head: f32 = clip.samples[..100].iter().map(|s| s.abs()).sum();
        let tail: f32 = clip.samples[clip.samples.len() - 100..]
            .iter()
            .map(|s| s.abs())
            .sum();
        assert!(head > tail * 4.0, "click should decay: {head} vs {tail}");
    }

    #[test]
    fn resample_halves_length_going_up_an_octave() {
        let input = vec![0.5f32; 1000];
        let out = resample(&input, 88200.0, 44100.0);
        assert_eq!(out.len(), 500);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn resample_is_identity_at_matching_rates() {
        let input = vec![0.25f32, -0.25, 0.75];
        assert_eq!(resample(&input, 44100.0, 44100.0), input);
    }

    #[test]
    fn load_roundtrips_a_wav_file() {
        let dir = std::env::temp_dir().join("metrotone-test-assets");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tick.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..441 {
            let s = ((TAU * 1000.0 * i as f64 / 44100.0).sin() * 0.5 * i16::MAX as f64) as i16;
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let clip = TickClip::load(&path, 44100.0).unwrap();
        assert_eq!(clip.native_rate, 44100.0);
        assert_eq!(clip.samples.len(), 441);
        assert!((clip.samples[0]).abs() < 1e-3);
    }

    #[test]
    fn load_missing_file_is_a_config_error() {
        let err = TickClip::load(Path::new("/nonexistent/tick.wav"), 44100.0);
        assert!(err.is_err());
    }
}
