use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use metrotone::graph::{AudioEngine, EngineConfig};

/// Metrotone - sine tone, metronome, and mic capture engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WAV file for the metronome tick (built-in click if omitted)
    #[arg(long)]
    tick: Option<PathBuf>,

    /// Initial tone frequency in Hz
    #[arg(long, default_value_t = 100.0)]
    frequency: f64,

    /// Initial tempo in beats per minute
    #[arg(long, default_value_t = 60.0)]
    bpm: f64,

    /// Initial tone volume, 0.0-1.0 (0 mutes)
    #[arg(long, default_value_t = 0.5)]
    tone_volume: f32,

    /// Initial metronome volume, 0.0-1.0 (0 mutes)
    #[arg(long, default_value_t = 0.5)]
    metronome_volume: f32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let engine = AudioEngine::new(&EngineConfig {
        tick_path: args.tick,
        frequency: args.frequency,
        bpm: args.bpm,
        tone_volume: args.tone_volume,
        metronome_volume: args.metronome_volume,
    })?;
    engine.start()?;

    println!("metrotone running. Commands:");
    println!("  freq <hz>     tone frequency");
    println!("  bpm <n>       metronome tempo (restarts the tick grid)");
    println!("  tone <0..1>   tone volume, 0 mutes");
    println!("  click <0..1>  metronome volume, 0 mutes");
    println!("  rec on|off    start/stop recording");
    println!("  play          replay the recorded buffer");
    println!("  quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("freq"), Some(v)) => match v.parse() {
                Ok(hz) => engine.set_frequency(hz),
                Err(_) => eprintln!("freq expects a number"),
            },
            (Some("bpm"), Some(v)) => match v.parse() {
                Ok(bpm) => engine.set_bpm(bpm),
                Err(_) => eprintln!("bpm expects a number"),
            },
            (Some("tone"), Some(v)) => match v.parse() {
                Ok(gain) => engine.set_tone_volume(gain),
                Err(_) => eprintln!("tone expects a number"),
            },
            (Some("click"), Some(v)) => match v.parse() {
                Ok(gain) => engine.set_metronome_volume(gain),
                Err(_) => eprintln!("click expects a number"),
            },
            (Some("rec"), Some("on")) => engine.set_recording(true),
            (Some("rec"), Some("off")) => {
                engine.set_recording(false);
                println!("Recorded {} frames", engine.recorded_frames());
            }
            (Some("play"), None) => engine.play_recording(),
            (Some("quit"), _) | (Some("exit"), _) => break,
            (None, _) => {}
            _ => eprintln!("Unknown command: {}", line),
        }
    }

    engine.stop()?;
    Ok(())
}
