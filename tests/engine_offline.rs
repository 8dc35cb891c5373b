//! End-to-end scenarios driven offline: the renderer is pumped by hand
//! instead of a hardware callback, with the real scheduler thread and
//! channels in between.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;

use metrotone::capture::{CaptureBuffer, CaptureSink};
use metrotone::command::{RenderBus, RenderCommand};
use metrotone::graph::{Controls, Renderer};
use metrotone::metronome::{Metronome, MetronomeScheduler};
use metrotone::player::ClipTag;

const RATE: f64 = 44100.0;

/// A full metronome stack: muted tone, unity click gain, 1000-frame
/// all-ones tick clip so tick placement is visible in the output.
fn metronome_stack(bpm: f64) -> (Renderer, MetronomeScheduler, Arc<Controls>) {
    let controls = Controls::new(440.0, bpm, 0.0, 1.0);
    let bus = RenderBus::new();
    let (completions_tx, completions_rx) = bounded(64);
    let renderer = Renderer::new(
        RATE,
        Arc::new(vec![1.0f32; 1000]),
        controls.clone(),
        bus.receiver(),
        completions_tx,
    );
    let scheduler = MetronomeScheduler::spawn(
        Metronome::new(RATE, RATE),
        controls.bpm.clone(),
        controls.render_position.clone(),
        bus.sender(),
        completions_rx,
    )
    .unwrap();
    (renderer, scheduler, controls)
}

/// Render in hardware-sized blocks, pausing between blocks so the
/// scheduler thread gets to react to completions.
fn pump(renderer: &mut Renderer, out: &mut Vec<f32>, until: usize) {
    while out.len() < until {
        out.extend_from_slice(renderer.render(512));
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn metronome_ticks_land_on_the_tempo_grid() {
    // bpm=120 at 44100 Hz: ticks at samples 0, 22050, 44100
    let (mut renderer, scheduler, _controls) = metronome_stack(120.0);
    scheduler.start();
    thread::sleep(Duration::from_millis(100));

    let mut out = Vec::new();
    pump(&mut renderer, &mut out, 50_000);

    for start in [0usize, 22050, 44100] {
        assert_eq!(out[start], 1.0, "tick missing at {start}");
        assert_eq!(out[start + 999], 1.0, "tick truncated at {start}");
    }
    assert!(out[1000..22050].iter().all(|&s| s == 0.0));
    assert!(out[23050..44100].iter().all(|&s| s == 0.0));
}

#[test]
fn tempo_change_requantizes_from_sample_zero() {
    let (mut renderer, scheduler, _controls) = metronome_stack(120.0);
    scheduler.start();
    thread::sleep(Duration::from_millis(100));

    let mut out = Vec::new();
    pump(&mut renderer, &mut out, 2048);

    // the change stops the grid and restarts it immediately at 240 bpm
    scheduler.set_bpm(240.0);
    thread::sleep(Duration::from_millis(100));

    let mut after = Vec::new();
    pump(&mut renderer, &mut after, 13_000);

    // fresh timeline: tick at 0, next at trunc(60*44100/240) = 11025
    assert!(after[..1000].iter().all(|&s| s == 1.0));
    assert!(after[1000..11025].iter().all(|&s| s == 0.0));
    assert_eq!(after[11025], 1.0);
    assert_eq!(after[12024], 1.0);
}

#[test]
fn recorded_take_replays_fifo_at_unity_gain() {
    let controls = Controls::new(440.0, 120.0, 0.0, 1.0);
    let bus = RenderBus::new();
    let (completions_tx, completions_rx) = bounded(64);
    let mut renderer = Renderer::new(
        RATE,
        Arc::new(Vec::new()),
        controls.clone(),
        bus.receiver(),
        completions_tx,
    );

    // capture session: clear, raise the flag, deliver, drop the flag
    let buffer = CaptureBuffer::new(44100);
    let mut sink = CaptureSink::new(buffer.clone(), controls.recording.clone());
    buffer.clear();
    controls.recording.set(true);
    sink.deliver(&[0.3f32; 700], 1);
    controls.recording.set(false);
    assert_eq!(buffer.len(), 700);

    // two play requests: the second queues behind the first
    let take = Arc::new(buffer.snapshot());
    let tx = bus.sender();
    tx.send(RenderCommand::PlayClip(take.clone()));
    tx.send(RenderCommand::PlayClip(take));

    let mut out = Vec::new();
    for _ in 0..3 {
        out.extend_from_slice(renderer.render(512));
    }
    assert!(out[..1400].iter().all(|&s| (s - 0.3).abs() < 1e-6));
    assert!(out[1400..].iter().all(|&s| s == 0.0));

    let recordings = completions_rx
        .try_iter()
        .filter(|c| c.tag == ClipTag::Recording)
        .count();
    assert_eq!(recordings, 2);
}
