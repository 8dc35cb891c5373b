use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, select, Receiver, Sender};

use super::{Metronome, MetronomeState};
use crate::command::{RenderCommand, RenderSender};
use crate::player::{ClipTag, Completion};
use crate::sync::SynchronizedCell;

/// Control messages for the scheduler thread.
enum SchedulerMsg {
    Start,
    Stop,
    SetBpm(f64),
}

/// Owns the scheduling-notification thread.
///
/// The thread serializes everything that can move the metronome chain:
/// control messages from the engine and completion notices from the
/// render callback. One completion produces at most one reschedule, so
/// there are no concurrent reschedule races. The thread holds only
/// channel ends and shared cells — no reference back into the graph —
/// and exits as soon as either channel disconnects, so no tick can fire
/// into a torn-down engine.
pub struct MetronomeScheduler {
    tx: Option<Sender<SchedulerMsg>>,
    handle: Option<JoinHandle<()>>,
}

impl MetronomeScheduler {
    pub fn spawn(
        metronome: Metronome,
        bpm: Arc<SynchronizedCell<f64>>,
        render_position: Arc<SynchronizedCell<Option<u64>>>,
        render_tx: RenderSender,
        completions: Receiver<Completion>,
    ) -> Result<Self> {
        let (tx, rx) = bounded(16);
        let handle = thread::Builder::new()
            .name("metronome-scheduler".into())
            .spawn(move || run(metronome, bpm, render_position, render_tx, rx, completions))
            .context("failed to spawn metronome scheduler thread")?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Reset the clock to zero and schedule the first tick.
    pub fn start(&self) {
        self.send(SchedulerMsg::Start);
    }

    /// Stop the chain and clear any pending tick.
    pub fn stop(&self) {
        self.send(SchedulerMsg::Stop);
    }

    /// Tempo change: stop current playback and restart on the new grid.
    pub fn set_bpm(&self, bpm: f64) {
        self.send(SchedulerMsg::SetBpm(bpm));
    }

    fn send(&self, msg: SchedulerMsg) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(msg);
        }
    }
}

impl Drop for MetronomeScheduler {
    fn drop(&mut self) {
        // Closing the control channel ends the thread's select loop.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    mut metronome: Metronome,
    bpm: Arc<SynchronizedCell<f64>>,
    render_position: Arc<SynchronizedCell<Option<u64>>>,
    render_tx: RenderSender,
    control: Receiver<SchedulerMsg>,
    completions: Receiver<Completion>,
) {
    loop {
        select! {
            recv(control) -> msg => match msg {
                Ok(SchedulerMsg::Start) => restart(&mut metronome, &render_tx),
                Ok(SchedulerMsg::SetBpm(new_bpm)) => {
                    bpm.set(new_bpm);
                    // Abrupt re-quantization to the new tempo's grid,
                    // starting at sample zero of a fresh timeline.
                    restart(&mut metronome, &render_tx);
                }
                Ok(SchedulerMsg::Stop) => {
                    metronome.stop();
                    render_tx.send(RenderCommand::ResetTickPlayer);
                }
                Err(_) => break,
            },
            recv(completions) -> msg => match msg {
                Ok(Completion { tag: ClipTag::Tick }) => {
                    if metronome.state() == MetronomeState::Stopped {
                        // Late completion from a chain that was stopped.
                        continue;
                    }
                    match metronome.on_tick_complete(render_position.get(), bpm.get()) {
                        Some(sched) => {
                            render_tx.send(RenderCommand::ScheduleTick { start: sched.start });
                        }
                        None => {
                            // Non-fatal: the metronome falls silent until
                            // an explicit restart.
                            eprintln!(
                                "Warning: render time unavailable, tick reschedule skipped"
                            );
                        }
                    }
                }
                Ok(Completion { tag: ClipTag::Recording }) => {
                    println!("Finished playing recording");
                }
                Err(_) => break,
            },
        }
    }
}

fn restart(metronome: &mut Metronome, render_tx: &RenderSender) {
    render_tx.send(RenderCommand::ResetTickPlayer);
    let sched = metronome.start();
    render_tx.send(RenderCommand::ScheduleTick { start: sched.start });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{RenderBus, RenderReceiver};
    use std::time::{Duration, Instant};

    fn recv_within(rx: &RenderReceiver, timeout: Duration) -> Option<RenderCommand> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(cmd) = rx.try_recv() {
                return Some(cmd);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }

    struct Fixture {
        scheduler: MetronomeScheduler,
        render_rx: RenderReceiver,
        completions_tx: Sender<Completion>,
        render_position: Arc<SynchronizedCell<Option<u64>>>,
    }

    fn fixture(bpm: f64) -> Fixture {
        let bus = RenderBus::new();
        let render_rx = bus.receiver();
        let (completions_tx, completions_rx) = bounded(16);
        let render_position = Arc::new(SynchronizedCell::new(None));
        let scheduler = MetronomeScheduler::spawn(
            Metronome::new(44100.0, 44100.0),
            Arc::new(SynchronizedCell::new(bpm)),
            render_position.clone(),
            bus.sender(),
            completions_rx,
        )
        .unwrap();
        Fixture {
            scheduler,
            render_rx,
            completions_tx,
            render_position,
        }
    }

    const WAIT: Duration = Duration::from_secs(1);

    #[test]
    fn start_resets_player_and_schedules_first_tick() {
        let f = fixture(120.0);
        f.scheduler.start();
        assert!(matches!(
            recv_within(&f.render_rx, WAIT),
            Some(RenderCommand::ResetTickPlayer)
        ));
        assert!(matches!(
            recv_within(&f.render_rx, WAIT),
            Some(RenderCommand::ScheduleTick { start: 0 })
        ));
    }

    #[test]
    fn completion_schedules_next_tick() {
        let f = fixture(120.0);
        f.scheduler.start();
        recv_within(&f.render_rx, WAIT); // reset
        recv_within(&f.render_rx, WAIT); // tick at 0

        f.render_position.set(Some(1500));
        f.completions_tx
            .send(Completion { tag: ClipTag::Tick })
            .unwrap();
        assert!(matches!(
            recv_within(&f.render_rx, WAIT),
            Some(RenderCommand::ScheduleTick { start: 22050 })
        ));
    }

    #[test]
    fn completion_without_render_time_is_skipped() {
        let f = fixture(120.0);
        f.scheduler.start();
        recv_within(&f.render_rx, WAIT);
        recv_within(&f.render_rx, WAIT);

        // render position never published
        f.completions_tx
            .send(Completion { tag: ClipTag::Tick })
            .unwrap();
        assert!(recv_within(&f.render_rx, Duration::from_millis(100)).is_none());
    }

    #[test]
    fn stop_silences_late_completions() {
        let f = fixture(120.0);
        f.scheduler.start();
        recv_within(&f.render_rx, WAIT);
        recv_within(&f.render_rx, WAIT);

        f.scheduler.stop();
        assert!(matches!(
            recv_within(&f.render_rx, WAIT),
            Some(RenderCommand::ResetTickPlayer)
        ));

        f.render_position.set(Some(9000));
        f.completions_tx
            .send(Completion { tag: ClipTag::Tick })
            .unwrap();
        assert!(recv_within(&f.render_rx, Duration::from_millis(100)).is_none());
    }
}
