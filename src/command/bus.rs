use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::types::RenderCommand;

/// Bounded channel carrying commands into the render callback.
///
/// Send and receive are both non-blocking: the control domain drops a
/// command (with a warning) rather than wait on a full buffer, and the
/// render callback drains whatever is present at the top of each cycle.
pub struct RenderBus {
    tx: Sender<RenderCommand>,
    rx: Receiver<RenderCommand>,
}

impl RenderBus {
    pub fn new() -> Self {
        let (tx, rx) = bounded(64);
        Self { tx, rx }
    }

    /// Get a sender that can be cloned and shared across control threads
    pub fn sender(&self) -> RenderSender {
        RenderSender {
            tx: self.tx.clone(),
        }
    }

    /// Get the receiver for the render callback
    pub fn receiver(&self) -> RenderReceiver {
        RenderReceiver {
            rx: self.rx.clone(),
        }
    }
}

impl Default for RenderBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sender for dispatching render commands
#[derive(Clone)]
pub struct RenderSender {
    tx: Sender<RenderCommand>,
}

impl RenderSender {
    /// Send a command (non-blocking, drops if buffer full)
    pub fn send(&self, cmd: RenderCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                eprintln!("Warning: render command buffer full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Receiver half, owned by the render callback
#[derive(Clone)]
pub struct RenderReceiver {
    rx: Receiver<RenderCommand>,
}

impl RenderReceiver {
    /// Try to receive a command (non-blocking)
    pub fn try_recv(&self) -> Option<RenderCommand> {
        self.rx.try_recv().ok()
    }
}
