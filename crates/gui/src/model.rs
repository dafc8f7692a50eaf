#![forbid(unsafe_code)]

use std::time::Instant;

use qdeck_api::{ActionResult, ConfirmPrompt, ConnectionStatus, QdeckResult, Queue, RegionChange};
use tokio::sync::oneshot;

use crate::dashboard::{ActionKind, LoadTicket};

/// Messages from background tasks to the UI thread.
#[derive(Debug)]
pub enum UiUpdate {
    /// Auto-refresh tick, tagged with the timer generation.
    Tick(u64),
    QueuesLoaded { ticket: LoadTicket, result: QdeckResult<Vec<Queue>> },
    Connection(ConnectionStatus),
    ActionDone { kind: ActionKind, result: ActionResult },
    /// `persist=false` marks the startup restore of a saved region.
    RegionChanged { change: RegionChange, persist: bool },
    CurrentRegion(String),
    /// Startup restore finished; the first load may run.
    Ready,
    ConfirmRequest { prompt: ConfirmPrompt, reply: oneshot::Sender<bool> },
}

/// A confirmation dialog waiting on the user.
pub struct PendingConfirm {
    pub prompt: ConfirmPrompt,
    pub reply: Option<oneshot::Sender<bool>>,
}

impl PendingConfirm {
    pub fn answer(&mut self, accepted: bool) {
        if let Some(tx) = self.reply.take() {
            let _ = tx.send(accepted);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind { Info, Success, Warn, Error }

#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub created: Instant,
    pub duration_ms: u64,
    /// How many identical notifications this toast stands for.
    pub repeats: u32,
}

impl Toast {
    pub fn label(&self) -> String {
        if self.repeats > 1 { format!("{} (x{})", self.text, self.repeats) } else { self.text.clone() }
    }
}
