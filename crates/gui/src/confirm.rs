#![forbid(unsafe_code)]

use std::sync::mpsc;

use qdeck_api::{Confirm, ConfirmPrompt};
use tokio::sync::oneshot;
use tracing::debug;

use crate::model::UiUpdate;

/// Confirmation through the GUI: the prompt is shipped to the UI thread as a
/// dialog and the caller parks until the user answers. A closed window or a
/// dropped dialog counts as a decline.
pub struct UiConfirm {
    tx: mpsc::Sender<UiUpdate>,
}

impl UiConfirm {
    pub fn new(tx: mpsc::Sender<UiUpdate>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl Confirm for UiConfirm {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        let (reply, rx) = oneshot::channel();
        debug!(title = %prompt.title, "confirm: asking");
        if self.tx.send(UiUpdate::ConfirmRequest { prompt, reply }).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }
}
