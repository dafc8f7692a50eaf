#![forbid(unsafe_code)]

use tracing::info;

use crate::dashboard::ActionKind;
use crate::render::{CardAction, CardIntent};
use crate::{QdeckGuiApp, UiUpdate};

impl QdeckGuiApp {
    pub(crate) fn start_card_action(&mut self, intent: CardIntent) {
        let kind = match intent.action {
            CardAction::Purge => ActionKind::Purge,
            CardAction::Delete => ActionKind::Delete,
        };
        self.start_action_task(kind, Some(intent.queue_url));
    }

    /// Run a destructive action. The provider asks for confirmation itself.
    pub(crate) fn start_action_task(&mut self, kind: ActionKind, queue_url: Option<String>) {
        let provider = self.provider.clone();
        let tx = self.updates_tx.clone();
        info!(action = ?kind, queue_url = %queue_url.as_deref().unwrap_or("-"), "action: start");
        tokio::spawn(async move {
            let result = match (kind, queue_url.as_deref()) {
                (ActionKind::Purge, Some(url)) => provider.purge_queue(url).await,
                (ActionKind::Delete, Some(url)) => provider.delete_queue(url).await,
                (ActionKind::PurgeAll, _) => provider.purge_all_queues().await,
                (_, None) => return,
            };
            let _ = tx.send(UiUpdate::ActionDone { kind, result });
        });
    }
}
