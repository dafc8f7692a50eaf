#![forbid(unsafe_code)]

use std::time::Instant;

use tracing::info;

use crate::dashboard::LoadOrigin;
use crate::{QdeckGuiApp, UiUpdate};

impl QdeckGuiApp {
    pub(crate) fn start_load_task(&mut self, origin: LoadOrigin) {
        let Some(ticket) = self.dash.begin_load(origin) else { return; };
        let provider = self.provider.clone();
        let tx = self.updates_tx.clone();
        info!(seq = ticket.seq, origin = ?origin, "load: start");
        tokio::spawn(async move {
            let t0 = Instant::now();
            let result = provider.list_queues().await;
            match &result {
                Ok(v) => info!(seq = ticket.seq, queues = v.len(), took_ms = %t0.elapsed().as_millis(), "load: done"),
                Err(e) => info!(seq = ticket.seq, error = %e, took_ms = %t0.elapsed().as_millis(), "load: failed"),
            }
            let _ = tx.send(UiUpdate::QueuesLoaded { ticket, result });
        });
    }

    pub(crate) fn start_connection_check(&mut self) {
        let provider = self.provider.clone();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let status = provider.check_connection().await;
            let _ = tx.send(UiUpdate::Connection(status));
        });
    }

    pub(crate) fn set_auto_refresh(&mut self, on: bool) {
        if !self.dash.set_auto_refresh(on) {
            return;
        }
        if on {
            self.timer.start(self.updates_tx.clone());
        } else {
            self.timer.stop();
        }
        qdeck_persist::save_flag(self.prefs.as_ref(), qdeck_persist::KEY_AUTO_REFRESH, on);
    }

    pub(crate) fn set_hide_empty(&mut self, on: bool) {
        if self.dash.set_hide_empty(on) {
            qdeck_persist::save_flag(self.prefs.as_ref(), qdeck_persist::KEY_HIDE_EMPTY, on);
        }
    }
}
