#![forbid(unsafe_code)]

use tracing::info;

use crate::{QdeckGuiApp, UiUpdate};

impl QdeckGuiApp {
    /// Restore the saved region (without persisting it again) or adopt the
    /// provider's, check the connection, then signal `Ready`.
    pub(crate) fn start_startup_task(&mut self, saved_region: Option<String>) {
        if saved_region.is_some() {
            self.dash.begin_region_change();
        }
        let provider = self.provider.clone();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            match saved_region {
                Some(region) => {
                    info!(region = %region, "startup: restoring region");
                    let change = provider.change_region(&region).await;
                    let _ = tx.send(UiUpdate::RegionChanged { change, persist: false });
                }
                None => {
                    let region = provider.current_region().await;
                    let _ = tx.send(UiUpdate::CurrentRegion(region));
                }
            }
            let status = provider.check_connection().await;
            let _ = tx.send(UiUpdate::Connection(status));
            let _ = tx.send(UiUpdate::Ready);
        });
    }

    pub(crate) fn start_region_change(&mut self, region: String) {
        if region == self.dash.region() {
            return;
        }
        self.dash.begin_region_change();
        let provider = self.provider.clone();
        let tx = self.updates_tx.clone();
        info!(region = %region, "region: switching");
        tokio::spawn(async move {
            let change = provider.change_region(&region).await;
            let _ = tx.send(UiUpdate::RegionChanged { change, persist: true });
        });
    }
}
