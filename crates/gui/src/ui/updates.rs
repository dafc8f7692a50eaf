#![forbid(unsafe_code)]

use std::time::Instant;

use tracing::{debug, info};

use crate::dashboard::{ActionOutcome, LoadOrigin, LoadOutcome};
use crate::model::{PendingConfirm, ToastKind};
use crate::{QdeckGuiApp, UiUpdate};

pub(crate) fn process_updates(app: &mut QdeckGuiApp) {
    // Drain UI updates from background tasks (bounded per frame)
    let mut processed = 0usize;
    while processed < 256 {
        let Ok(update) = app.updates_rx.try_recv() else { break; };
        processed += 1;
        match update {
            UiUpdate::Tick(generation) => {
                if app.timer.accepts(generation) {
                    app.start_load_task(LoadOrigin::Timer);
                } else {
                    debug!(generation, "tick from a stopped timer dropped");
                }
            }
            UiUpdate::QueuesLoaded { ticket, result } => {
                match app.dash.finish_load(ticket, result, Instant::now()) {
                    LoadOutcome::Stale => {}
                    LoadOutcome::Applied | LoadOutcome::Failed => app.start_connection_check(),
                }
            }
            UiUpdate::Connection(status) => {
                app.dash.set_connection(status);
            }
            UiUpdate::ActionDone { kind, result } => {
                if let ActionOutcome::Succeeded { toast, kind: toast_kind } = app.dash.action_finished(kind, &result) {
                    app.toast(toast, toast_kind);
                    app.start_load_task(LoadOrigin::Manual);
                }
            }
            UiUpdate::RegionChanged { change, persist } => {
                let ok = app.dash.region_changed(&change);
                app.region_choice = app.dash.region().to_string();
                // the startup restore is followed by Ready, which does the first load
                if ok && persist {
                    qdeck_persist::save_best_effort(app.prefs.as_ref(), qdeck_persist::KEY_REGION, &change.region);
                    info!(region = %change.region, "region: switched");
                    app.toast(format!("Switched to {}", change.region), ToastKind::Info);
                    app.start_connection_check();
                    app.start_load_task(LoadOrigin::Manual);
                }
            }
            UiUpdate::CurrentRegion(region) => {
                app.region_choice = region.clone();
                app.dash.set_region(region);
            }
            UiUpdate::Ready => {
                info!(auto_refresh = app.dash.auto_refresh(), "startup: ready");
                app.start_load_task(LoadOrigin::Manual);
                if app.dash.auto_refresh() {
                    app.timer.start(app.updates_tx.clone());
                }
            }
            UiUpdate::ConfirmRequest { prompt, reply } => {
                app.confirms.push_back(PendingConfirm { prompt, reply: Some(reply) });
            }
        }
    }
}
