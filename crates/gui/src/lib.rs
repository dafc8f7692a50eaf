#![forbid(unsafe_code)]

use std::collections::VecDeque;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use eframe::egui;
use qdeck_api::QueueProvider;
use qdeck_persist::{PrefStore, Preferences};
use tracing::info;

pub mod config;
pub mod confirm;
pub mod dashboard;
pub mod model;
pub mod refresh;
pub mod render;
mod tasks;
mod ui;

pub use config::DashboardConfig;
pub use confirm::UiConfirm;
pub use dashboard::Dashboard;
pub use model::UiUpdate;

use model::{PendingConfirm, Toast};
use refresh::AutoRefresh;

/// Channel background tasks use to reach the UI thread.
pub fn updates_channel() -> (mpsc::Sender<UiUpdate>, mpsc::Receiver<UiUpdate>) {
    mpsc::channel()
}

/// Open the dashboard window. Must be called from within a tokio runtime.
pub fn run_native(
    provider: Arc<dyn QueueProvider>,
    prefs: Arc<dyn PrefStore>,
    updates: (mpsc::Sender<UiUpdate>, mpsc::Receiver<UiUpdate>),
    config: DashboardConfig,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    let app = QdeckGuiApp::new(provider, prefs, updates, config);
    eframe::run_native("qdeck", options, Box::new(|_cc| Ok(Box::new(app))))
}

pub struct QdeckGuiApp {
    provider: Arc<dyn QueueProvider>,
    prefs: Arc<dyn PrefStore>,
    config: DashboardConfig,
    dash: Dashboard,
    timer: AutoRefresh,
    updates_tx: mpsc::Sender<UiUpdate>,
    updates_rx: mpsc::Receiver<UiUpdate>,
    // dialogs raised by the confirm capability, front is shown
    confirms: VecDeque<PendingConfirm>,
    toasts: Vec<Toast>,
    // widget buffers
    search_input: String,
    region_choice: String,
}

impl QdeckGuiApp {
    pub fn new(
        provider: Arc<dyn QueueProvider>,
        prefs: Arc<dyn PrefStore>,
        updates: (mpsc::Sender<UiUpdate>, mpsc::Receiver<UiUpdate>),
        config: DashboardConfig,
    ) -> Self {
        info!("qdeck gui starting");
        let (updates_tx, updates_rx) = updates;
        let saved = Preferences::load(prefs.as_ref());
        let mut dash = Dashboard::new(config.indicator);
        if let Some(on) = saved.hide_empty {
            dash.set_hide_empty(on);
        }
        if let Some(on) = saved.auto_refresh {
            dash.set_auto_refresh(on);
        }
        let mut this = Self {
            provider,
            prefs,
            timer: AutoRefresh::new(config.refresh),
            config,
            dash,
            updates_tx,
            updates_rx,
            confirms: VecDeque::new(),
            toasts: Vec::new(),
            search_input: String::new(),
            region_choice: saved.region.clone().unwrap_or_default(),
        };
        this.start_startup_task(saved.region);
        this
    }
}

impl eframe::App for QdeckGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        crate::ui::updates::process_updates(self);

        ui::topbar::ui_topbar(self, ctx);
        ui::statusbar::ui_statusbar(self, ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::stats::ui_stats(self, ui);
            ui.separator();
            ui::cards::ui_cards(self, ui);
        });

        ui::modals::ui_loading_overlay(self, ctx);
        ui::modals::ui_confirm(self, ctx);
        ui::modals::ui_error(self, ctx);
        ui::toasts::draw_toasts(self, ctx);

        // ticks and task results arrive off-thread; keep draining at a steady cadence
        ctx.request_repaint_after(Duration::from_millis(150));
    }
}
