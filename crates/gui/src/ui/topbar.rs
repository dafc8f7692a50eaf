#![forbid(unsafe_code)]

use eframe::egui;
use std::time::Instant;
use tracing::info;

use crate::dashboard::{ActionKind, AutoRefreshState, LoadOrigin};
use crate::QdeckGuiApp;

pub(crate) fn ui_topbar(app: &mut QdeckGuiApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("qdeck");
            ui.separator();

            let search = ui.add(
                egui::TextEdit::singleline(&mut app.search_input)
                    .hint_text("Search queues...")
                    .desired_width(220.0),
            );
            if search.changed() {
                let term = app.search_input.clone();
                app.dash.set_search(&term);
            }

            let mut hide_empty = app.dash.hide_empty();
            if ui.checkbox(&mut hide_empty, "Hide empty").changed() {
                info!(hide_empty, "ui: hide empty toggled");
                app.set_hide_empty(hide_empty);
            }

            let mut auto = app.dash.auto_refresh();
            let hover = match app.dash.auto_refresh_state() {
                AutoRefreshState::Disabled => "Auto-refresh off".to_string(),
                AutoRefreshState::EnabledIdle => format!("Refreshing every {}s", app.config.refresh.as_secs()),
                AutoRefreshState::EnabledPolling => "Refreshing now".to_string(),
            };
            if ui.checkbox(&mut auto, "Auto-refresh").on_hover_text(hover).changed() {
                app.set_auto_refresh(auto);
            }

            ui.separator();
            ui.label("Region:");
            let choices = app.config.region_choices(app.dash.region());
            let mut picked = app.region_choice.clone();
            egui::ComboBox::from_id_salt("region_combo")
                .width(150.0)
                .selected_text(if picked.is_empty() { "…".to_string() } else { picked.clone() })
                .show_ui(ui, |ui| {
                    for r in &choices {
                        ui.selectable_value(&mut picked, r.clone(), r.as_str());
                    }
                });
            if picked != app.region_choice {
                info!(region = %picked, "ui: region selected");
                app.region_choice = picked.clone();
                app.start_region_change(picked);
            }

            ui.separator();
            if ui.button("Refresh").clicked() {
                info!("ui: refresh click");
                app.start_load_task(LoadOrigin::Manual);
            }
            let any = !app.dash.queues().is_empty();
            if ui
                .add_enabled(any, egui::Button::new("Purge All"))
                .on_hover_text("Purge every queue in this region")
                .clicked()
            {
                info!("ui: purge all click");
                app.start_action_task(ActionKind::PurgeAll, None);
            }

            if app.dash.indicator_visible(Instant::now()) {
                ui.separator();
                ui.spinner();
                ui.small("Refreshing…");
            }
        });
    });
}
