#![forbid(unsafe_code)]

use eframe::egui;

use crate::QdeckGuiApp;

fn stat_box(ui: &mut egui::Ui, label: &str, value: String) {
    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(6)
        .inner_margin(egui::Margin::symmetric(14, 8))
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(value).heading().strong());
                ui.small(label);
            });
        });
}

/// Aggregates over the filtered queues.
pub(crate) fn ui_stats(app: &mut QdeckGuiApp, ui: &mut egui::Ui) {
    let s = app.dash.stats();
    ui.horizontal(|ui| {
        stat_box(ui, "Queues", s.queue_display());
        stat_box(ui, "Messages", s.messages.to_string());
        stat_box(ui, "Hidden", s.hidden.to_string());
        stat_box(ui, "Delayed", s.delayed.to_string());
    });
}
