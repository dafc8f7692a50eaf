#![forbid(unsafe_code)]

use eframe::egui;

use crate::QdeckGuiApp;

pub(crate) fn ui_statusbar(app: &mut QdeckGuiApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("bottom_bar")
        .default_height(24.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let connected = app.dash.connection().map(|c| c.connected);
                let color = match connected {
                    Some(true) => egui::Color32::from_rgb(34, 160, 70),
                    Some(false) => ui.visuals().error_fg_color,
                    None => ui.visuals().weak_text_color(),
                };
                ui.colored_label(color, "●");
                ui.label(app.dash.connection_text());
                ui.separator();
                let r = app.dash.last_render();
                ui.small(format!(
                    "renders: {} (+{} ~{} -{})",
                    app.dash.render_passes(),
                    r.created,
                    r.patched,
                    r.removed
                ));
                if app.dash.in_flight() > 0 {
                    ui.separator();
                    ui.small(format!("loads in flight: {}", app.dash.in_flight()));
                }
            });
        });
}
