#![forbid(unsafe_code)]

use eframe::egui;
use tracing::info;

use crate::QdeckGuiApp;

pub(crate) fn ui_error(app: &mut QdeckGuiApp, ctx: &egui::Context) {
    let Some(err) = app.dash.error().cloned() else { return; };
    let mut open = true;
    let mut dismiss = false;
    egui::Window::new("Error")
        .id(egui::Id::new("error_modal"))
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, -40.0))
        .show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.label(egui::RichText::new(&err.title).strong());
            ui.add_space(6.0);
            ui.label(&err.message);
            ui.add_space(6.0);
            if ui.button("OK").clicked() { dismiss = true; }
        });
    if !open || dismiss { app.dash.dismiss_error(); }
}

/// Front of the confirmation queue. Closing the window declines.
pub(crate) fn ui_confirm(app: &mut QdeckGuiApp, ctx: &egui::Context) {
    let Some(pending) = app.confirms.front_mut() else { return; };
    let prompt = pending.prompt.clone();
    let mut open = true;
    let mut answer: Option<bool> = None;
    egui::Window::new(&prompt.title)
        .id(egui::Id::new("confirm_dialog"))
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, -20.0))
        .show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.label(egui::RichText::new(&prompt.message).strong());
            ui.add_space(6.0);
            ui.label(&prompt.detail);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() { answer = Some(false); }
                let accept = egui::Button::new(egui::RichText::new(&prompt.accept_label).color(egui::Color32::WHITE))
                    .fill(egui::Color32::from_rgb(185, 28, 28));
                if ui.add(accept).clicked() { answer = Some(true); }
            });
        });
    if !open && answer.is_none() { answer = Some(false); }
    if let Some(accepted) = answer {
        info!(title = %prompt.title, accepted, "ui: confirm answered");
        pending.answer(accepted);
        app.confirms.pop_front();
    }
}

/// Blocking overlay for manual loads and region switches.
pub(crate) fn ui_loading_overlay(app: &mut QdeckGuiApp, ctx: &egui::Context) {
    // dialogs stay reachable above a pending load
    if !app.dash.is_blocking() || app.dash.error().is_some() || !app.confirms.is_empty() { return; }
    let screen = ctx.screen_rect();
    egui::Area::new(egui::Id::new("loading_overlay"))
        .fixed_pos(screen.min)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let (rect, _) = ui.allocate_exact_size(screen.size(), egui::Sense::click_and_drag());
            ui.painter().rect_filled(rect, 0.0, egui::Color32::from_black_alpha(120));
            let center = egui::Rect::from_center_size(rect.center(), egui::vec2(160.0, 60.0));
            ui.scope_builder(egui::UiBuilder::new().max_rect(center), |ui| {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.colored_label(egui::Color32::WHITE, "Loading...");
                });
            });
        });
}
