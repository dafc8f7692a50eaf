#![forbid(unsafe_code)]

use eframe::egui;
use std::time::Instant;

use crate::model::{Toast, ToastKind};
use crate::QdeckGuiApp;

const MAX_TOASTS: usize = 4;

impl QdeckGuiApp {
    pub(crate) fn toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        push_toast(&mut self.toasts, text.into(), kind, Instant::now());
    }
}

/// A repeat of the newest live toast (e.g. several "Queue purged successfully")
/// restarts it and bumps `repeats` instead of stacking.
fn push_toast(toasts: &mut Vec<Toast>, text: String, kind: ToastKind, now: Instant) {
    if let Some(last) = toasts.last_mut() {
        if last.kind == kind && last.text == text && now.duration_since(last.created).as_millis() < last.duration_ms as u128 {
            last.repeats += 1;
            last.created = now;
            return;
        }
    }
    let dur = match kind { ToastKind::Error => 5000, ToastKind::Warn => 6000, _ => 3000 };
    toasts.push(Toast { text, kind, created: now, duration_ms: dur, repeats: 1 });
    if toasts.len() > MAX_TOASTS {
        let extra = toasts.len() - MAX_TOASTS;
        toasts.drain(..extra);
    }
}

pub(crate) fn draw_toasts(app: &mut QdeckGuiApp, ctx: &egui::Context) {
    let now = Instant::now();
    app.toasts.retain(|t| now.duration_since(t.created).as_millis() < t.duration_ms as u128);
    if app.toasts.is_empty() { return; }
    egui::Area::new(egui::Id::new("toasts_area"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -40.0))
        .order(egui::Order::Tooltip)
        .show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;
            // newest last so it ends up at the bottom
            for t in app.toasts.iter() {
                let (bg, fg) = match t.kind {
                    ToastKind::Info => (ui.visuals().widgets.inactive.bg_fill, ui.visuals().strong_text_color()),
                    ToastKind::Success => (egui::Color32::from_rgb(34, 139, 34), egui::Color32::WHITE),
                    ToastKind::Warn => (egui::Color32::from_rgb(202, 138, 4), egui::Color32::BLACK),
                    ToastKind::Error => (egui::Color32::from_rgb(185, 28, 28), egui::Color32::WHITE),
                };
                egui::Frame::new()
                    .fill(bg)
                    .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
                    .corner_radius(6)
                    .inner_margin(egui::Margin::symmetric(10, 6))
                    .show(ui, |ui| {
                        ui.set_max_width(360.0);
                        ui.label(egui::RichText::new(t.label()).color(fg));
                    });
            }
        });
}
