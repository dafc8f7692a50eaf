#![forbid(unsafe_code)]

use eframe::egui;
use tracing::info;

use crate::render::{Card, CardAction, CardArea};
use crate::QdeckGuiApp;

const CARD_WIDTH: f32 = 320.0;

pub(crate) fn ui_cards(app: &mut QdeckGuiApp, ui: &mut egui::Ui) {
    if let CardArea::Empty(state) = app.dash.cards().area() {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading(state.title());
            ui.label(egui::RichText::new(state.message()).color(ui.visuals().weak_text_color()));
        });
        return;
    }

    let mut clicks: Vec<(String, CardAction)> = Vec::new();
    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(10.0, 10.0);
            for card in app.dash.cards().iter() {
                // egui ids follow the card url so widget state survives reorders
                ui.push_id(card.view.url.as_str(), |ui| {
                    if let Some(action) = card_frame(ui, card) {
                        clicks.push((card.view.url.clone(), action));
                    }
                });
            }
        });
    });

    for (url, action) in clicks {
        info!(queue_url = %url, action = ?action, "ui: card click");
        let intents = app.dash.cards().click(&url, action);
        for intent in intents {
            app.start_card_action(intent);
        }
    }
}

fn card_frame(ui: &mut egui::Ui, card: &Card) -> Option<CardAction> {
    let v = &card.view;
    let mut clicked = None;
    egui::Frame::group(ui.style())
        .corner_radius(8)
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&v.name).strong().size(15.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Delete").clicked() {
                        clicked = Some(CardAction::Delete);
                    }
                    let purge = ui
                        .add_enabled(!v.purge_disabled, egui::Button::new("Purge"))
                        .on_disabled_hover_text("Queue is empty");
                    if purge.clicked() {
                        clicked = Some(CardAction::Purge);
                    }
                });
            });
            ui.add_space(4.0);
            egui::Grid::new("metrics").num_columns(4).spacing([18.0, 2.0]).show(ui, |ui| {
                for n in [v.visible, v.hidden, v.delayed, v.total] {
                    ui.label(egui::RichText::new(n.to_string()).heading());
                }
                ui.end_row();
                for l in ["Visible", "Hidden", "Delayed", "Total"] {
                    ui.small(l);
                }
                ui.end_row();
            });
            ui.add_space(4.0);
            ui.small(format!("Visibility Timeout: {} | Retention: {}", v.visibility_timeout, v.retention));
            ui.small(format!("Last updated: {}", v.updated_text));
            if let Some(err) = &v.error {
                ui.colored_label(ui.visuals().error_fg_color, format!("Error: {}", err));
            }
        });
    clicked
}
