//! Drawing helpers for the roast window.
//!
//! Stateless: every function draws from what it is given and reports clicks
//! back as return values.

use crate::model::RoastLevel;
use crate::render::{DETAILS_HEADING, FeatureBlock, RenderedView};
use eframe::egui;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(255, 94, 58);
pub const PANEL_FILL: egui::Color32 = egui::Color32::from_rgb(30, 30, 30);
pub const MUTED: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);

/// Maximum on-screen size of the preview image.
const PREVIEW_MAX_SIZE: egui::Vec2 = egui::vec2(420.0, 300.0);

pub fn draw_header(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(8.0);
        ui.label(egui::RichText::new("I Judge").size(32.0).strong().color(ACCENT));
        ui.label(egui::RichText::new("Upload. Analyze. Get Roasted.").color(MUTED));
        ui.add_space(8.0);
    });
}

pub fn draw_footer(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new("Powered by AI. No feelings spared.").small().color(MUTED));
    });
}

/// Draws the upload area and returns its click response.
///
/// Shows the preview when one is loaded, the file name while it loads (or
/// when the bytes cannot be displayed), otherwise the placeholder.
/// `hovering` highlights the border while files are dragged over the window.
pub fn draw_upload_area(
    ui: &mut egui::Ui,
    preview: Option<&egui::TextureHandle>,
    file_name: Option<&str>,
    preview_pending: bool,
    hovering: bool,
) -> egui::Response {
    let stroke_color = if hovering { ACCENT } else { egui::Color32::GRAY };

    let inner = egui::Frame::group(ui.style())
        .fill(PANEL_FILL)
        .stroke(egui::Stroke::new(if hovering { 2.0 } else { 1.0 }, stroke_color))
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| match (preview, file_name) {
                (Some(texture), _) => {
                    ui.add(
                        egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                            .max_size(PREVIEW_MAX_SIZE),
                    );
                }
                (None, Some(name)) => {
                    if preview_pending {
                        ui.spinner();
                    }
                    ui.label(name);
                }
                (None, None) => {
                    ui.add_space(24.0);
                    ui.label(egui::RichText::new("Click to upload or drag & drop").strong());
                    ui.label(egui::RichText::new("JPEG, PNG, WEBP").small().color(MUTED));
                    ui.add_space(24.0);
                }
            });
        });

    inner
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
}

/// Three-way level selector. Returns the newly chosen level, if any.
pub fn draw_level_selector(ui: &mut egui::Ui, current: RoastLevel) -> Option<RoastLevel> {
    let mut chosen = current;
    ui.label("Roast Level");
    ui.horizontal(|ui| {
        for level in RoastLevel::ALL {
            ui.selectable_value(&mut chosen, level, level.label());
        }
    });

    (chosen != current).then_some(chosen)
}

pub fn draw_progress(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.spinner();
        ui.label("Analyzing your image and crafting the perfect roast...");
    });
}

/// Error panel. Returns `true` when "Try Again" is clicked.
pub fn draw_error(ui: &mut egui::Ui, message: &str) -> bool {
    let mut retry = false;
    egui::Frame::group(ui.style())
        .fill(PANEL_FILL)
        .stroke(egui::Stroke::new(1.0, egui::Color32::RED))
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(message).color(egui::Color32::RED));
            ui.add_space(8.0);
            retry = ui.button("Try Again").clicked();
        });
    retry
}

/// Clicks reported by the result panel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResultClicks {
    pub copy: bool,
    pub reset: bool,
}

pub fn draw_result(ui: &mut egui::Ui, view: &RenderedView) -> ResultClicks {
    let mut clicks = ResultClicks::default();

    egui::Frame::group(ui.style())
        .fill(PANEL_FILL)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Your Roast");
            ui.add_space(4.0);
            ui.label(egui::RichText::new(&view.roast).size(16.0));
        });

    if let Some(blocks) = &view.details {
        ui.add_space(12.0);
        ui.label(egui::RichText::new(DETAILS_HEADING).strong().size(18.0));
        for block in blocks {
            draw_feature_block(ui, block);
        }
    }

    ui.add_space(8.0);
    egui::Grid::new("result_stats").num_columns(2).show(ui, |ui| {
        ui.label(egui::RichText::new("Processing Time:").color(MUTED));
        ui.label(&view.processing_time);
        ui.end_row();
        ui.label(egui::RichText::new("Request ID:").color(MUTED));
        ui.label(egui::RichText::new(&view.request_id).monospace());
        ui.end_row();
    });

    ui.separator();
    ui.horizontal(|ui| {
        clicks.copy = ui.button("Copy").clicked();
        clicks.reset = ui.button(view.reset_label).clicked();
    });

    clicks
}

fn draw_feature_block(ui: &mut egui::Ui, block: &FeatureBlock) {
    ui.add_space(6.0);
    egui::Frame::group(ui.style()).inner_margin(8.0).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(&block.title).strong().color(ACCENT));

        if !block.rows.is_empty() {
            egui::Grid::new(("feature_block", block.key.as_str()))
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for row in &block.rows {
                        ui.label(egui::RichText::new(format!("{}:", row.label)).color(MUTED));
                        ui.label(&row.value);
                        ui.end_row();
                    }
                });
        }

        if let Some(text) = &block.narrative {
            ui.label(text);
        }
    });
}
