//! Chart Viewer Widget
//! Scrollable central panel showing the active tab's stat cards and chart cards.

use crate::charts::{ChartPlotter, FigureId, FigureSet};
use crate::gui::layout::{Section, Tab};
use crate::stats::StatCard;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CARD_SPACING: f32 = 20.0;
const CHART_HEIGHT: f32 = 380.0;
const STAT_CARD_WIDTH: f32 = 190.0;

/// Renders a tab's sections using the figures built at startup.
pub struct ChartViewer {
    pub figures: FigureSet,
    pub stat_cards: Vec<StatCard>,
}

impl ChartViewer {
    pub fn new(figures: FigureSet, stat_cards: Vec<StatCard>) -> Self {
        Self {
            figures,
            stat_cards,
        }
    }

    /// Draw every section of `tab`.
    pub fn show(&self, ui: &mut egui::Ui, tab: &Tab) {
        ScrollArea::vertical()
            .id_salt(format!("tab_scroll_{}", tab.label))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (idx, section) in tab.sections.iter().enumerate() {
                    let salt = format!("{}_{}", tab.label, idx);
                    match section {
                        Section::StatCards => self.draw_stat_cards(ui),
                        Section::Figure(id) => self.draw_chart_card(ui, *id, &salt),
                        Section::Row(ids) => {
                            ui.columns(ids.len().max(1), |columns| {
                                for (col, id) in columns.iter_mut().zip(ids) {
                                    self.draw_chart_card(col, *id, &salt);
                                }
                            });
                        }
                    }
                    ui.add_space(CARD_SPACING);
                }
            });
    }

    fn draw_stat_cards(&self, ui: &mut egui::Ui) {
        if self.stat_cards.is_empty() {
            return;
        }
        let accent = Color32::from_rgb(100, 149, 237);

        ui.horizontal_wrapped(|ui| {
            for card in &self.stat_cards {
                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(1.5, accent))
                    .fill(ChartPlotter::card_fill(ui))
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.set_width(STAT_CARD_WIDTH);
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new(&card.label).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(&card.value).size(20.0).strong().color(accent));
                        });
                    });
                ui.add_space(8.0);
            }
        });
    }

    /// Draw one figure inside a rounded card.
    fn draw_chart_card(&self, ui: &mut egui::Ui, id: FigureId, salt: &str) {
        let Some(figure) = self.figures.get(id) else {
            ui.label(RichText::new(format!("Missing chart: {}", id.slug())).color(Color32::RED));
            return;
        };

        egui::Frame::none()
            .rounding(10.0)
            .stroke(ui.visuals().widgets.noninteractive.bg_stroke)
            .fill(ChartPlotter::card_fill(ui))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ChartPlotter::draw_figure(ui, figure, salt, CHART_HEIGHT);
            });
    }
}
