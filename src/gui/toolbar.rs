//! Toolbar Widget
//! Header strip with the dashboard titles, tab bar, export button and status.

use crate::gui::layout::DashboardLayout;
use egui::{Color32, RichText};

/// Header toolbar state.
pub struct Toolbar {
    pub selected_tab: usize,
    pub dark_mode: bool,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Toolbar {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            selected_tab: 0,
            dark_mode,
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: true,
        }
    }

    /// Draw the toolbar
    pub fn show(&mut self, ui: &mut egui::Ui, layout: &DashboardLayout) -> ToolbarAction {
        let mut action = ToolbarAction::None;

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(&layout.title)
                        .size(26.0)
                        .strong()
                        .color(Color32::from_rgb(100, 149, 237)),
                );
                ui.label(RichText::new(&layout.subtitle).size(16.0));
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_label = if self.dark_mode { "☀ Light" } else { "🌙 Dark" };
                if ui.button(theme_label).clicked() {
                    self.dark_mode = !self.dark_mode;
                    action = ToolbarAction::ToggleTheme;
                }

                ui.add_enabled_ui(self.export_enabled, |ui| {
                    if ui.button("💾 Export Charts").clicked() {
                        action = ToolbarAction::ExportFigures;
                    }
                });

                let status_color = if self.status.starts_with("Error") {
                    Color32::from_rgb(220, 53, 69)
                } else if self.status.starts_with("Exported") {
                    Color32::from_rgb(40, 167, 69)
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(&self.status).size(11.0).color(status_color));

                if self.progress > 0.0 && self.progress < 100.0 {
                    ui.add(
                        egui::ProgressBar::new(self.progress / 100.0)
                            .desired_width(140.0)
                            .show_percentage()
                            .animate(true),
                    );
                }
            });
        });

        ui.add_space(6.0);
        ui.separator();

        // Tab bar
        ui.horizontal(|ui| {
            for (i, label) in layout.labels().into_iter().enumerate() {
                let text = RichText::new(label).size(14.0);
                if ui.selectable_value(&mut self.selected_tab, i, text).clicked() {
                    action = ToolbarAction::SelectTab(i);
                }
            }
        });
        ui.add_space(4.0);

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    SelectTab(usize),
    ExportFigures,
    ToggleTheme,
}
