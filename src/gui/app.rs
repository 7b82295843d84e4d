//! Windfarm Dashboard Main Application
//! Main window with header toolbar, tabbed chart viewer and footer.

use crate::charts::FigureSet;
use crate::config::DashboardConfig;
use crate::export::{ExportSummary, Exporter};
use crate::gui::{ChartViewer, DashboardLayout, Toolbar, ToolbarAction};
use crate::stats::StatCard;
use egui::{RichText, TopBottomPanel};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

/// Export result from background thread
enum ExportResult {
    Progress(f32, String),
    Complete(ExportSummary),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    layout: DashboardLayout,
    toolbar: Toolbar,
    chart_viewer: ChartViewer,

    // Async export
    export_rx: Option<Receiver<ExportResult>>,
    is_exporting: bool,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        figures: FigureSet,
        stat_cards: Vec<StatCard>,
    ) -> Self {
        Self::apply_theme(&cc.egui_ctx, config.dark_mode);

        Self {
            toolbar: Toolbar::new(config.dark_mode),
            layout: DashboardLayout::windfarm(),
            chart_viewer: ChartViewer::new(figures, stat_cards),
            config,
            export_rx: None,
            is_exporting: false,
        }
    }

    fn apply_theme(ctx: &egui::Context, dark_mode: bool) {
        if dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
    }

    /// Handle export - pick a folder, then render on a background thread
    fn handle_export(&mut self) {
        if self.is_exporting {
            return;
        }

        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export charts to folder")
            .pick_folder()
        else {
            return; // User cancelled
        };

        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.is_exporting = true;
        self.toolbar.export_enabled = false;
        self.toolbar.set_progress(1.0, "Rendering charts...");

        let figures = self.chart_viewer.figures.clone();
        let exporter = Exporter::new(self.config.export_width, self.config.export_height);
        tracing::info!(dir = %dir.display(), "Starting chart export");

        thread::spawn(move || {
            Self::run_export(exporter, figures, dir, tx);
        });
    }

    /// Run export (called from background thread)
    fn run_export(
        exporter: Exporter,
        figures: FigureSet,
        dir: PathBuf,
        tx: std::sync::mpsc::Sender<ExportResult>,
    ) {
        let progress_tx = std::sync::Mutex::new(tx.clone());
        let result = exporter.export_all(&figures, &dir, |done, total| {
            let pct = done as f32 / total as f32 * 100.0;
            if let Ok(sender) = progress_tx.lock() {
                let _ = sender.send(ExportResult::Progress(
                    pct.min(99.0),
                    format!("Rendered {}/{} charts...", done, total),
                ));
            }
        });

        let _ = match result {
            Ok(summary) => tx.send(ExportResult::Complete(summary)),
            Err(e) => tx.send(ExportResult::Error(e.to_string())),
        };
    }

    /// Check for export results
    fn check_export_results(&mut self) {
        // Take the receiver temporarily to avoid borrow issues
        let rx = self.export_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    ExportResult::Progress(progress, status) => {
                        self.toolbar.set_progress(progress, &status);
                    }
                    ExportResult::Complete(summary) => {
                        self.toolbar.set_progress(
                            100.0,
                            &format!(
                                "Exported {} charts to {}",
                                summary.images.len(),
                                summary.dir.display()
                            ),
                        );
                        if let Err(e) = open::that(&summary.dir) {
                            tracing::warn!(error = %e, "Could not open export folder");
                        }
                        self.finish_export();
                        should_keep_receiver = false;
                    }
                    ExportResult::Error(error) => {
                        tracing::warn!(%error, "Chart export failed");
                        self.toolbar.set_progress(0.0, &format!("Error: {}", error));
                        self.finish_export();
                        should_keep_receiver = false;
                    }
                }
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.export_rx = Some(rx);
            }
        }
    }

    fn finish_export(&mut self) {
        self.is_exporting = false;
        self.toolbar.export_enabled = true;
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_export_results();

        // Request repaint while exporting
        if self.is_exporting {
            ctx.request_repaint();
        }

        // Header - titles, actions and tab bar
        TopBottomPanel::top("header").show(ctx, |ui| {
            match self.toolbar.show(ui, &self.layout) {
                ToolbarAction::ExportFigures => self.handle_export(),
                ToolbarAction::ToggleTheme => Self::apply_theme(ctx, self.toolbar.dark_mode),
                ToolbarAction::SelectTab(index) => {
                    tracing::debug!(tab = index, "Switched tab");
                }
                ToolbarAction::None => {}
            }
        });

        // Footer
        TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(4.0);
                ui.label(RichText::new(&self.layout.footer).size(11.0));
                ui.add_space(4.0);
            });
        });

        // Central panel - active tab
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.layout.tab(self.toolbar.selected_tab) {
                Some(tab) => self.chart_viewer.show(ui, tab),
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No Tab").size(20.0));
                    });
                }
            }
        });
    }
}
