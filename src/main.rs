//! Windfarm Dashboard - Tabbed Interactive Chart Viewer
//!
//! Renders demonstration charts over generated sample data in a tabbed window,
//! or exports them as PNG images and JSON descriptions.

mod charts;
mod config;
mod data;
mod export;
mod gui;
mod stats;

use anyhow::Context;
use charts::ChartFactory;
use clap::Parser;
use config::DashboardConfig;
use data::SampleData;
use eframe::egui;
use export::Exporter;
use gui::DashboardApp;
use stats::SummaryCalculator;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "windfarm-dashboard", version, about = "Windfarm demo dashboard")]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the sample data (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write every chart as PNG + JSON into DIR and exit
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Start with the dark theme
    #[arg(long)]
    dark: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.dark {
        config.dark_mode = true;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::info!(seed = ?config.seed, periods = config.periods, "Starting windfarm dashboard");

    let data = SampleData::generate(&config).context("generating sample data")?;
    let figures = ChartFactory::build_all(&data, &config).context("building charts")?;
    let stat_cards = SummaryCalculator::compute(&data, &config).context("computing stat cards")?;

    if let Some(dir) = &cli.export {
        let summary = Exporter::new(config.export_width, config.export_height)
            .export_all(&figures, dir, |done, total| {
                tracing::info!("Rendered {}/{} charts", done, total);
            })
            .context("exporting charts")?;
        println!(
            "Exported {} charts and {} descriptions to {}",
            summary.images.len(),
            summary.descriptions.len(),
            summary.dir.display()
        );
        return Ok(());
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Windfarm Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Windfarm Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, figures, stat_cards)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
