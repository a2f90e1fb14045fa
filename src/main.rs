mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::FantaDashApp;
use eframe::egui;
use fanta_dash::config::{DashboardConfig, DEFAULT_CONFIG_FILE};

fn main() -> eframe::Result {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = match DashboardConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}; falling back to default settings");
            DashboardConfig::default()
        }
    };
    log::info!("Reading data from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fanta Dash – Fantasy Football Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(FantaDashApp::new(config)))),
    )
}
