mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod export;
mod pipeline;
mod settings;
mod state;
mod ui;

use std::path::Path;

use app::RustyEdaApp;
use eframe::egui;
use settings::{SETTINGS_FILE, Settings};

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load_or_default(Path::new(SETTINGS_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty EDA – Exploratory Data Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(RustyEdaApp::new(settings)))),
    )
}
