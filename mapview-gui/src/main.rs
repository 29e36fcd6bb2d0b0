// Disable console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use app::MapViewApp;
use eframe::egui;
use mapview_core::{MapConfig, YandexClient};
use std::path::Path;

const CONFIG_FILE: &str = "mapview.json";

fn main() -> anyhow::Result<()> {
    env_logger::init(); // Initialize logging

    let config = MapConfig::load(Path::new(CONFIG_FILE))?.apply_env();
    let map_size = (config.map_width, config.map_height);
    let client = YandexClient::new(config)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("mapview"),
        ..Default::default()
    };

    eframe::run_native(
        "mapview",
        native_options,
        Box::new(move |_cc| Ok(Box::new(MapViewApp::new(client, map_size)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
}
