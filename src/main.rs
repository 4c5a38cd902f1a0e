// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROIMASK - Rectangle masks for image datasets
//!
//! A cross-platform desktop application for masking regions of dataset
//! frames with rectangles.

use anyhow::Result;
use roimask::app::MaskerApp;
use roimask::config::Config;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = Config::load()?;
    let backend = config.backend.connect()?;
    log::info!("Using {:?} backend", config.backend);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ROIMASK - Rectangle masks for image datasets"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ROIMASK",
        options,
        Box::new(move |_cc| Ok(Box::new(MaskerApp::new(config, backend)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
