// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the labeling session, runs backend calls in
//! the background and routes UI actions to the session.

use crate::config::Config;
use crate::io::{background::Background, backend::MaskBackend, serialization};
use crate::models::frame::DatasetInfo;
use crate::state::session::Session;
use crate::ui::{canvas, frame_list, toolbar};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Main application state.
pub struct MaskerApp {
    config: Config,

    backend: Arc<dyn MaskBackend>,

    /// Frames and the editor of the active one
    session: Session,

    /// Dataset opens in flight
    datasets: Background<DatasetInfo>,

    /// Frame image loads in flight
    frame_loads: Background<canvas::LoadedFrame>,

    /// Frame whose image was last requested
    requested_frame: Option<usize>,

    canvas: canvas::CanvasState,

    /// Loading state message
    loading_message: Option<String>,
}

impl MaskerApp {
    /// Create the application and start loading a dataset.
    ///
    /// The dataset named in the settings is opened if there is one,
    /// otherwise whatever the backend has open already is picked up.
    pub fn new(config: Config, backend: Arc<dyn MaskBackend>) -> Self {
        let session = Session::new(Arc::clone(&backend), config.fill());
        let dataset_path = config.dataset_path.clone();
        let mut app = Self {
            config,
            backend,
            session,
            datasets: Background::new(),
            frame_loads: Background::new(),
            requested_frame: None,
            canvas: canvas::CanvasState::default(),
            loading_message: None,
        };

        match dataset_path {
            Some(path) => app.open_dataset(path),
            None => app.reload_dataset(),
        }
        app
    }

    /// Ask the backend to open the dataset at `path`.
    fn open_dataset(&mut self, path: PathBuf) {
        let backend = Arc::clone(&self.backend);
        let make_safety_copy = self.config.make_safety_copy;
        self.loading_message = Some(format!("Opening {}...", path.display()));
        self.datasets
            .spawn(format!("open dataset {}", path.display()), move || {
                backend.set_dataset(&path, make_safety_copy)
            });
    }

    /// Pick up the dataset the backend currently has open.
    fn reload_dataset(&mut self) {
        let backend = Arc::clone(&self.backend);
        self.loading_message = Some("Loading dataset...".to_string());
        self.datasets
            .spawn("load current dataset", move || backend.current_dataset());
    }

    /// Fetch the image and existing mask of frame `index`.
    fn request_frame(&mut self, index: usize) {
        let backend = Arc::clone(&self.backend);
        let has_mask = self
            .session
            .frames()
            .frames()
            .get(index)
            .is_some_and(|f| f.has_existing_mask);

        self.requested_frame = Some(index);
        self.canvas.clear_frame();
        self.frame_loads
            .spawn(format!("load frame {}", index), move || {
                let image = backend.frame_image(index)?.to_rgba8();
                let overlay = if has_mask {
                    match backend.mask_overlay(index) {
                        Ok(overlay) => Some(overlay),
                        Err(e) => {
                            log::warn!("No mask overlay for frame {}: {:#}", index, e);
                            None
                        }
                    }
                } else {
                    None
                };
                Ok(canvas::LoadedFrame {
                    index,
                    image,
                    overlay,
                })
            });
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        let was_loading = !self.datasets.is_idle();
        // Only the last requested dataset is applied
        if let Some(info) = self.datasets.poll_latest() {
            self.session.load_dataset(&info);
            self.requested_frame = None;
            self.canvas.clear_frame();
        }
        if was_loading && self.datasets.is_idle() {
            self.loading_message = None;
        }

        let active = self.session.frames().active_index();
        for frame in self.frame_loads.poll() {
            // Drop images of frames the user already left
            if frame.index == active && self.requested_frame == Some(active) {
                self.canvas.set_frame(ctx, frame);
            }
        }

        if !self.session.frames().is_empty() && self.requested_frame != Some(active) {
            self.request_frame(active);
        }

        self.session.poll_saves();
    }

    fn select_frame(&mut self, index: usize) {
        self.session.select_frame(index);
    }

    fn discard_existing_mask(&mut self) {
        self.session.discard_existing_mask();
        // The overlay shows the mask that is no longer kept
        self.requested_frame = None;
    }

    /// Export annotations to a file.
    fn export_annotations(&self, path: PathBuf) {
        let snapshot = self.session.snapshot();
        match serialization::export(&snapshot, &path) {
            Ok(_) => log::info!(
                "Exported {} rectangles to {}",
                snapshot.rect_count(),
                path.display()
            ),
            Err(e) => log::error!("Failed to export annotations: {:#}", e),
        }
    }

    /// Import annotations from a file onto the loaded dataset.
    fn import_annotations(&mut self, path: PathBuf) {
        let result: Result<usize> =
            serialization::import(&path).map(|snapshot| self.session.restore(&snapshot));
        match result {
            Ok(count) => log::info!(
                "Imported annotations for {} frames from {}",
                count,
                path.display()
            ),
            Err(e) => log::error!("Failed to import annotations: {:#}", e),
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Dataset...").clicked() {
                    // Open native folder picker
                    if let Some(path) = rfd::FileDialog::new().pick_folder() {
                        self.open_dataset(path);
                    }
                    ui.close_menu();
                }
                if ui.button("Reload Dataset").clicked() {
                    self.reload_dataset();
                    ui.close_menu();
                }
                ui.separator();
                let has_frames = !self.session.frames().is_empty();
                if ui
                    .add_enabled(has_frames, egui::Button::new("Import Annotations..."))
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Annotations", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        self.import_annotations(path);
                    }
                    ui.close_menu();
                }
                ui.add_enabled_ui(has_frames, |ui| {
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("annotations.yaml")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("annotations.json")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                    });
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let editor = self.session.editor();
                let (can_undo, can_redo) = (editor.can_undo(), editor.can_redo());

                if ui
                    .add_enabled(can_undo, egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.session.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(can_redo, egui::Button::new("Redo (Ctrl+Shift+Z)"))
                    .clicked()
                {
                    self.session.redo();
                    ui.close_menu();
                }

                ui.separator();

                if ui.add_enabled(can_undo, egui::Button::new("Clear All")).clicked() {
                    self.session.clear();
                    ui.close_menu();
                }
                let has_mask = self
                    .session
                    .frames()
                    .active_frame()
                    .is_some_and(|f| f.has_existing_mask);
                if ui
                    .add_enabled(has_mask, egui::Button::new("Discard Existing Mask"))
                    .clicked()
                {
                    self.discard_existing_mask();
                    ui.close_menu();
                }
            });
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Leave keys alone while a text field is focused
        if ctx.wants_keyboard_input() {
            return;
        }

        // Handle undo (Ctrl+Z)
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.session.undo();
        }

        // Handle redo (Ctrl+Shift+Z or Ctrl+Y)
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.session.redo();
        }

        // Step through frames with the arrow keys
        let frames = self.session.frames();
        if !frames.is_empty() {
            let active = frames.active_index();
            let last = frames.len() - 1;
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) && active < last {
                self.select_frame(active + 1);
            } else if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) && active > 0 {
                self.select_frame(active - 1);
            }
        }
    }
}

impl Drop for MaskerApp {
    fn drop(&mut self) {
        let pending = self.session.pending_saves();
        if pending > 0 {
            log::info!("Waiting for {} pending saves", pending);
            self.session.flush_saves();
        }
    }
}

impl eframe::App for MaskerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);

        // Keep polling while anything runs in the background
        if self.loading_message.is_some()
            || !self.frame_loads.is_idle()
            || self.session.pending_saves() > 0
        {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.session))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::Undo => self.session.undo(),
            toolbar::ToolbarAction::Redo => self.session.redo(),
            toolbar::ToolbarAction::Clear => self.session.clear(),
            toolbar::ToolbarAction::DiscardMask => self.discard_existing_mask(),
            toolbar::ToolbarAction::None => {}
        }

        // Frame list (left side)
        let picked = egui::SidePanel::left("frames")
            .default_width(200.0)
            .show(ctx, |ui| frame_list::show(ui, &self.session))
            .inner;
        if let Some(index) = picked {
            self.select_frame(index);
        }

        self.handle_shortcuts(ctx);

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                // Show loading overlay if loading
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasAction::None
                } else {
                    canvas::show(ui, &mut self.canvas, &mut self.session)
                }
            })
            .inner;

        if let canvas::CanvasAction::AddRectangle {
            x,
            y,
            width,
            height,
        } = canvas_action
        {
            self.session.add(x, y, width, height);
        }
    }
}
