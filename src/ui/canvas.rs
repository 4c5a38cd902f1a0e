// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for frame display and rectangle annotation.
//!
//! The frame image is fitted into the available space. That fitted size is
//! also the size of the rectangle surface, so resizing the window resizes
//! the surface and every rectangle is redrawn at the new scale.

use crate::state::session::Session;
use crate::util::geometry::{fit_within, span_to_rect};
use image::RgbaImage;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// A drag finished; coordinates are in surface pixels.
    AddRectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Frame image and existing mask fetched from the backend.
pub struct LoadedFrame {
    pub index: usize,
    pub image: RgbaImage,
    pub overlay: Option<RgbaImage>,
}

/// Textures and pointer state kept between UI frames.
#[derive(Default)]
pub struct CanvasState {
    frame_texture: Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    overlay_texture: Option<egui::TextureHandle>,
    surface_texture: Option<egui::TextureHandle>,
    drag_start: Option<egui::Pos2>,
    drag_end: Option<egui::Pos2>,
}

fn color_image(image: &RgbaImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}

impl CanvasState {
    /// Show a newly loaded frame.
    pub fn set_frame(&mut self, ctx: &egui::Context, frame: LoadedFrame) {
        self.frame_size = Some(frame.image.dimensions());
        self.frame_texture = Some(ctx.load_texture(
            format!("frame_{}", frame.index),
            color_image(&frame.image),
            egui::TextureOptions::LINEAR,
        ));
        self.overlay_texture = frame.overlay.map(|overlay| {
            ctx.load_texture(
                format!("mask_{}", frame.index),
                color_image(&overlay),
                egui::TextureOptions::NEAREST,
            )
        });
    }

    /// Forget the displayed frame, e.g. while the next one loads.
    pub fn clear_frame(&mut self) {
        self.frame_texture = None;
        self.frame_size = None;
        self.overlay_texture = None;
        self.drag_start = None;
        self.drag_end = None;
    }

    pub fn has_frame(&self) -> bool {
        self.frame_texture.is_some()
    }

    fn upload_surface(&mut self, ctx: &egui::Context, session: &mut Session) {
        let Some(surface) = session.editor_mut().surface_mut() else {
            return;
        };
        if !surface.take_dirty() && self.surface_texture.is_some() {
            return;
        }

        let image = color_image(surface.image());
        match self.surface_texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.surface_texture =
                    Some(ctx.load_texture("rectangles", image, egui::TextureOptions::NEAREST));
            }
        }
    }
}

/// Display the canvas and handle pointer interaction.
pub fn show(ui: &mut egui::Ui, state: &mut CanvasState, session: &mut Session) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(frame_size)) = (state.frame_texture.clone(), state.frame_size)
        else {
            show_placeholder(ui, session);
            return;
        };

        let available = ui.available_size();
        let (display_width, display_height) = fit_within(frame_size, (available.x, available.y));
        let surface_width = display_width.round() as u32;
        let surface_height = display_height.round() as u32;
        if surface_width == 0 || surface_height == 0 {
            return;
        }
        session.resize_surface(surface_width, surface_height);
        state.upload_surface(ui.ctx(), session);

        // Center the image
        let x_offset = (available.x - display_width) / 2.0;
        let y_offset = (available.y - display_height) / 2.0;
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width, display_height),
        );
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

        let response = ui.allocate_rect(image_rect, egui::Sense::drag());
        let painter = ui.painter();
        painter.image(texture.id(), image_rect, uv, egui::Color32::WHITE);
        if let Some(overlay) = &state.overlay_texture {
            painter.image(
                overlay.id(),
                image_rect,
                uv,
                egui::Color32::from_white_alpha(140),
            );
        }
        if let Some(rectangles) = &state.surface_texture {
            painter.image(rectangles.id(), image_rect, uv, egui::Color32::WHITE);
        }

        if response.drag_started() {
            state.drag_start = response.interact_pointer_pos().map(|p| image_rect.clamp(p));
            state.drag_end = state.drag_start;
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                state.drag_end = Some(image_rect.clamp(pos));
            }
        }

        if let (Some(start), Some(end)) = (state.drag_start, state.drag_end) {
            painter.rect_stroke(
                egui::Rect::from_two_pos(start, end),
                0.0,
                egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE),
            );
        }

        if response.drag_stopped() {
            if let (Some(start), Some(end)) = (state.drag_start.take(), state.drag_end.take()) {
                let scale_x = surface_width as f64 / image_rect.width() as f64;
                let scale_y = surface_height as f64 / image_rect.height() as f64;
                let to_surface = |p: egui::Pos2| {
                    (
                        (p.x - image_rect.min.x) as f64 * scale_x,
                        (p.y - image_rect.min.y) as f64 * scale_y,
                    )
                };
                let (x, y, width, height) = span_to_rect(to_surface(start), to_surface(end));
                // A click without movement is not a rectangle
                if width >= 1.0 && height >= 1.0 {
                    action = CanvasAction::AddRectangle {
                        x,
                        y,
                        width,
                        height,
                    };
                }
            }
        }
    });

    // Display status at the bottom
    ui.separator();
    ui.horizontal(|ui| match session.surface_size() {
        Some((w, h)) if state.has_frame() => {
            ui.label(format!("Canvas: {}x{}", w, h));
            if let Some((fw, fh)) = state.frame_size {
                ui.separator();
                ui.label(format!("Image: {}x{}", fw, fh));
            }
        }
        _ => {
            ui.label("No frame shown");
        }
    });

    action
}

fn show_placeholder(ui: &mut egui::Ui, session: &Session) {
    let message = if session.frames().is_empty() {
        "Open a dataset to begin masking"
    } else {
        "Loading frame..."
    };

    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("ROIMASK")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(egui::RichText::new(message).color(egui::Color32::from_gray(180)));
            if session.frames().is_empty() {
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new("File → Open Dataset...")
                        .weak()
                        .color(egui::Color32::from_gray(130)),
                );
            }
        });
    });
}
