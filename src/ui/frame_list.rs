// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame selection panel.
//!
//! Lists every frame of the dataset with a marker for frames that already
//! have a mask and the number of rectangles committed on them.

use crate::state::session::Session;

/// Display the frame list; returns the frame the user picked, if any.
pub fn show(ui: &mut egui::Ui, session: &Session) -> Option<usize> {
    let mut picked = None;
    let frames = session.frames();

    ui.heading("Frames");
    if let Some(path) = frames.dataset_path() {
        ui.label(egui::RichText::new(path).small().weak());
    }
    ui.separator();

    if frames.is_empty() {
        ui.label(egui::RichText::new("No dataset loaded").italics().weak());
        return None;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, frame) in frames.frames().iter().enumerate() {
            let is_active = index == frames.active_index();
            let rect_count = if is_active {
                session.editor().rectangles().len()
            } else {
                frame.rects.len()
            };

            let mut text = format!("Frame {}", index);
            if frame.has_existing_mask {
                text.push_str("  ● mask");
            }
            if rect_count > 0 {
                text.push_str(&format!("  ({})", rect_count));
            }

            if ui.selectable_label(is_active, text).clicked() && !is_active {
                picked = Some(index);
            }
        }
    });

    picked
}
