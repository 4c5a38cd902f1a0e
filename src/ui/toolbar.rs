// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the editing operations and save status.

use crate::state::session::Session;

/// Button pressed in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Undo,
    Redo,
    Clear,
    DiscardMask,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, session: &Session) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let editor = session.editor();
    let has_mask = session
        .frames()
        .active_frame()
        .is_some_and(|f| f.has_existing_mask);

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(editor.can_undo(), egui::Button::new("⟲ Undo")).clicked() {
            action = ToolbarAction::Undo;
        }
        if ui.add_enabled(editor.can_redo(), egui::Button::new("⟳ Redo")).clicked() {
            action = ToolbarAction::Redo;
        }
        if ui.add_enabled(editor.can_undo(), egui::Button::new("Clear")).clicked() {
            action = ToolbarAction::Clear;
        }
        if ui.add_enabled(has_mask, egui::Button::new("Discard existing mask")).clicked() {
            action = ToolbarAction::DiscardMask;
        }

        ui.separator();

        let frames = session.frames();
        let status = if frames.is_empty() {
            "Drag on the image to mask a region".to_string()
        } else {
            format!(
                "Frame {}/{}, {} rectangles",
                frames.active_index() + 1,
                frames.len(),
                editor.rectangles().len()
            )
        };
        ui.label(egui::RichText::new(status).italics().weak());

        let pending = session.pending_saves();
        if pending > 0 {
            ui.separator();
            ui.spinner();
            ui.label(format!("Saving ({})", pending));
        }
    });

    action
}
