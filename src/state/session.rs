// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Labeling session.
//!
//! A session ties one [`FrameCollection`] to one [`AnnotationEditor`] and
//! routes the editor's saves to a [`MaskBackend`] in the background. It is
//! created by whoever owns the UI and lives as long as that UI does.

use super::editor::{AnnotationEditor, Persist, Surface};
use super::frames::FrameCollection;
use crate::io::{background::Background, backend::MaskBackend};
use crate::models::{
    frame::{DatasetInfo, GenerateMaskRequest, SaveTarget},
    project::AnnotationSnapshot,
    rectangle::Rectangle,
};
use crate::ui::surface::ImageSurface;
use image::Rgba;
use std::sync::Arc;

/// Persistence hook that regenerates the active frame's mask.
pub struct MaskSync {
    backend: Arc<dyn MaskBackend>,
    saves: Background<()>,
    target: Option<SaveTarget>,
}

impl MaskSync {
    pub fn new(backend: Arc<dyn MaskBackend>) -> Self {
        Self {
            backend,
            saves: Background::new(),
            target: None,
        }
    }

    pub fn target(&self) -> Option<SaveTarget> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<SaveTarget>) {
        self.target = target;
    }

    /// Saves issued and not yet finished.
    pub fn pending(&self) -> usize {
        self.saves.in_flight()
    }

    /// Collect finished saves; failures are logged.
    pub fn poll(&mut self) {
        self.saves.poll();
    }

    /// Wait for every issued save.
    pub fn flush(&mut self) {
        self.saves.wait_all();
    }
}

impl Persist for MaskSync {
    fn persist(&mut self, rects: &[Rectangle]) {
        let Some(target) = self.target else {
            log::debug!("No active frame, not saving {} rectangles", rects.len());
            return;
        };

        let request = GenerateMaskRequest {
            rectangles: rects.to_vec(),
            keep_mask: target.keep_mask,
        };
        let backend = Arc::clone(&self.backend);
        self.saves
            .spawn(format!("save mask of frame {}", target.frame), move || {
                backend.generate_mask(target.frame, &request)
            });
    }
}

pub type Editor = AnnotationEditor<ImageSurface, MaskSync>;

/// Frames, the editor for the active one, and the saves they trigger.
pub struct Session {
    frames: FrameCollection,
    editor: Editor,
}

impl Session {
    pub fn new(backend: Arc<dyn MaskBackend>, fill_color: Rgba<u8>) -> Self {
        Self {
            frames: FrameCollection::new(),
            editor: AnnotationEditor::new(MaskSync::new(backend)).with_fill_color(fill_color),
        }
    }

    pub fn frames(&self) -> &FrameCollection {
        &self.frames
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Start over on a freshly loaded dataset, dropping unsaved edits.
    pub fn load_dataset(&mut self, info: &DatasetInfo) {
        self.frames
            .load(&info.path, info.framecount, &info.frames_have_masks);
        self.editor.select(Vec::new());
        self.retarget();
    }

    pub fn add(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.editor.add(x, y, width, height);
    }

    pub fn undo(&mut self) {
        self.editor.undo();
    }

    pub fn redo(&mut self) {
        self.editor.redo();
    }

    pub fn clear(&mut self) {
        self.editor.clear();
    }

    pub fn select_frame(&mut self, index: usize) {
        self.frames.select_frame(index, &mut self.editor);
        self.retarget();
    }

    pub fn mark_mask_absent(&mut self) {
        self.frames.mark_mask_absent();
        self.retarget();
    }

    /// Drop the active frame's previous mask and regenerate it from the
    /// current rectangles alone.
    pub fn discard_existing_mask(&mut self) {
        if self.frames.active_frame().is_none() {
            return;
        }
        self.mark_mask_absent();
        self.editor.resync();
    }

    /// Size the drawing surface, redrawing (and so rescaling) every
    /// rectangle when the size changed.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        let Some(surface) = self.editor.surface_mut() else {
            self.editor.attach_surface(ImageSurface::new(width, height));
            return;
        };
        if surface.resize(width, height) {
            self.editor.clear_and_redraw_all();
        }
    }

    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.editor.surface().map(|s| s.size())
    }

    pub fn snapshot(&self) -> AnnotationSnapshot {
        self.frames.snapshot(self.editor.rectangles())
    }

    /// Put imported rectangles back on their frames. Masks on the backend
    /// are left as they are.
    pub fn restore(&mut self, snapshot: &AnnotationSnapshot) -> usize {
        self.frames.restore(snapshot, &mut self.editor)
    }

    pub fn pending_saves(&self) -> usize {
        self.editor.persistence().pending()
    }

    pub fn poll_saves(&mut self) {
        self.editor.persistence_mut().poll();
    }

    pub fn flush_saves(&mut self) {
        self.editor.persistence_mut().flush();
    }

    fn retarget(&mut self) {
        let target = self.frames.save_target();
        self.editor.persistence_mut().set_target(target);
    }
}
