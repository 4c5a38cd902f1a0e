// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rectangle editor for the active frame.
//!
//! The editor owns the rectangles of the frame currently checked out of the
//! [`FrameCollection`](super::frames::FrameCollection) together with a redo
//! stack. Every mutation redraws the injected [`Surface`] first and then
//! hands the new list to the injected [`Persist`] hook.

use super::frames::Checkout;
use crate::models::rectangle::Rectangle;
use image::Rgba;

/// Opaque blue, the fill used for masked regions.
pub const DEFAULT_FILL: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// A 2D drawing target with a queryable size.
pub trait Surface {
    /// Current width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Paint a filled rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba<u8>);

    /// Reset a rectangular area to fully transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
}

/// Receives the full rectangle list after every committed change.
pub trait Persist {
    fn persist(&mut self, rects: &[Rectangle]);
}

/// Undo/redo state machine over the rectangles of one frame.
pub struct AnnotationEditor<S, P> {
    /// Rectangles of the active frame, in drawing order
    rectangles: Vec<Rectangle>,
    /// Redo stack, filled by undo and invalidated by any new edit
    history: Vec<Rectangle>,
    /// Drawing target, absent until the canvas is ready
    surface: Option<S>,
    persistence: P,
    fill_color: Rgba<u8>,
}

impl<S: Surface, P: Persist> AnnotationEditor<S, P> {
    /// Create an editor without a surface.
    pub fn new(persistence: P) -> Self {
        Self {
            rectangles: Vec::new(),
            history: Vec::new(),
            surface: None,
            persistence,
            fill_color: DEFAULT_FILL,
        }
    }

    pub fn with_fill_color(mut self, color: Rgba<u8>) -> Self {
        self.fill_color = color;
        self
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    pub fn history(&self) -> &[Rectangle] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.rectangles.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Install the drawing target and paint the current rectangles on it.
    pub fn attach_surface(&mut self, surface: S) {
        self.surface = Some(surface);
        self.clear_and_redraw_all();
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Current reference size, known only with a non-empty surface.
    pub fn reference_size(&self) -> Option<(u32, u32)> {
        self.surface
            .as_ref()
            .map(|surface| surface.size())
            .filter(|&(w, h)| w > 0 && h > 0)
    }

    /// Add a rectangle drawn at the current reference size.
    pub fn add(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let Some(reference) = self.reference_size() else {
            return;
        };

        self.rectangles
            .push(Rectangle::new(x, y, width, height, reference));
        self.history.clear();
        log::debug!(
            "Added rectangle ({:.1}, {:.1}, {:.1}, {:.1}), total: {}",
            x,
            y,
            width,
            height,
            self.rectangles.len()
        );

        self.render_last();
        self.persistence.persist(&self.rectangles);
    }

    /// Move the last rectangle onto the redo stack.
    pub fn undo(&mut self) {
        let Some(last) = self.rectangles.pop() else {
            return;
        };

        self.history.push(last);
        log::debug!("Undo, total: {}", self.rectangles.len());

        self.clear_and_redraw_all();
        self.persistence.persist(&self.rectangles);
    }

    /// Move the last undone rectangle back into the list.
    pub fn redo(&mut self) {
        let Some(next) = self.history.pop() else {
            return;
        };

        self.rectangles.push(next);
        log::debug!("Redo, total: {}", self.rectangles.len());

        self.render_last();
        self.persistence.persist(&self.rectangles);
    }

    /// Drop every rectangle and the redo stack.
    pub fn clear(&mut self) {
        self.rectangles.clear();
        self.history.clear();
        log::debug!("Cleared all rectangles");

        self.clear_surface();
        self.persistence.persist(&self.rectangles);
    }

    /// Replace the rectangle list, returning the previous one.
    pub fn select(&mut self, rects: Vec<Rectangle>) -> Vec<Rectangle> {
        let previous = std::mem::replace(&mut self.rectangles, rects);
        self.history.clear();
        self.clear_and_redraw_all();
        previous
    }

    /// Persist the current list again without changing it.
    pub fn resync(&mut self) {
        self.persistence.persist(&self.rectangles);
    }

    /// Draw a single rectangle, first moving it into the current reference
    /// size if it was recorded against another one.
    pub fn render(&mut self, rect: &mut Rectangle) {
        if let Some(surface) = self.surface.as_mut() {
            draw(surface, rect, self.fill_color);
        }
    }

    /// Clear the surface and draw every rectangle in order.
    pub fn clear_and_redraw_all(&mut self) {
        self.clear_surface();
        if let Some(surface) = self.surface.as_mut() {
            for rect in &mut self.rectangles {
                draw(surface, rect, self.fill_color);
            }
        }
    }

    fn render_last(&mut self) {
        if let (Some(surface), Some(rect)) = (self.surface.as_mut(), self.rectangles.last_mut()) {
            draw(surface, rect, self.fill_color);
        }
    }

    fn clear_surface(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let (w, h) = surface.size();
            surface.clear_rect(0.0, 0.0, w as f64, h as f64);
        }
    }
}

impl<S: Surface, P: Persist> Checkout for AnnotationEditor<S, P> {
    fn checkout(&mut self, rects: Vec<Rectangle>) -> Vec<Rectangle> {
        self.select(rects)
    }
}

/// Rescale `rect` into the surface's size if needed, then fill it.
///
/// The rescale is written back into `rect`, so later draws at the same size
/// leave the geometry alone.
fn draw<S: Surface>(surface: &mut S, rect: &mut Rectangle, color: Rgba<u8>) {
    let size = surface.size();
    if size.0 > 0 && size.1 > 0 && !rect.matches_reference(size) && rect.rescale_to(size) {
        log::trace!("Rescaled rectangle to {}x{}", size.0, size.1);
    }
    surface.fill_rect(rect.x, rect.y, rect.width, rect.height, color);
}
