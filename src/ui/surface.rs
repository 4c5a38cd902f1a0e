// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pixel buffer the editor draws rectangles into.
//!
//! The canvas uploads the buffer as a texture whenever it changed and shows
//! it on top of the frame image.

use crate::state::editor::Surface;
use image::{Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// RGBA drawing surface backed by an image buffer.
pub struct ImageSurface {
    pixels: RgbaImage,
    dirty: bool,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            dirty: true,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reallocate the buffer at a new size. Returns whether the size changed.
    ///
    /// The new buffer is blank; the editor has to redraw into it.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.pixels.dimensions() == (width, height) {
            return false;
        }
        self.pixels = RgbaImage::from_pixel(width, height, TRANSPARENT);
        self.dirty = true;
        true
    }

    /// Report and reset whether the buffer changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Set every pixel whose center lies inside the rectangle.
    fn paint(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba<u8>) {
        let (w, h) = self.pixels.dimensions();
        let (x0, x1) = pixel_span(x, width, w);
        let (y0, y1) = pixel_span(y, height, h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px, py, color);
            }
        }
        self.dirty = true;
    }
}

/// Half-open range of pixel indices with centers in `[start, start + len)`,
/// clamped to `0..limit`.
fn pixel_span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let clamp = |v: f64| v.max(0.0).min(limit as f64) as u32;
    (clamp((start - 0.5).ceil()), clamp((start + len - 0.5).ceil()))
}

impl Surface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba<u8>) {
        self.paint(x, y, width, height, color);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.paint(x, y, width, height, TRANSPARENT);
    }
}
