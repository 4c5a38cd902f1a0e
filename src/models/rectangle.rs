// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rectangle annotations.
//!
//! A rectangle is stored in the pixel space of the surface it was drawn on
//! and carries that surface's size along, so it can be rescaled whenever it
//! is displayed on a surface of a different size.

use crate::util::geometry::scale_factor;
use serde::{Deserialize, Serialize};

/// A masked rectangle and the reference size its geometry is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub img_width: f64,
    pub img_height: f64,
}

impl Rectangle {
    /// Create a rectangle drawn on a surface of the given reference size.
    pub fn new(x: f64, y: f64, width: f64, height: f64, reference: (u32, u32)) -> Self {
        Self {
            x,
            y,
            width,
            height,
            img_width: reference.0 as f64,
            img_height: reference.1 as f64,
        }
    }

    /// Reference size the geometry is currently expressed in.
    pub fn reference_size(&self) -> (f64, f64) {
        (self.img_width, self.img_height)
    }

    /// Check whether the geometry is already expressed in `reference`.
    pub fn matches_reference(&self, reference: (u32, u32)) -> bool {
        self.img_width == reference.0 as f64 && self.img_height == reference.1 as f64
    }

    /// Rescale the geometry into `reference`, each axis independently.
    ///
    /// Returns `false` and leaves the rectangle untouched when the stored
    /// reference size has a zero dimension, since there is no ratio to
    /// apply.
    pub fn rescale_to(&mut self, reference: (u32, u32)) -> bool {
        let (Some(sx), Some(sy)) = (
            scale_factor(self.img_width, reference.0 as f64),
            scale_factor(self.img_height, reference.1 as f64),
        ) else {
            return false;
        };

        self.x *= sx;
        self.width *= sx;
        self.y *= sy;
        self.height *= sy;
        self.img_width = reference.0 as f64;
        self.img_height = reference.1 as f64;
        true
    }
}
