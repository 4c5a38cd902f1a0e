// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask backend port.
//!
//! A backend knows the dataset on disk: it reports the frames and which of
//! them already have a mask, serves frame images, and turns the rectangles
//! of a frame into a mask image.

use crate::models::frame::{DatasetInfo, GenerateMaskRequest};
use anyhow::Result;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Operations the UI needs from whatever stores the dataset.
///
/// Calls block, so the UI runs them through
/// [`Background`](super::background::Background).
pub trait MaskBackend: Send + Sync {
    /// Open the dataset at `path`, optionally backing up its masks first.
    fn set_dataset(&self, path: &Path, make_safety_copy: bool) -> Result<DatasetInfo>;

    /// Dataset opened earlier, if any.
    fn current_dataset(&self) -> Result<DatasetInfo>;

    /// Image of frame `index`.
    fn frame_image(&self, index: usize) -> Result<DynamicImage>;

    /// Existing mask of frame `index` as a blue overlay.
    fn mask_overlay(&self, index: usize) -> Result<RgbaImage>;

    /// Write a new mask for frame `index`.
    fn generate_mask(&self, index: usize, request: &GenerateMaskRequest) -> Result<()>;
}
