// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask backend working directly on a dataset directory.
//!
//! The dataset is described by a nerfstudio-style `transforms.json` whose
//! `frames` entries carry a `file_path` and optionally a `mask_path`, both
//! relative to the dataset directory. Generated masks are written next to
//! the dataset and `transforms.json` is pointed at them.
//!
//! Opening a dataset gives every frame without a real mask an all-white
//! placeholder, so either all frames of `transforms.json` carry a
//! `mask_path` or none do.

use super::backend::MaskBackend;
use super::mask;
use crate::models::frame::{DatasetInfo, GenerateMaskRequest};
use anyhow::{anyhow, bail, Context, Result};
use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

const TRANSFORMS: &str = "transforms.json";
const BACKUP_TRANSFORMS: &str = "backup_transforms.json";
const BACKUP_DIR: &str = "backup_masks";
const GENERATED_DIR: &str = "generated_masks";
const EMPTY_DIR: &str = "empty_masks";

#[derive(Debug, Clone)]
struct LocalFrame {
    image_path: PathBuf,
    /// Mask the frame had when the dataset was opened, if it masks anything
    mask_path: Option<PathBuf>,
}

#[derive(Debug)]
struct Dataset {
    root: PathBuf,
    frames: Vec<LocalFrame>,
}

impl Dataset {
    fn info(&self) -> DatasetInfo {
        DatasetInfo {
            path: self.root.to_string_lossy().to_string(),
            framecount: self.frames.len(),
            frames_have_masks: self.frames.iter().map(|f| f.mask_path.is_some()).collect(),
        }
    }

    fn frame(&self, index: usize) -> Result<&LocalFrame> {
        self.frames
            .get(index)
            .ok_or_else(|| anyhow!("Index out of bounds"))
    }
}

/// Backend that reads and writes the dataset on the local filesystem.
#[derive(Debug, Default)]
pub struct LocalBackend {
    dataset: Mutex<Option<Dataset>>,
    /// Numbers the scratch files of concurrent mask writes
    scratch: AtomicU64,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Dataset>>> {
        self.dataset
            .lock()
            .map_err(|_| anyhow!("dataset state is poisoned"))
    }

    fn frame(&self, index: usize) -> Result<(PathBuf, LocalFrame)> {
        let guard = self.lock()?;
        let dataset = guard.as_ref().ok_or_else(|| anyhow!("No dataset loaded"))?;
        Ok((dataset.root.clone(), dataset.frame(index)?.clone()))
    }
}

fn read_transforms(path: &Path) -> Result<Value> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let transforms = serde_json::from_str(&json)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    Ok(transforms)
}

fn write_transforms(path: &Path, transforms: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(transforms)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

fn frames_of(transforms: &mut Value) -> Result<&mut Vec<Value>> {
    transforms
        .get_mut("frames")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| anyhow!("{} has no frames list", TRANSFORMS))
}

/// Copy every declared mask into the backup directory and write a
/// transforms file pointing at the copies.
fn make_safety_copy(root: &Path, transforms: &Value) -> Result<()> {
    let mut backup = transforms.clone();
    std::fs::create_dir_all(root.join(BACKUP_DIR))?;

    for (i, frame) in frames_of(&mut backup)?.iter_mut().enumerate() {
        let Some(mask_path) = frame.get("mask_path").and_then(Value::as_str) else {
            continue;
        };
        let source = root.join(mask_path);
        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let relative = format!("{}/mask_{}{}", BACKUP_DIR, i, extension);
        std::fs::copy(&source, root.join(&relative))
            .with_context(|| format!("cannot back up {}", source.display()))?;
        frame["mask_path"] = Value::String(relative);
    }

    write_transforms(&root.join(BACKUP_TRANSFORMS), &backup)
}

fn open_mask(path: &Path) -> Result<GrayImage> {
    let mask = image::open(path).with_context(|| format!("cannot open mask {}", path.display()))?;
    Ok(mask.to_luma8())
}

fn empty_mask_path(width: u32, height: u32) -> String {
    format!("{}/empty_mask_{}x{}.jpeg", EMPTY_DIR, width, height)
}

/// Whether `relative` names a mask that actually masks something.
fn has_real_mask(root: &Path, relative: &str) -> Result<bool> {
    if Path::new(relative).starts_with(EMPTY_DIR) {
        return Ok(false);
    }
    Ok(!mask::is_blank(&open_mask(&root.join(relative))?))
}

fn load_dataset(root: &Path, safety_copy: bool) -> Result<Dataset> {
    let transforms_path = root.join(TRANSFORMS);
    let mut transforms = read_transforms(&transforms_path)?;

    if safety_copy && !root.join(BACKUP_DIR).exists() {
        log::info!("Making a safety copy of the masks of {}", root.display());
        make_safety_copy(root, &transforms)?;
    }

    let mut frames = Vec::new();
    let mut empty_sizes = BTreeSet::new();
    for (i, frame) in frames_of(&mut transforms)?.iter_mut().enumerate() {
        let file_path = frame
            .get("file_path")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("frame {} has no file_path", i))?;
        let image_path = root.join(file_path);

        let mask_path = match frame.get("mask_path").and_then(Value::as_str) {
            Some(relative) if has_real_mask(root, relative)? => Some(root.join(relative)),
            _ => None,
        };

        if mask_path.is_none() {
            let (width, height) = image::image_dimensions(&image_path)
                .with_context(|| format!("cannot read size of {}", image_path.display()))?;
            empty_sizes.insert((width, height));
            frame["mask_path"] = Value::String(empty_mask_path(width, height));
        }

        frames.push(LocalFrame {
            image_path,
            mask_path,
        });
    }

    if !empty_sizes.is_empty() {
        std::fs::create_dir_all(root.join(EMPTY_DIR))?;
        for &(width, height) in &empty_sizes {
            let relative = empty_mask_path(width, height);
            GrayImage::from_pixel(width, height, mask::KEEP)
                .save_with_format(root.join(&relative), ImageFormat::Jpeg)
                .with_context(|| format!("cannot write {}", relative))?;
        }
        log::debug!("Wrote {} placeholder masks", empty_sizes.len());
    }
    write_transforms(&transforms_path, &transforms)?;

    Ok(Dataset {
        root: root.to_path_buf(),
        frames,
    })
}

impl MaskBackend for LocalBackend {
    fn set_dataset(&self, path: &Path, make_safety_copy: bool) -> Result<DatasetInfo> {
        if !path.is_absolute() {
            bail!("Path must be absolute");
        }
        if !path.exists() {
            bail!("Path does not exist");
        }
        if !path.join(TRANSFORMS).is_file() {
            bail!("Path does not contain a transforms.json file");
        }

        let mut guard = self.lock()?;
        *guard = None;
        let dataset = load_dataset(path, make_safety_copy)
            .with_context(|| format!("Failed to load dataset {}", path.display()))?;
        let info = dataset.info();
        *guard = Some(dataset);
        log::info!("Opened dataset {} with {} frames", info.path, info.framecount);
        Ok(info)
    }

    fn current_dataset(&self) -> Result<DatasetInfo> {
        let guard = self.lock()?;
        guard
            .as_ref()
            .map(Dataset::info)
            .ok_or_else(|| anyhow!("No dataset loaded"))
    }

    fn frame_image(&self, index: usize) -> Result<DynamicImage> {
        let (_, frame) = self.frame(index)?;
        image::open(&frame.image_path)
            .with_context(|| format!("cannot open image {}", frame.image_path.display()))
    }

    fn mask_overlay(&self, index: usize) -> Result<RgbaImage> {
        let (_, frame) = self.frame(index)?;
        let path = frame
            .mask_path
            .ok_or_else(|| anyhow!("No mask available for this frame"))?;
        Ok(mask::overlay(&open_mask(&path)?))
    }

    fn generate_mask(&self, index: usize, request: &GenerateMaskRequest) -> Result<()> {
        let (root, frame) = self.frame(index)?;
        let (width, height) = image::image_dimensions(&frame.image_path)
            .with_context(|| format!("cannot read size of {}", frame.image_path.display()))?;

        let base = match (&frame.mask_path, request.keep_mask) {
            (Some(path), true) => Some(open_mask(path)?),
            _ => None,
        };
        let generated = mask::rasterize(&request.rectangles, width, height, base.as_ref());

        // Encode into a file of our own, then move it into place under the
        // lock. Saves of the same frame may run concurrently.
        std::fs::create_dir_all(root.join(GENERATED_DIR))?;
        let relative = format!("{}/generated_mask_{}.jpeg", GENERATED_DIR, index);
        let scratch = root.join(GENERATED_DIR).join(format!(
            ".generated_mask_{}.{}.tmp",
            index,
            self.scratch.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = generated.save_with_format(&scratch, ImageFormat::Jpeg) {
            let _ = std::fs::remove_file(&scratch);
            return Err(e).with_context(|| format!("cannot write {}", scratch.display()));
        }

        let _guard = self.lock()?;
        std::fs::rename(&scratch, root.join(&relative))
            .with_context(|| format!("cannot move mask into {}", relative))?;
        let transforms_path = root.join(TRANSFORMS);
        let mut transforms = read_transforms(&transforms_path)?;
        let entry = frames_of(&mut transforms)?
            .get_mut(index)
            .ok_or_else(|| anyhow!("{} has no frame {}", TRANSFORMS, index))?;
        entry["mask_path"] = Value::String(relative);
        write_transforms(&transforms_path, &transforms)?;

        log::info!(
            "Generated mask for frame {} from {} rectangles",
            index,
            request.rectangles.len()
        );
        Ok(())
    }
}
