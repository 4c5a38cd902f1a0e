// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask rasterization.
//!
//! Masks are single-channel images where black marks the masked region and
//! white the kept one.

use crate::models::rectangle::Rectangle;
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

/// Value of unmasked pixels.
pub const KEEP: Luma<u8> = Luma([255]);
const MASKED: Luma<u8> = Luma([0]);

/// Luma values below this count as masked.
pub const MASK_THRESHOLD: u8 = 128;

/// Check whether a mask masks nothing.
pub fn is_blank(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| *p == KEEP)
}

/// Render rectangles into a `width` x `height` mask.
///
/// With `base`, the new mask starts from a copy of it; otherwise from all
/// white. Rectangles are scaled from their reference size to the mask size,
/// rounded down, and filled including their far edges.
pub fn rasterize(
    rects: &[Rectangle],
    width: u32,
    height: u32,
    base: Option<&GrayImage>,
) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, KEEP);
    if let Some(base) = base {
        imageops::replace(&mut mask, base, 0, 0);
    }

    for rect in rects {
        if rect.img_width <= 0.0 || rect.img_height <= 0.0 {
            log::warn!("Skipping rectangle without reference size: {:?}", rect);
            continue;
        }
        let scale_x = width as f64 / rect.img_width;
        let scale_y = height as f64 / rect.img_height;

        let x = (rect.x * scale_x).floor() as i64;
        let y = (rect.y * scale_y).floor() as i64;
        let w = (rect.width * scale_x).floor() as i64;
        let h = (rect.height * scale_y).floor() as i64;
        fill_inclusive(&mut mask, x, y, x + w, y + h);
    }
    mask
}

fn fill_inclusive(mask: &mut GrayImage, x0: i64, y0: i64, x1: i64, y1: i64) {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(width as i64 - 1);
    let y1 = y1.min(height as i64 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            mask.put_pixel(x as u32, y as u32, MASKED);
        }
    }
}

/// Turn a mask into an overlay: masked pixels opaque blue, the rest clear.
pub fn overlay(mask: &GrayImage) -> RgbaImage {
    let (width, height) = mask.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] < MASK_THRESHOLD {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| **p == MASKED).count()
    }

    #[test]
    fn test_blank_mask() {
        let mask = GrayImage::from_pixel(4, 4, KEEP);
        assert!(is_blank(&mask));
        assert!(is_blank(&rasterize(&[], 4, 4, None)));
    }

    #[test]
    fn test_rectangle_scaled_to_mask_size() {
        // Drawn on a 100x50 canvas, mask is 200x100
        let rect = Rectangle::new(10.0, 10.0, 5.0, 5.0, (100, 50));
        let mask = rasterize(&[rect], 200, 100, None);

        // x: 20..=30, y: 20..=30
        assert_eq!(*mask.get_pixel(20, 20), MASKED);
        assert_eq!(*mask.get_pixel(30, 30), MASKED);
        assert_eq!(*mask.get_pixel(31, 30), KEEP);
        assert_eq!(*mask.get_pixel(19, 20), KEEP);
        assert_eq!(masked_count(&mask), 11 * 11);
    }

    #[test]
    fn test_rounding_down() {
        let rect = Rectangle::new(1.6, 1.6, 1.6, 1.6, (10, 10));
        let mask = rasterize(&[rect], 10, 10, None);
        // floor(1.6) = 1 for origin and size, so 1..=2 on both axes
        assert_eq!(masked_count(&mask), 4);
        assert_eq!(*mask.get_pixel(1, 1), MASKED);
        assert_eq!(*mask.get_pixel(2, 2), MASKED);
    }

    #[test]
    fn test_clipped_at_edges() {
        let rect = Rectangle::new(8.0, 8.0, 10.0, 10.0, (10, 10));
        let mask = rasterize(&[rect], 10, 10, None);
        assert_eq!(masked_count(&mask), 4);
    }

    #[test]
    fn test_keeps_base_mask() {
        let mut base = GrayImage::from_pixel(10, 10, KEEP);
        base.put_pixel(9, 9, MASKED);
        let rect = Rectangle::new(0.0, 0.0, 0.0, 0.0, (10, 10));

        let mask = rasterize(&[rect], 10, 10, Some(&base));
        assert_eq!(*mask.get_pixel(9, 9), MASKED);
        assert_eq!(*mask.get_pixel(0, 0), MASKED);
        assert_eq!(masked_count(&mask), 2);
    }

    #[test]
    fn test_skips_rectangle_without_reference() {
        let rect = Rectangle::new(0.0, 0.0, 5.0, 5.0, (0, 0));
        assert!(is_blank(&rasterize(&[rect], 10, 10, None)));
    }

    #[test]
    fn test_overlay_threshold() {
        let mut mask = GrayImage::from_pixel(2, 1, Luma([MASK_THRESHOLD]));
        mask.put_pixel(0, 0, Luma([MASK_THRESHOLD - 1]));
        let overlay = overlay(&mask);
        assert_eq!(*overlay.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*overlay.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    }
}
