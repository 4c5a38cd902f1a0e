// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the ratios used to move rectangles between
//! coordinate spaces of different sizes, and the aspect-preserving fit of a
//! frame into the space available on screen.

/// Ratio that maps lengths measured against `from` onto `to`.
///
/// `None` when `from` is zero or not finite.
pub fn scale_factor(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() {
        None
    } else {
        Some(to / from)
    }
}

/// Largest size with the aspect ratio of `image` that fits in `available`.
pub fn fit_within(image: (u32, u32), available: (f32, f32)) -> (f32, f32) {
    let (img_width, img_height) = image;
    if img_width == 0 || img_height == 0 || available.0 <= 0.0 || available.1 <= 0.0 {
        return (0.0, 0.0);
    }

    let img_aspect = img_width as f32 / img_height as f32;
    let available_aspect = available.0 / available.1;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available.0, available.0 / img_aspect)
    } else {
        // Image is taller - fit to height
        (available.1 * img_aspect, available.1)
    }
}

/// Normalize a drag between two corners into `(x, y, width, height)`.
pub fn span_to_rect(start: (f64, f64), end: (f64, f64)) -> (f64, f64, f64, f64) {
    let x = start.0.min(end.0);
    let y = start.1.min(end.1);
    (x, y, (start.0 - end.0).abs(), (start.1 - end.1).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(800.0, 400.0), Some(0.5));
        assert_eq!(scale_factor(0.0, 400.0), None);
        assert_eq!(scale_factor(f64::NAN, 400.0), None);
    }

    #[test]
    fn test_fit_wide_image() {
        let (w, h) = fit_within((1920, 1080), (960.0, 960.0));
        assert!((w - 960.0).abs() < 0.001);
        assert!((h - 540.0).abs() < 0.001);
    }

    #[test]
    fn test_fit_tall_image() {
        let (w, h) = fit_within((500, 1000), (800.0, 400.0));
        assert!((w - 200.0).abs() < 0.001);
        assert!((h - 400.0).abs() < 0.001);
    }

    #[test]
    fn test_fit_degenerate() {
        assert_eq!(fit_within((0, 100), (800.0, 600.0)), (0.0, 0.0));
        assert_eq!(fit_within((100, 100), (0.0, 600.0)), (0.0, 0.0));
    }

    #[test]
    fn test_span_in_any_direction() {
        assert_eq!(span_to_rect((50.0, 40.0), (10.0, 60.0)), (10.0, 40.0, 40.0, 20.0));
        assert_eq!(span_to_rect((1.0, 1.0), (3.0, 2.0)), (1.0, 1.0, 2.0, 1.0));
    }
}
