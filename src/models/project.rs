// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation snapshot of a whole dataset.
//!
//! A snapshot captures the committed rectangles of every frame, so a
//! labeling session can be exported and picked up again later.

use super::frame::Frame;
use super::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// Rectangles committed on one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotations {
    pub index: usize,
    #[serde(default)]
    pub has_existing_mask: bool,
    pub rects: Vec<Rectangle>,
}

/// Complete annotation data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    pub dataset_path: String,
    pub frames: Vec<FrameAnnotations>,
}

impl AnnotationSnapshot {
    /// Build a snapshot from frames, skipping frames without rectangles.
    pub fn from_frames<'a>(
        dataset_path: String,
        frames: impl IntoIterator<Item = &'a Frame>,
    ) -> Self {
        let frames = frames
            .into_iter()
            .enumerate()
            .filter(|(_, frame)| !frame.rects.is_empty())
            .map(|(index, frame)| FrameAnnotations {
                index,
                has_existing_mask: frame.has_existing_mask,
                rects: frame.rects.clone(),
            })
            .collect();
        Self {
            dataset_path,
            frames,
        }
    }

    /// Total number of rectangles across all frames.
    pub fn rect_count(&self) -> usize {
        self.frames.iter().map(|f| f.rects.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frames_skips_empty() {
        let mut frames = vec![Frame::new(false), Frame::new(true), Frame::new(false)];
        frames[1].rects.push(Rectangle::new(0.0, 0.0, 5.0, 5.0, (10, 10)));
        frames[1].rects.push(Rectangle::new(1.0, 1.0, 5.0, 5.0, (10, 10)));

        let snapshot = AnnotationSnapshot::from_frames("/ds".to_string(), &frames);
        assert_eq!(snapshot.frames.len(), 1);
        assert_eq!(snapshot.frames[0].index, 1);
        assert!(snapshot.frames[0].has_existing_mask);
        assert_eq!(snapshot.rect_count(), 2);
    }
}
