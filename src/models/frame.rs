// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frames of a dataset and the payloads exchanged with a mask backend.

use super::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// One image of the dataset and its committed rectangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub has_existing_mask: bool,
    pub rects: Vec<Rectangle>,
}

impl Frame {
    pub fn new(has_existing_mask: bool) -> Self {
        Self {
            has_existing_mask,
            rects: Vec::new(),
        }
    }
}

/// Dataset description as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub path: String,
    pub framecount: usize,
    pub frames_have_masks: Vec<bool>,
}

/// Request to regenerate the mask of one frame from its rectangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateMaskRequest {
    pub rectangles: Vec<Rectangle>,
    /// Merge the rectangles into the mask the frame already has.
    pub keep_mask: bool,
}

/// Frame a save addresses and whether its existing mask must be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTarget {
    pub frame: usize,
    pub keep_mask: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_info_from_backend_reply() {
        let json = r#"{"path": "/ds", "framecount": 2, "frames_have_masks": [true, false]}"#;
        let info: DatasetInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.path, "/ds");
        assert_eq!(info.framecount, 2);
        assert_eq!(info.frames_have_masks, vec![true, false]);
    }

    #[test]
    fn test_generate_mask_request_shape() {
        let request = GenerateMaskRequest {
            rectangles: vec![Rectangle::new(1.0, 2.0, 3.0, 4.0, (10, 20))],
            keep_mask: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["keep_mask"], true);
        assert_eq!(json["rectangles"][0]["img_height"], 20.0);
    }
}
