// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-frame rectangle store.
//!
//! The collection keeps the committed rectangles of every frame except the
//! active one, whose list is checked out to the editor. Switching frames
//! swaps the lists through [`Checkout`].

use crate::models::{
    frame::{Frame, SaveTarget},
    project::AnnotationSnapshot,
    rectangle::Rectangle,
};

/// Side of the frame switch that holds the active rectangles.
pub trait Checkout {
    /// Take `rects` as the active list and give back the previous one.
    fn checkout(&mut self, rects: Vec<Rectangle>) -> Vec<Rectangle>;
}

/// Frames of the loaded dataset and the index of the active one.
#[derive(Debug, Default)]
pub struct FrameCollection {
    dataset_path: Option<String>,
    frames: Vec<Frame>,
    active: usize,
}

impl FrameCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all frames, discarding any previous state.
    pub fn load(&mut self, path: &str, frame_count: usize, mask_flags: &[bool]) {
        if mask_flags.len() != frame_count {
            log::warn!(
                "Dataset {} reports {} frames but {} mask flags",
                path,
                frame_count,
                mask_flags.len()
            );
        }

        self.dataset_path = Some(path.to_string());
        self.frames = (0..frame_count)
            .map(|i| Frame::new(mask_flags.get(i).copied().unwrap_or(false)))
            .collect();
        self.active = 0;
        log::info!("Loaded dataset {} with {} frames", path, frame_count);
    }

    pub fn dataset_path(&self) -> Option<&str> {
        self.dataset_path.as_deref()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_frame(&self) -> Option<&Frame> {
        self.frames.get(self.active)
    }

    /// Where saves for the active frame go, if any frame is loaded.
    pub fn save_target(&self) -> Option<SaveTarget> {
        self.active_frame().map(|frame| SaveTarget {
            frame: self.active,
            keep_mask: frame.has_existing_mask,
        })
    }

    /// Make `index` the active frame.
    ///
    /// The editor checks out the stored rectangles of `index` first; what it
    /// hands back is archived on the frame that was active until now.
    pub fn select_frame(&mut self, index: usize, editor: &mut impl Checkout) {
        if index == self.active {
            return;
        }
        if index >= self.frames.len() {
            log::warn!(
                "Frame {} out of range, dataset has {} frames",
                index,
                self.frames.len()
            );
            return;
        }

        let incoming = std::mem::take(&mut self.frames[index].rects);
        let outgoing = editor.checkout(incoming);
        if let Some(previous) = self.frames.get_mut(self.active) {
            previous.rects = outgoing;
        }
        log::info!("Switched from frame {} to frame {}", self.active, index);
        self.active = index;
    }

    /// Forget that the active frame has a mask on the backend.
    pub fn mark_mask_absent(&mut self) {
        if let Some(frame) = self.frames.get_mut(self.active) {
            frame.has_existing_mask = false;
        }
    }

    /// Snapshot of every committed rectangle, with `active_rects` standing in
    /// for the list currently checked out.
    pub fn snapshot(&self, active_rects: &[Rectangle]) -> AnnotationSnapshot {
        let frames = self.frames.iter().enumerate().map(|(i, frame)| {
            if i == self.active {
                Frame {
                    has_existing_mask: frame.has_existing_mask,
                    rects: active_rects.to_vec(),
                }
            } else {
                frame.clone()
            }
        });
        let frames: Vec<Frame> = frames.collect();
        AnnotationSnapshot::from_frames(
            self.dataset_path.clone().unwrap_or_default(),
            &frames,
        )
    }

    /// Put the rectangles of a snapshot back onto their frames.
    ///
    /// Entries for frames outside the dataset are skipped. The active
    /// frame's rectangles go through `editor`. Returns the number of frames
    /// restored.
    pub fn restore(&mut self, snapshot: &AnnotationSnapshot, editor: &mut impl Checkout) -> usize {
        if self.dataset_path.as_deref() != Some(snapshot.dataset_path.as_str()) {
            log::warn!(
                "Restoring annotations of {} onto dataset {:?}",
                snapshot.dataset_path,
                self.dataset_path
            );
        }

        let mut restored = 0;
        for entry in &snapshot.frames {
            if entry.index >= self.frames.len() {
                log::warn!("Skipping annotations for missing frame {}", entry.index);
                continue;
            }
            if entry.index == self.active {
                editor.checkout(entry.rects.clone());
            } else {
                self.frames[entry.index].rects = entry.rects.clone();
            }
            restored += 1;
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::editor::tests::{editor_with_surface, Event};

    struct SwapOnly(Vec<Rectangle>);

    impl Checkout for SwapOnly {
        fn checkout(&mut self, rects: Vec<Rectangle>) -> Vec<Rectangle> {
            std::mem::replace(&mut self.0, rects)
        }
    }

    fn rect(x: f64) -> Rectangle {
        Rectangle::new(x, x, 10.0, 10.0, (100, 100))
    }

    #[test]
    fn test_load_resets_frames() {
        let mut frames = FrameCollection::new();
        frames.load("/ds", 3, &[true, false, true]);

        let flags: Vec<bool> = frames.frames().iter().map(|f| f.has_existing_mask).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert!(frames.frames().iter().all(|f| f.rects.is_empty()));
        assert_eq!(frames.active_index(), 0);
        assert_eq!(frames.dataset_path(), Some("/ds"));
    }

    #[test]
    fn test_load_pads_and_truncates_flags() {
        let mut frames = FrameCollection::new();
        frames.load("/ds", 3, &[true]);
        let flags: Vec<bool> = frames.frames().iter().map(|f| f.has_existing_mask).collect();
        assert_eq!(flags, vec![true, false, false]);

        frames.load("/ds", 1, &[false, true]);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_reload_discards_state() {
        let mut frames = FrameCollection::new();
        let mut editor = SwapOnly(vec![rect(1.0)]);
        frames.load("/a", 2, &[false, false]);
        frames.select_frame(1, &mut editor);
        assert!(!frames.frames()[0].rects.is_empty());

        frames.load("/b", 2, &[false, false]);
        assert_eq!(frames.active_index(), 0);
        assert!(frames.frames().iter().all(|f| f.rects.is_empty()));
    }

    #[test]
    fn test_select_frame_archives_outgoing_rects() {
        let (mut editor, log) = editor_with_surface((100, 100));
        let mut frames = FrameCollection::new();
        frames.load("/ds", 2, &[false, false]);

        editor.add(1.0, 1.0, 5.0, 5.0);
        editor.add(2.0, 2.0, 5.0, 5.0);
        editor.add(3.0, 3.0, 5.0, 5.0);
        editor.undo();
        let pending = editor.rectangles().to_vec();
        assert_eq!(pending.len(), 2);
        assert!(editor.can_redo());
        log.borrow_mut().clear();

        frames.select_frame(1, &mut editor);

        assert_eq!(frames.frames()[0].rects, pending);
        assert!(editor.rectangles().is_empty());
        assert!(editor.history().is_empty());
        assert_eq!(frames.active_index(), 1);
        assert_eq!(*log.borrow(), vec![Event::Clear]);
    }

    #[test]
    fn test_select_frame_round_trip_restores_rects() {
        let mut frames = FrameCollection::new();
        let mut editor = SwapOnly(vec![rect(1.0), rect(2.0)]);
        frames.load("/ds", 3, &[false; 3]);

        frames.select_frame(2, &mut editor);
        editor.0.push(rect(9.0));
        frames.select_frame(0, &mut editor);

        assert_eq!(editor.0, vec![rect(1.0), rect(2.0)]);
        assert_eq!(frames.frames()[2].rects, vec![rect(9.0)]);
        assert!(frames.frames()[0].rects.is_empty());
    }

    #[test]
    fn test_select_same_frame_is_noop() {
        let mut frames = FrameCollection::new();
        let mut editor = SwapOnly(vec![rect(1.0)]);
        frames.load("/ds", 2, &[false, false]);

        frames.select_frame(0, &mut editor);
        assert_eq!(editor.0, vec![rect(1.0)]);
        assert!(frames.frames()[0].rects.is_empty());
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut frames = FrameCollection::new();
        let mut editor = SwapOnly(vec![rect(1.0)]);
        frames.load("/ds", 2, &[false, false]);

        frames.select_frame(5, &mut editor);
        assert_eq!(frames.active_index(), 0);
        assert_eq!(editor.0, vec![rect(1.0)]);
    }

    #[test]
    fn test_mark_mask_absent_and_save_target() {
        let mut frames = FrameCollection::new();
        assert_eq!(frames.save_target(), None);

        frames.load("/ds", 2, &[true, true]);
        assert_eq!(
            frames.save_target(),
            Some(SaveTarget {
                frame: 0,
                keep_mask: true
            })
        );

        frames.mark_mask_absent();
        assert!(!frames.frames()[0].has_existing_mask);
        assert!(frames.frames()[1].has_existing_mask);
        assert_eq!(frames.save_target().map(|t| t.keep_mask), Some(false));
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut frames = FrameCollection::new();
        let mut editor = SwapOnly(Vec::new());
        frames.load("/ds", 3, &[false, true, false]);
        editor.0 = vec![rect(1.0)];
        frames.select_frame(1, &mut editor);
        editor.0 = vec![rect(2.0), rect(3.0)];

        let snapshot = frames.snapshot(&editor.0);
        assert_eq!(snapshot.dataset_path, "/ds");
        assert_eq!(snapshot.frames.len(), 2);
        assert_eq!(snapshot.rect_count(), 3);

        let mut fresh = FrameCollection::new();
        let mut fresh_editor = SwapOnly(Vec::new());
        fresh.load("/ds", 3, &[false, true, false]);
        assert_eq!(fresh.restore(&snapshot, &mut fresh_editor), 2);

        assert_eq!(fresh_editor.0, vec![rect(1.0)]);
        assert_eq!(fresh.frames()[1].rects, vec![rect(2.0), rect(3.0)]);
    }

    #[test]
    fn test_restore_skips_missing_frames() {
        let mut frames = FrameCollection::new();
        let mut editor = SwapOnly(Vec::new());
        frames.load("/ds", 4, &[false; 4]);
        frames.select_frame(3, &mut editor);
        let snapshot = frames.snapshot(&[rect(5.0)]);

        let mut small = FrameCollection::new();
        small.load("/ds", 2, &[false; 2]);
        assert_eq!(small.restore(&snapshot, &mut editor), 0);
    }
}
