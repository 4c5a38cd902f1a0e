// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROIMASK - Rectangle masks for image datasets
//!
//! Rectangles drawn over dataset frames are kept per frame with undo/redo,
//! rescaled whenever the canvas changes size, and sent to a mask backend
//! that turns them into mask images.

pub mod app;
pub mod config;
pub mod io;
pub mod models;
pub mod state;
pub mod ui;
pub mod util;
