// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data structures shared between the editor, the frame store and the
//! backends.

pub mod frame;
pub mod project;
pub mod rectangle;
