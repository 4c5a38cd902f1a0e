// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation state: the rectangle editor, the per-frame store and the
//! session that connects them to a backend.

pub mod editor;
pub mod frames;
pub mod session;
