// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the ROIMASK application.

pub mod canvas;
pub mod frame_list;
pub mod surface;
pub mod toolbar;
