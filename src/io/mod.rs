// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: mask backends, background jobs and snapshot files.

pub mod background;
pub mod backend;
pub mod http;
pub mod local;
pub mod mask;
pub mod serialization;
