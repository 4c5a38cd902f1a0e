// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are read from a YAML file: the one named by `ROIMASK_CONFIG`,
//! else `roimask.yaml` in the working directory, else built-in defaults.
//! Keys missing from the file take their default values.

use crate::io::{backend::MaskBackend, http, http::HttpBackend, local::LocalBackend};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_ENV: &str = "ROIMASK_CONFIG";
pub const CONFIG_FILE: &str = "roimask.yaml";

/// Where datasets are opened and masks generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Remote mask-generation API
    Http {
        #[serde(default = "default_url")]
        url: String,
    },
    /// Dataset directories on this machine
    Local,
}

fn default_url() -> String {
    http::DEFAULT_URL.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Http { url: default_url() }
    }
}

impl BackendConfig {
    pub fn connect(&self) -> Result<Arc<dyn MaskBackend>> {
        Ok(match self {
            BackendConfig::Http { url } => Arc::new(HttpBackend::new(url)?),
            BackendConfig::Local => Arc::new(LocalBackend::new()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    /// Back up existing masks when a dataset is opened
    pub make_safety_copy: bool,
    /// Dataset opened at startup instead of asking the backend
    pub dataset_path: Option<PathBuf>,
    /// RGBA fill of drawn rectangles
    pub fill_color: [u8; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            make_safety_copy: true,
            dataset_path: None,
            fill_color: [0, 0, 255, 255],
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from the environment-named file, the default file, or defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let default_path = Path::new(CONFIG_FILE);
        if default_path.is_file() {
            return Self::from_file(default_path);
        }
        log::info!("No {} found, using default settings", CONFIG_FILE);
        Ok(Self::default())
    }

    pub fn fill(&self) -> image::Rgba<u8> {
        image::Rgba(self.fill_color)
    }
}
