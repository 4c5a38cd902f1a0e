// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation snapshot serialization and deserialization.
//!
//! This module handles exporting and importing the committed rectangles of
//! a dataset in YAML and JSON formats.

use crate::models::project::AnnotationSnapshot;
use anyhow::{bail, Result};
use std::path::Path;

/// File formats a snapshot can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str());
        match extension {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => bail!("Unsupported file extension: {:?}", extension),
        }
    }
}

/// Export a snapshot to YAML format.
pub fn export_yaml(data: &AnnotationSnapshot, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a snapshot to JSON format.
pub fn export_json(data: &AnnotationSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a snapshot from YAML format.
pub fn import_yaml(path: &Path) -> Result<AnnotationSnapshot> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import a snapshot from JSON format.
pub fn import_json(path: &Path) -> Result<AnnotationSnapshot> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Export in the format the extension of `path` names.
pub fn export(data: &AnnotationSnapshot, path: &Path) -> Result<()> {
    match Format::from_path(path)? {
        Format::Yaml => export_yaml(data, path),
        Format::Json => export_json(data, path),
    }
}

/// Import in the format the extension of `path` names.
pub fn import(path: &Path) -> Result<AnnotationSnapshot> {
    match Format::from_path(path)? {
        Format::Yaml => import_yaml(path),
        Format::Json => import_json(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{project::FrameAnnotations, rectangle::Rectangle};

    fn sample() -> AnnotationSnapshot {
        AnnotationSnapshot {
            dataset_path: "/data/scene".to_string(),
            frames: vec![FrameAnnotations {
                index: 4,
                has_existing_mask: true,
                rects: vec![Rectangle::new(1.5, 2.0, 30.0, 40.25, (800, 600))],
            }],
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.yml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("a.txt")).is_err());
        assert!(Format::from_path(Path::new("annotations")).is_err());
    }

    #[test]
    fn test_export_import_by_extension() {
        let dir = std::env::temp_dir().join(format!("roimask-serialization-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        for name in ["annotations.yaml", "annotations.json"] {
            let path = dir.join(name);
            export(&sample(), &path).unwrap();
            assert_eq!(import(&path).unwrap(), sample());
        }
    }

    #[test]
    fn test_import_without_mask_flag() {
        let dir = std::env::temp_dir().join(format!("roimask-legacy-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("old.yaml");
        std::fs::write(
            &path,
            "dataset_path: /ds\nframes:\n- index: 0\n  rects:\n  - {x: 1, y: 2, width: 3, height: 4, img_width: 10, img_height: 10}\n",
        )
        .unwrap();

        let snapshot = import(&path).unwrap();
        assert!(!snapshot.frames[0].has_existing_mask);
        assert_eq!(snapshot.frames[0].rects[0].height, 4.0);
    }
}
