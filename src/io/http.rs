// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask backend reached over HTTP.
//!
//! The server answers every endpoint with status 200; failures come back as
//! a JSON object with an `error` field, which is turned into an `Err` here.

use super::backend::MaskBackend;
use crate::models::frame::{DatasetInfo, GenerateMaskRequest};
use anyhow::{anyhow, bail, Context, Result};
use image::{DynamicImage, RgbaImage};
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize, Serialize,
};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Failed { error: String },
    Done(T),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Reply::Failed { error } => Err(anyhow!(error)),
            Reply::Done(value) => Ok(value),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

#[derive(Debug, Serialize)]
struct SetDatasetPath<'a> {
    path: &'a str,
    #[serde(rename = "makeSafetyCopy")]
    make_safety_copy: bool,
}

/// Client for the mask-generation REST API.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: Option<&B>) -> Result<T> {
        let url = self.url(endpoint);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let reply: Reply<T> = request
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .with_context(|| format!("request to {} failed", url))?;
        reply.into_result()
    }

    fn get_image(&self, endpoint: &str) -> Result<DynamicImage> {
        let url = self.url(endpoint);
        let bytes = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .with_context(|| format!("request to {} failed", url))?;
        decode_image(&bytes)
    }
}

/// Decode an image reply, surfacing a JSON error body as an error.
fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if let Ok(reply) = serde_json::from_slice::<ErrorReply>(bytes) {
        bail!(reply.error);
    }
    Ok(image::load_from_memory(bytes)?)
}

impl MaskBackend for HttpBackend {
    fn set_dataset(&self, path: &Path, make_safety_copy: bool) -> Result<DatasetInfo> {
        let path = path
            .to_str()
            .ok_or_else(|| anyhow!("dataset path is not valid UTF-8: {}", path.display()))?;
        self.post(
            "set-dataset-path",
            Some(&SetDatasetPath {
                path,
                make_safety_copy,
            }),
        )
    }

    fn current_dataset(&self) -> Result<DatasetInfo> {
        self.post::<(), _>("current-dataset", None)
    }

    fn frame_image(&self, index: usize) -> Result<DynamicImage> {
        self.get_image(&format!("image/{}", index))
    }

    fn mask_overlay(&self, index: usize) -> Result<RgbaImage> {
        Ok(self.get_image(&format!("mask/{}", index))?.to_rgba8())
    }

    fn generate_mask(&self, index: usize, request: &GenerateMaskRequest) -> Result<()> {
        let _: IgnoredAny = self.post(&format!("generate-mask/{}", index), Some(request))?;
        Ok(())
    }
}
