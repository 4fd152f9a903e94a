//! Client-side image downsizing
//!
//! Captured photos are shrunk before upload when a resize policy is
//! configured. Normalization is best effort: any decode or encode failure,
//! or an output that is not strictly smaller, falls back to the original
//! bytes. A submission never aborts here.

use crate::models::{CapturedImage, MediaAsset};
use fieldops_common::config::{MediaConfig, DEFAULT_JPEG_QUALITY};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Target size as a percentage of each original dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePolicy {
    pub percent: u32,
    pub jpeg_quality: u8,
}

impl SizePolicy {
    pub fn new(percent: u32) -> Self {
        Self {
            percent,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Policy from the `[media]` table; `resize_percent` 0 or unset disables resizing
    pub fn from_config(config: &MediaConfig) -> Option<Self> {
        Self::with_override(None, config)
    }

    /// Like [`SizePolicy::from_config`], with `percent` (from the command
    /// line) taking priority over `resize_percent`
    pub fn with_override(percent: Option<u32>, config: &MediaConfig) -> Option<Self> {
        match percent.or(config.resize_percent) {
            Some(percent) if percent > 0 => Some(Self {
                percent,
                jpeg_quality: config.jpeg_quality.clamp(1, 100),
            }),
            _ => None,
        }
    }

    /// Resizing can only shrink below 100%
    pub fn shrinks(&self) -> bool {
        self.percent > 0 && self.percent < 100
    }

    fn scale(&self, dimension: u32) -> u32 {
        ((dimension as u64 * self.percent as u64) / 100).max(1) as u32
    }
}

/// Normalize one captured image, falling back to the input on any failure
pub fn normalize(raw: CapturedImage, policy: Option<&SizePolicy>) -> CapturedImage {
    let policy = match policy {
        Some(policy) if policy.shrinks() => policy,
        _ => return raw,
    };

    match downsize(&raw, policy) {
        Ok(resized) if resized.len() < raw.len() => {
            tracing::debug!(
                file = %raw.file_name,
                original_bytes = raw.len(),
                resized_bytes = resized.len(),
                percent = policy.percent,
                "Image downsized"
            );
            resized
        }
        Ok(resized) => {
            tracing::debug!(
                file = %raw.file_name,
                original_bytes = raw.len(),
                resized_bytes = resized.len(),
                "Resized image not smaller, keeping original"
            );
            raw
        }
        Err(e) => {
            tracing::warn!(file = %raw.file_name, error = %e, "Image normalization failed, keeping original");
            raw
        }
    }
}

fn downsize(raw: &CapturedImage, policy: &SizePolicy) -> Result<CapturedImage, MediaError> {
    let decoded =
        image::load_from_memory(&raw.bytes).map_err(|e| MediaError::Decode(e.to_string()))?;

    let width = policy.scale(decoded.width());
    let height = policy.scale(decoded.height());
    let resized = decoded.resize_exact(width, height, FilterType::Triangle);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, policy.jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| MediaError::Encode(e.to_string()))?;

    Ok(CapturedImage::new(
        jpeg_file_name(&raw.file_name),
        "image/jpeg",
        bytes,
    ))
}

fn jpeg_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    format!("{}.jpg", stem)
}

/// Applies one [`SizePolicy`] to every capture in a form session
#[derive(Debug, Clone, Default)]
pub struct MediaNormalizer {
    policy: Option<SizePolicy>,
}

impl MediaNormalizer {
    pub fn new(policy: Option<SizePolicy>) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(SizePolicy::from_config(config))
    }

    pub fn policy(&self) -> Option<&SizePolicy> {
        self.policy.as_ref()
    }

    pub fn normalize(&self, raw: CapturedImage) -> CapturedImage {
        normalize(raw, self.policy.as_ref())
    }

    /// Normalize a captured image into a pending asset
    pub fn to_asset(&self, raw: CapturedImage) -> MediaAsset {
        MediaAsset::Pending(self.normalize(raw))
    }
}
