use std::time::Duration;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Quiet period after the last size edit before a resize runs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Square box the previews are fitted into.
pub const PREVIEW_BOX_SIZE: u32 = 256;
/// File name of the batch download.
pub const ARCHIVE_NAME: &str = "images.zip";

/// Resampling filter used when rendering a resized image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear; comparable to a canvas draw
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// How archive entries are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArchiveCompression {
    /// Encoded images are already compressed
    #[default]
    Stored,
    Deflated,
}

/// Settings for a resize session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizerConfig {
    pub debounce_ms: u64,
    pub preview_box: u32,
    pub archive_name: String,
    pub filter: ResizeFilter,
    pub compression: ArchiveCompression,
    /// Initial state of the per-image aspect ratio lock
    pub keep_aspect_ratio: bool,
    /// Capacity of the batch event broadcast channel
    pub event_capacity: usize,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            preview_box: PREVIEW_BOX_SIZE,
            archive_name: ARCHIVE_NAME.to_string(),
            filter: ResizeFilter::default(),
            compression: ArchiveCompression::default(),
            keep_aspect_ratio: true,
            event_capacity: 256,
        }
    }
}

impl ResizerConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResizerConfig::default();
        assert_eq!(config.debounce_window(), Duration::from_millis(500));
        assert_eq!(config.archive_name, "images.zip");
        assert!(config.keep_aspect_ratio);
    }

    #[test]
    fn deserializes_camel_case() {
        let json = r#"{
            "debounceMs": 50,
            "previewBox": 128,
            "archiveName": "out.zip",
            "filter": "lanczos3",
            "compression": "deflated",
            "keepAspectRatio": false,
            "eventCapacity": 8
        }"#;
        let config: ResizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.filter, ResizeFilter::Lanczos3);
        assert_eq!(config.compression, ArchiveCompression::Deflated);
        assert_eq!(config.debounce_window(), Duration::from_millis(50));
    }
}
