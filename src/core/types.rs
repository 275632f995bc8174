//! Core value types shared by the codec, the controllers and the batch.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image.
///
/// Either dimension may be zero while a size is being edited; zero sizes are
/// rejected only when a resize actually fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Natural width divided by natural height, fixed once an image is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AspectRatio(f64);

impl AspectRatio {
    /// Returns `None` for a degenerate natural size.
    pub fn from_size(size: ImageSize) -> Option<Self> {
        if size.is_empty() {
            None
        } else {
            Some(Self(size.width as f64 / size.height as f64))
        }
    }

    /// Height that keeps this ratio for `width`. Floored at 1 for any non-zero width.
    pub fn height_for(&self, width: u32) -> u32 {
        linked_dimension(width, width as f64 / self.0)
    }

    /// Width that keeps this ratio for `height`. Floored at 1 for any non-zero height.
    pub fn width_for(&self, height: u32) -> u32 {
        linked_dimension(height, height as f64 * self.0)
    }
}

fn linked_dimension(source: u32, computed: f64) -> u32 {
    if source == 0 {
        return 0;
    }
    (computed.round() as u32).max(1)
}

/// An encoded image (original or resized) plus its byte size.
///
/// Artifacts are immutable; a newer artifact for the same image supersedes the
/// old one instead of modifying it. The encoded bytes are shared, so cloning is cheap.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageArtifact {
    /// File name used when saving or packaging
    pub name: String,
    /// Encoded bytes
    #[serde(skip)]
    pub data: Arc<[u8]>,
    /// Exact length of `data`
    pub byte_size: u64,
    /// Pixel dimensions the bytes were rendered at
    pub size: ImageSize,
}

impl ImageArtifact {
    pub fn new(name: impl Into<String>, data: Vec<u8>, size: ImageSize) -> Self {
        Self::from_shared(name, data.into(), size)
    }

    /// Wraps bytes that are already shared, e.g. the original upload.
    pub fn from_shared(name: impl Into<String>, data: Arc<[u8]>, size: ImageSize) -> Self {
        let byte_size = crate::processing::codec::measure_encoded_size(&data);
        Self {
            name: name.into(),
            data,
            byte_size,
            size,
        }
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("name", &self.name)
            .field("byte_size", &self.byte_size)
            .field("size", &self.size)
            .finish()
    }
}

/// A built batch archive.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveBlob {
    #[serde(skip)]
    pub data: Arc<[u8]>,
    /// Number of files stored in the archive (after last-wins name collisions)
    pub entry_count: usize,
    pub byte_size: u64,
    /// Rebuild generation that produced this archive
    pub generation: u64,
}

impl ArchiveBlob {
    pub fn new(data: Vec<u8>, entry_count: usize, generation: u64) -> Self {
        let byte_size = data.len() as u64;
        Self {
            data: data.into(),
            entry_count,
            byte_size,
            generation,
        }
    }
}

impl fmt::Debug for ArchiveBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveBlob")
            .field("entry_count", &self.entry_count)
            .field("byte_size", &self.byte_size)
            .field("generation", &self.generation)
            .finish()
    }
}
