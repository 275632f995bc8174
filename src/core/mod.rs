//! Core types and configuration.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`ImageSize`], [`AspectRatio`]: pixel geometry
//! - [`ImageArtifact`], [`ArchiveBlob`]: encoded outputs
//! - [`InputImage`], [`ImageId`]: selected inputs
//! - [`ResizerConfig`]: session settings
//! - [`BatchEvent`]: notifications for a front end

mod config;
mod events;
mod input;
mod types;

pub use config::{ResizerConfig, ResizeFilter, ArchiveCompression, ARCHIVE_NAME, DEFAULT_DEBOUNCE_MS, PREVIEW_BOX_SIZE};
pub use events::BatchEvent;
pub use input::{ImageId, InputImage};
pub use types::{ImageSize, AspectRatio, ImageArtifact, ArchiveBlob};
