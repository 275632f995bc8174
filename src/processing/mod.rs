//! Image processing pipeline.
//!
//! - [`codec`]: decode, resize and re-encode image bytes
//! - [`archive`]: package artifacts into a zip
//! - [`controller`]: per-image resize lifecycle
//! - [`batch`]: selection, busy tracking and export

pub mod archive;
pub mod batch;
pub mod codec;
pub mod controller;
pub mod resize;

pub use archive::{ArchiveEntry, build_archive};
pub use batch::BatchCoordinator;
pub use codec::{DecodedImage, decode, encode_resized, measure_encoded_size};
pub use controller::{ControllerContext, ImageResizeController, ImageSnapshot, ResizeListener, ResizeStatus};
pub use resize::{SizeEdit, apply_edit, fit_within};
