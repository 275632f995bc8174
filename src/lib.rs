// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod debouncer;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{ArchiveBlob, BatchEvent, ImageArtifact, ImageId, ImageSize, ResizerConfig};
pub use processing::{BatchCoordinator, ImageResizeController, ImageSnapshot, ResizeStatus};
pub use utils::{ResizerError, ResizerResult};

// The interactive shell lives in main.rs; this file is the library surface.
