//! Interactive shell commands.
//!
//! - [`Command::parse`]: turn one input line into a command
//! - [`execute`]: run a command against a [`BatchCoordinator`](crate::processing::BatchCoordinator)

mod image;

pub use image::*;
