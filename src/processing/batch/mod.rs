//! Batch-level state shared by every image of a session.

mod busy;
mod coordinator;
mod export;

pub use busy::{BusyGuard, ResizeBusyCounter};
pub use coordinator::BatchCoordinator;
pub use export::{RebuildOutcome, RebuildTracker, export_entries};
