//! Export list derivation and last-initiated-wins archive rebuild tracking.

use std::collections::HashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::{ArchiveBlob, ImageArtifact, ImageId};
use crate::processing::archive::ArchiveEntry;
use crate::utils::{ResizerError, ResizerResult};

/// Entries to package: selection order, restricted to images that have an artifact.
pub fn export_entries(selection: &[ImageId], artifacts: &HashMap<ImageId, ImageArtifact>) -> Vec<ArchiveEntry> {
    selection
        .iter()
        .filter_map(|id| artifacts.get(id))
        .map(|artifact| ArchiveEntry::new(artifact.name.clone(), artifact.data.clone()))
        .collect()
}

/// What happened to a finished rebuild.
#[derive(Debug, Clone, PartialEq)]
pub enum RebuildOutcome {
    /// Latest rebuild succeeded and is now the current archive
    Committed(ArchiveBlob),
    /// Latest rebuild failed; the previous archive is kept
    Failed(ResizerError),
    /// A newer rebuild was started after this one; result discarded
    Superseded,
}

#[derive(Debug, Default)]
struct RebuildState {
    /// Generation of the most recently started rebuild
    requested: u64,
    /// Generation of the most recently finished rebuild that was still the latest
    settled: u64,
    archive: Option<ArchiveBlob>,
    last_error: Option<ResizerError>,
}

/// Tracks archive rebuilds so that only the most recently started one is accepted.
#[derive(Debug, Default)]
pub struct RebuildTracker {
    state: Mutex<RebuildState>,
}

impl RebuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a rebuild and returns its generation.
    pub fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.requested += 1;
        state.requested
    }

    /// Records the result of rebuild `generation`.
    pub fn complete(&self, generation: u64, result: ResizerResult<ArchiveBlob>) -> RebuildOutcome {
        let mut state = self.state.lock();

        if generation != state.requested {
            debug!(
                "Discarding archive generation {} (latest is {})",
                generation, state.requested
            );
            return RebuildOutcome::Superseded;
        }

        state.settled = generation;
        match result {
            Ok(archive) => {
                state.archive = Some(archive.clone());
                state.last_error = None;
                RebuildOutcome::Committed(archive)
            }
            Err(e) => {
                warn!("Archive generation {} failed: {}", generation, e);
                state.last_error = Some(e.clone());
                RebuildOutcome::Failed(e)
            }
        }
    }

    /// The archive matching the latest requested rebuild, if it has been built.
    pub fn ready(&self) -> Option<ArchiveBlob> {
        let state = self.state.lock();
        state
            .archive
            .as_ref()
            .filter(|archive| archive.generation == state.requested)
            .cloned()
    }

    /// Last successfully built archive, even if a newer rebuild is pending or failed.
    #[cfg(test)]
    pub fn last_built(&self) -> Option<ArchiveBlob> {
        self.state.lock().archive.clone()
    }

    /// Error of the latest rebuild, if it failed.
    pub fn last_error(&self) -> Option<ResizerError> {
        let state = self.state.lock();
        if state.settled == state.requested {
            state.last_error.clone()
        } else {
            None
        }
    }

    /// Whether the latest requested rebuild has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        let state = self.state.lock();
        state.settled == state.requested
    }
}
