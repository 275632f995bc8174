//! Archive packager bundling the current artifacts into one zip.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::{ArchiveBlob, ArchiveCompression};
use crate::utils::{ResizerError, ResizerResult};

/// One file to store in the archive.
#[derive(Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Arc<[u8]>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl std::fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Builds the archive on the blocking pool.
pub async fn build_archive(
    entries: Vec<ArchiveEntry>,
    compression: ArchiveCompression,
    generation: u64,
) -> ResizerResult<ArchiveBlob> {
    tokio::task::spawn_blocking(move || build_archive_blocking(&entries, compression, generation)).await?
}

/// Writes `entries` into a new zip held in memory.
///
/// Entry names map to files like keys in a map: when two entries share a name the
/// later one wins and the earlier one is dropped. An empty input yields a valid,
/// empty archive.
pub fn build_archive_blocking(
    entries: &[ArchiveEntry],
    compression: ArchiveCompression,
    generation: u64,
) -> ResizerResult<ArchiveBlob> {
    let kept = last_wins(entries);
    let options = SimpleFileOptions::default().compression_method(match compression {
        ArchiveCompression::Stored => CompressionMethod::Stored,
        ArchiveCompression::Deflated => CompressionMethod::Deflated,
    });

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &kept {
        writer.start_file(entry.name.as_str(), options)?;
        writer
            .write_all(&entry.data)
            .map_err(|e| ResizerError::packaging(format!("Failed to write '{}': {e}", entry.name)))?;
    }
    let data = writer.finish()?.into_inner();

    debug!(
        "Built archive generation {} with {} entries ({} bytes)",
        generation,
        kept.len(),
        data.len()
    );

    Ok(ArchiveBlob::new(data, kept.len(), generation))
}

fn last_wins(entries: &[ArchiveEntry]) -> Vec<&ArchiveEntry> {
    let mut last_index: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        if let Some(previous) = last_index.insert(entry.name.as_str(), idx) {
            warn!(
                "Duplicate archive entry '{}': entry {} replaces entry {}",
                entry.name, idx, previous
            );
        }
    }

    entries
        .iter()
        .enumerate()
        .filter(|(idx, entry)| last_index.get(entry.name.as_str()) == Some(idx))
        .map(|(_, entry)| entry)
        .collect()
}
