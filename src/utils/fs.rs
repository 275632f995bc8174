use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use crate::core::{ArchiveBlob, ImageArtifact};
use crate::utils::{ResizerError, ResizerResult, validate_file_name};

/// Reads a selected file, returning its display name and raw bytes.
pub async fn read_input(path: impl AsRef<Path>) -> ResizerResult<(String, Vec<u8>)> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ResizerError::IO(format!("Not a file path: {}", path.display())))?
        .to_string();

    let bytes = fs::read(path)
        .await
        .map_err(|e| ResizerError::IO(format!("Failed to read {}: {e}", path.display())))?;

    debug!("Read '{}' ({} bytes)", name, bytes.len());
    Ok((name, bytes))
}

/// Saves a single artifact as `<dir>/<artifact.name>`.
pub async fn save_artifact(dir: impl AsRef<Path>, artifact: &ImageArtifact) -> ResizerResult<PathBuf> {
    write_named(dir.as_ref(), &artifact.name, &artifact.data).await
}

/// Saves the batch archive as `<dir>/<name>`.
pub async fn save_archive(dir: impl AsRef<Path>, archive: &ArchiveBlob, name: &str) -> ResizerResult<PathBuf> {
    write_named(dir.as_ref(), name, &archive.data).await
}

async fn write_named(dir: &Path, name: &str, data: &[u8]) -> ResizerResult<PathBuf> {
    validate_file_name(name)?;
    fs::create_dir_all(dir).await?;

    let target = dir.join(name);
    fs::write(&target, data)
        .await
        .map_err(|e| ResizerError::IO(format!("Failed to write {}: {e}", target.display())))?;

    debug!("Wrote {} bytes to {}", data.len(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ImageSize;

    #[tokio::test]
    async fn artifact_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ImageArtifact::new("out.png", vec![1, 2, 3, 4], ImageSize::new(1, 1));

        let path = save_artifact(dir.path(), &artifact).await.unwrap();
        assert_eq!(path, dir.path().join("out.png"));

        let (name, bytes) = read_input(&path).await.unwrap();
        assert_eq!(name, "out.png");
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let archive = ArchiveBlob::new(vec![0; 22], 0, 1);

        let path = save_archive(&nested, &archive, "images.zip").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, ResizerError::IO(_)));
    }
}
