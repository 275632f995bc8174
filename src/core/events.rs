use serde::Serialize;
use crate::core::{ArchiveBlob, ImageArtifact, ImageId, ImageSize};
use crate::utils::ResizerError;

/// Notifications published by the batch coordinator.
///
/// A front end subscribes to these instead of polling; every event is
/// serializable so it can be forwarded as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BatchEvent {
    #[serde(rename_all = "camelCase")]
    ImageAdded { id: ImageId, name: String },
    #[serde(rename_all = "camelCase")]
    Decoded { id: ImageId, natural_size: ImageSize, original: ImageArtifact },
    #[serde(rename_all = "camelCase")]
    DecodeFailed { id: ImageId, error: ResizerError },
    #[serde(rename_all = "camelCase")]
    ResizeStarted { id: ImageId, target_size: ImageSize },
    #[serde(rename_all = "camelCase")]
    ResizeFinished { id: ImageId, target_size: ImageSize, artifact: ImageArtifact },
    #[serde(rename_all = "camelCase")]
    ResizeFailed { id: ImageId, target_size: ImageSize, error: ResizerError },
    #[serde(rename_all = "camelCase")]
    ImageRemoved { id: ImageId },
    Cleared,
    #[serde(rename_all = "camelCase")]
    ArchiveReady { archive: ArchiveBlob },
    #[serde(rename_all = "camelCase")]
    ArchiveFailed { generation: u64, error: ResizerError },
}

impl BatchEvent {
    /// Image the event refers to, if any.
    pub fn image_id(&self) -> Option<ImageId> {
        match self {
            Self::ImageAdded { id, .. }
            | Self::Decoded { id, .. }
            | Self::DecodeFailed { id, .. }
            | Self::ResizeStarted { id, .. }
            | Self::ResizeFinished { id, .. }
            | Self::ResizeFailed { id, .. }
            | Self::ImageRemoved { id } => Some(*id),
            Self::Cleared | Self::ArchiveReady { .. } | Self::ArchiveFailed { .. } => None,
        }
    }
}
