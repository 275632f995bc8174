//! Batch coordinator: owns the selection, one controller per image, the
//! artifact set, the shared busy counter and the batch archive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use tracing::{debug, info};

use crate::core::{ArchiveBlob, BatchEvent, ImageArtifact, ImageId, ImageSize, InputImage, ResizerConfig};
use crate::processing::archive::{ArchiveEntry, build_archive, build_archive_blocking};
use crate::processing::batch::busy::ResizeBusyCounter;
use crate::processing::batch::export::{RebuildOutcome, RebuildTracker, export_entries};
use crate::processing::controller::{ControllerContext, ImageResizeController, ImageSnapshot, ResizeListener};
use crate::utils::{ResizerError, ResizerResult};

#[derive(Default)]
struct BatchState {
    /// Selection order; every id has a controller
    selection: Vec<ImageId>,
    controllers: HashMap<ImageId, ImageResizeController>,
    /// Latest artifact per image; keys are always a subset of `selection`
    artifacts: HashMap<ImageId, ImageArtifact>,
}

impl BatchState {
    fn is_selected(&self, id: ImageId) -> bool {
        self.controllers.contains_key(&id)
    }

    fn controller(&self, id: ImageId) -> ResizerResult<&ImageResizeController> {
        self.controllers
            .get(&id)
            .ok_or_else(|| ResizerError::state(format!("Unknown image {}", id)))
    }
}

struct Shared {
    config: Arc<ResizerConfig>,
    batch: Mutex<BatchState>,
    busy: ResizeBusyCounter,
    rebuilds: RebuildTracker,
    changed: Arc<Notify>,
    events: broadcast::Sender<BatchEvent>,
    next_id: AtomicU64,
}

impl Shared {
    fn emit(&self, event: BatchEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Starts an archive rebuild from the current export list.
    ///
    /// Called with the batch lock held so generations follow the order of
    /// artifact-set changes.
    fn schedule_rebuild(self: &Arc<Self>, batch: &BatchState) {
        let generation = self.rebuilds.begin();
        let entries = export_entries(&batch.selection, &batch.artifacts);
        debug!("Rebuilding archive generation {} with {} entries", generation, entries.len());

        let shared = self.clone();
        tokio::spawn(async move {
            let result = build_archive(entries, shared.config.compression, generation).await;
            match shared.rebuilds.complete(generation, result) {
                RebuildOutcome::Committed(archive) => shared.emit(BatchEvent::ArchiveReady { archive }),
                RebuildOutcome::Failed(error) => shared.emit(BatchEvent::ArchiveFailed { generation, error }),
                RebuildOutcome::Superseded => {}
            }
            shared.changed.notify_waiters();
        });
    }

    /// Stores an artifact for a still-selected image and repackages.
    fn publish_artifact(self: &Arc<Self>, id: ImageId, artifact: &ImageArtifact, event: BatchEvent) {
        let mut batch = self.batch.lock();
        if !batch.is_selected(id) {
            debug!("Ignoring artifact for deselected image {}", id);
            return;
        }
        batch.artifacts.insert(id, artifact.clone());
        self.emit(event);
        self.schedule_rebuild(&batch);
    }

    /// Emits an event only if `id` is still selected.
    fn emit_for(&self, id: ImageId, event: BatchEvent) {
        let batch = self.batch.lock();
        if batch.is_selected(id) {
            self.emit(event);
        }
    }
}

/// Routes controller callbacks into the shared batch state.
///
/// Holds a weak reference since the controllers live inside the batch state.
struct BatchListener(Weak<Shared>);

impl ResizeListener for BatchListener {
    fn decoded(&self, id: ImageId, natural_size: ImageSize, original: &ImageArtifact) {
        if let Some(shared) = self.0.upgrade() {
            let event = BatchEvent::Decoded {
                id,
                natural_size,
                original: original.clone(),
            };
            shared.publish_artifact(id, original, event);
        }
    }

    fn decode_failed(&self, id: ImageId, error: &ResizerError) {
        if let Some(shared) = self.0.upgrade() {
            shared.emit_for(id, BatchEvent::DecodeFailed { id, error: error.clone() });
        }
    }

    fn resize_started(&self, id: ImageId, target: ImageSize) {
        if let Some(shared) = self.0.upgrade() {
            shared.emit_for(id, BatchEvent::ResizeStarted { id, target_size: target });
        }
    }

    fn resize_finished(&self, id: ImageId, target: ImageSize, artifact: &ImageArtifact) {
        if let Some(shared) = self.0.upgrade() {
            let event = BatchEvent::ResizeFinished {
                id,
                target_size: target,
                artifact: artifact.clone(),
            };
            shared.publish_artifact(id, artifact, event);
        }
    }

    fn resize_failed(&self, id: ImageId, target: ImageSize, error: &ResizerError) {
        if let Some(shared) = self.0.upgrade() {
            shared.emit_for(id, BatchEvent::ResizeFailed {
                id,
                target_size: target,
                error: error.clone(),
            });
        }
    }
}

/// Coordinates a batch resize session.
///
/// All methods that start work (adding images, edits, removal) must be called
/// from within a Tokio runtime. Dropping the coordinator tears down every
/// controller.
pub struct BatchCoordinator {
    shared: Arc<Shared>,
    context: ControllerContext,
}

impl BatchCoordinator {
    pub fn new(config: ResizerConfig) -> Self {
        let config = Arc::new(config);
        let changed = Arc::new(Notify::new());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let shared = Arc::new(Shared {
            config: config.clone(),
            batch: Mutex::new(BatchState::default()),
            busy: ResizeBusyCounter::new(changed.clone()),
            rebuilds: RebuildTracker::new(),
            changed: changed.clone(),
            events,
            next_id: AtomicU64::new(1),
        });

        // The empty selection packages to a valid empty archive right away.
        let generation = shared.rebuilds.begin();
        shared
            .rebuilds
            .complete(generation, build_archive_blocking(&[], config.compression, generation));

        let context = ControllerContext {
            listener: Arc::new(BatchListener(Arc::downgrade(&shared))),
            busy: shared.busy.clone(),
            config,
            changed,
        };

        info!("Batch session started");
        Self { shared, context }
    }

    pub fn config(&self) -> &ResizerConfig {
        &self.shared.config
    }

    /// Adds files to the selection and starts decoding each one.
    ///
    /// Every file gets a fresh id, even if its name or bytes match an image
    /// that is already selected.
    pub fn add_images<I, N>(&self, files: I) -> Vec<ImageId>
    where
        I: IntoIterator<Item = (N, Vec<u8>)>,
        N: Into<String>,
    {
        let mut batch = self.shared.batch.lock();
        let added: Vec<_> = files
            .into_iter()
            .map(|(name, raw)| self.insert(&mut batch, name.into(), raw))
            .collect();

        if !added.is_empty() {
            info!("Added {} image(s); {} selected", added.len(), batch.selection.len());
            self.shared.schedule_rebuild(&batch);
        }
        added
    }

    pub fn add_image(&self, name: impl Into<String>, raw: Vec<u8>) -> ImageId {
        let mut batch = self.shared.batch.lock();
        let id = self.insert(&mut batch, name.into(), raw);
        self.shared.schedule_rebuild(&batch);
        id
    }

    fn insert(&self, batch: &mut BatchState, name: String, raw: Vec<u8>) -> ImageId {
        let id = ImageId::new(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let input = InputImage::new(id, name.clone(), raw);

        let controller = ImageResizeController::spawn(input, self.context.clone());
        batch.selection.push(id);
        batch.controllers.insert(id, controller);

        self.shared.emit(BatchEvent::ImageAdded { id, name });
        id
    }

    /// Removes one image, cancelling any pending or in-flight work for it.
    pub fn remove_image(&self, id: ImageId) -> ResizerResult<()> {
        let mut batch = self.shared.batch.lock();
        let controller = batch
            .controllers
            .remove(&id)
            .ok_or_else(|| ResizerError::state(format!("Unknown image {}", id)))?;
        controller.teardown();

        batch.selection.retain(|selected| *selected != id);
        batch.artifacts.remove(&id);

        self.shared.emit(BatchEvent::ImageRemoved { id });
        self.shared.schedule_rebuild(&batch);
        drop(batch);

        info!("Removed image {}", id);
        self.shared.changed.notify_waiters();
        Ok(())
    }

    /// Removes every image and resets the busy counter.
    pub fn clear_all(&self) {
        let mut batch = self.shared.batch.lock();
        let removed = batch.selection.len();
        for (_, controller) in batch.controllers.drain() {
            controller.teardown();
        }
        batch.selection.clear();
        batch.artifacts.clear();
        self.shared.busy.reset();

        self.shared.emit(BatchEvent::Cleared);
        self.shared.schedule_rebuild(&batch);
        drop(batch);

        info!("Cleared {} image(s)", removed);
        self.shared.changed.notify_waiters();
    }

    pub fn request_width(&self, id: ImageId, width: u32) -> ResizerResult<ImageSize> {
        self.shared.batch.lock().controller(id)?.request_width(width)
    }

    pub fn request_height(&self, id: ImageId, height: u32) -> ResizerResult<ImageSize> {
        self.shared.batch.lock().controller(id)?.request_height(height)
    }

    pub fn request_size(&self, id: ImageId, size: ImageSize) -> ResizerResult<ImageSize> {
        self.shared.batch.lock().controller(id)?.request_size(size)
    }

    pub fn set_keep_aspect_ratio(&self, id: ImageId, keep: bool) -> ResizerResult<()> {
        self.shared.batch.lock().controller(id)?.set_keep_aspect_ratio(keep)
    }

    pub fn image(&self, id: ImageId) -> ResizerResult<ImageSnapshot> {
        Ok(self.shared.batch.lock().controller(id)?.snapshot())
    }

    /// Snapshots of every selected image in selection order.
    pub fn images(&self) -> Vec<ImageSnapshot> {
        let batch = self.shared.batch.lock();
        batch
            .selection
            .iter()
            .filter_map(|id| batch.controllers.get(id))
            .map(ImageResizeController::snapshot)
            .collect()
    }

    pub fn selection(&self) -> Vec<ImageId> {
        self.shared.batch.lock().selection.clone()
    }

    /// Latest artifact for `id`, if it has decoded successfully.
    pub fn artifact(&self, id: ImageId) -> Option<ImageArtifact> {
        self.shared.batch.lock().artifacts.get(&id).cloned()
    }

    /// Files the archive holds, in selection order.
    pub fn export_entries(&self) -> Vec<ArchiveEntry> {
        let batch = self.shared.batch.lock();
        export_entries(&batch.selection, &batch.artifacts)
    }

    pub fn is_busy(&self) -> bool {
        self.shared.busy.is_busy()
    }

    pub fn busy_count(&self) -> usize {
        self.shared.busy.count()
    }

    /// Whether any selected image has not finished decoding.
    pub fn is_decoding(&self) -> bool {
        self.shared
            .batch
            .lock()
            .controllers
            .values()
            .any(ImageResizeController::is_decoding)
    }

    /// The archive for the current export list, if its rebuild has finished.
    pub fn ready_archive(&self) -> Option<ArchiveBlob> {
        self.shared.rebuilds.ready()
    }

    pub fn can_export(&self) -> bool {
        self.export_archive().is_ok()
    }

    /// Returns the archive to download, or why it cannot be downloaded yet.
    pub fn export_archive(&self) -> ResizerResult<ArchiveBlob> {
        {
            let batch = self.shared.batch.lock();
            if batch.selection.is_empty() {
                return Err(ResizerError::state("No images selected"));
            }
            if batch.controllers.values().any(ImageResizeController::is_decoding) {
                return Err(ResizerError::state("Images are still decoding"));
            }
            if batch.artifacts.is_empty() {
                return Err(ResizerError::state("No decoded images to export"));
            }
        }
        if self.is_busy() {
            return Err(ResizerError::state("Resizing in progress"));
        }

        match self.shared.rebuilds.ready() {
            Some(archive) => Ok(archive),
            None => match self.shared.rebuilds.last_error() {
                Some(e) => Err(e),
                None => Err(ResizerError::state("Archive is being rebuilt")),
            },
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.shared.events.subscribe()
    }

    /// Nothing is decoding, resizing, waiting out a debounce window or
    /// rebuilding the archive.
    pub fn is_settled(&self) -> bool {
        if self.shared.busy.is_busy() || !self.shared.rebuilds.is_settled() {
            return false;
        }
        self.shared
            .batch
            .lock()
            .controllers
            .values()
            .all(ImageResizeController::is_settled)
    }

    /// Waits until [`is_settled`](Self::is_settled) holds.
    ///
    /// Never resolves while a debounce window is open and nobody fires it, so
    /// callers waiting on user edits should bound this with a timeout.
    pub async fn settled(&self) {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_settled() {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for BatchCoordinator {
    fn drop(&mut self) {
        let mut batch = self.shared.batch.lock();
        debug!("Batch session closing with {} image(s)", batch.controllers.len());
        batch.controllers.clear();
    }
}
