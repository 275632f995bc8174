//! Per-image resize controller.
//!
//! One controller owns one selected image for its whole lifetime:
//! decode → natural size → debounced size edits → resize → report.
//! All work runs in a single worker task per image, so at most one resize is
//! ever in flight for an image.

use std::sync::Arc;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{AspectRatio, ImageArtifact, ImageId, ImageSize, InputImage, ResizerConfig};
use crate::debouncer::{DebounceReceiver, DebounceSender, debounce_channel};
use crate::processing::batch::ResizeBusyCounter;
use crate::processing::codec::{self, DecodedImage};
use crate::processing::resize::{SizeEdit, apply_edit, fit_within};
use crate::utils::{ResizerError, ResizerResult};

/// Lifecycle of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeStatus {
    Pending,
    Decoding,
    Ready,
    Resizing,
    /// Decoding failed; the image stays listed but never exports
    Failed,
    Removed,
}

/// Receives notifications from controllers.
///
/// Calls are made from the controller's worker task, never while the
/// controller's own state is locked.
pub trait ResizeListener: Send + Sync + 'static {
    fn decoded(&self, id: ImageId, natural_size: ImageSize, original: &ImageArtifact);
    fn decode_failed(&self, id: ImageId, error: &ResizerError);
    fn resize_started(&self, id: ImageId, target: ImageSize);
    fn resize_finished(&self, id: ImageId, target: ImageSize, artifact: &ImageArtifact);
    fn resize_failed(&self, id: ImageId, target: ImageSize, error: &ResizerError);
}

/// Shared collaborators handed to every controller of a batch.
#[derive(Clone)]
pub struct ControllerContext {
    pub listener: Arc<dyn ResizeListener>,
    pub busy: ResizeBusyCounter,
    pub config: Arc<ResizerConfig>,
    /// Woken after every status transition
    pub changed: Arc<Notify>,
}

/// Read-only view of a controller for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSnapshot {
    pub id: ImageId,
    pub name: String,
    pub status: ResizeStatus,
    pub natural_size: Option<ImageSize>,
    /// Size most recently asked for; may not be rendered yet
    pub requested_size: ImageSize,
    /// Size of the current preview artifact
    pub target_size: ImageSize,
    pub keep_aspect_ratio: bool,
    pub original: Option<ImageArtifact>,
    pub preview: Option<ImageArtifact>,
    /// Preview size fitted into the thumbnail box
    pub display_size: Option<ImageSize>,
    pub error: Option<ResizerError>,
}

struct ControllerState {
    status: ResizeStatus,
    natural_size: Option<ImageSize>,
    aspect_ratio: Option<AspectRatio>,
    requested: ImageSize,
    target: ImageSize,
    keep_aspect_ratio: bool,
    original: Option<ImageArtifact>,
    preview: Option<ImageArtifact>,
    error: Option<ResizerError>,
}

impl ControllerState {
    fn is_removed(&self) -> bool {
        self.status == ResizeStatus::Removed
    }
}

/// Owns the lifecycle of one input image.
///
/// Dropping the controller tears it down: the pending debounce window is
/// cancelled and the result of any in-flight work is discarded.
pub struct ImageResizeController {
    id: ImageId,
    name: String,
    preview_box: u32,
    state: Arc<Mutex<ControllerState>>,
    requests: DebounceSender<ImageSize>,
    worker: JoinHandle<()>,
}

impl ImageResizeController {
    /// Creates the controller and immediately starts decoding.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(input: InputImage, ctx: ControllerContext) -> Self {
        let state = Arc::new(Mutex::new(ControllerState {
            status: ResizeStatus::Pending,
            natural_size: None,
            aspect_ratio: None,
            requested: ImageSize::default(),
            target: ImageSize::default(),
            keep_aspect_ratio: ctx.config.keep_aspect_ratio,
            original: None,
            preview: None,
            error: None,
        }));
        let (requests, receiver) = debounce_channel(ctx.config.debounce_window());

        let id = input.id;
        let name = input.name.clone();
        let preview_box = ctx.config.preview_box;
        let worker = Worker {
            input,
            state: state.clone(),
            ctx,
        };
        let worker = tokio::spawn(worker.run(receiver));

        debug!("Controller {} created for '{}'", id, name);

        Self {
            id,
            name,
            preview_box,
            state,
            requests,
            worker,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ResizeStatus {
        self.state.lock().status
    }

    pub fn snapshot(&self) -> ImageSnapshot {
        let state = self.state.lock();
        ImageSnapshot {
            id: self.id,
            name: self.name.clone(),
            status: state.status,
            natural_size: state.natural_size,
            requested_size: state.requested,
            target_size: state.target,
            keep_aspect_ratio: state.keep_aspect_ratio,
            original: state.original.clone(),
            preview: state.preview.clone(),
            display_size: state.preview.as_ref().map(|p| fit_within(p.size, self.preview_box)),
            error: state.error.clone(),
        }
    }

    /// Requests a new width; the height follows when the aspect lock is on.
    pub fn request_width(&self, width: u32) -> ResizerResult<ImageSize> {
        self.request(SizeEdit::Width(width))
    }

    /// Requests a new height; the width follows when the aspect lock is on.
    pub fn request_height(&self, height: u32) -> ResizerResult<ImageSize> {
        self.request(SizeEdit::Height(height))
    }

    /// Requests both dimensions verbatim.
    pub fn request_size(&self, size: ImageSize) -> ResizerResult<ImageSize> {
        self.request(SizeEdit::Exact(size))
    }

    pub fn set_keep_aspect_ratio(&self, keep: bool) -> ResizerResult<()> {
        let mut state = self.state.lock();
        if state.is_removed() {
            return Err(ResizerError::state(format!("Image {} has been removed", self.id)));
        }
        state.keep_aspect_ratio = keep;
        Ok(())
    }

    /// No decode, resize or debounce window is outstanding.
    pub fn is_settled(&self) -> bool {
        // The worker marks itself busy before consuming a request, so check the
        // request slot first.
        if self.requests.is_pending() {
            return false;
        }
        !matches!(
            self.status(),
            ResizeStatus::Pending | ResizeStatus::Decoding | ResizeStatus::Resizing
        )
    }

    /// Whether the image has not finished decoding yet.
    pub fn is_decoding(&self) -> bool {
        matches!(self.status(), ResizeStatus::Pending | ResizeStatus::Decoding)
    }

    /// Tears the controller down. Equivalent to dropping it.
    pub fn teardown(self) {
        drop(self);
    }

    fn request(&self, edit: SizeEdit) -> ResizerResult<ImageSize> {
        let mut state = self.state.lock();
        match state.status {
            ResizeStatus::Ready | ResizeStatus::Resizing => {}
            ResizeStatus::Pending | ResizeStatus::Decoding => {
                return Err(ResizerError::state(format!("Image {} is still decoding", self.id)));
            }
            ResizeStatus::Failed => {
                return Err(ResizerError::state(format!("Image {} could not be decoded", self.id)));
            }
            ResizeStatus::Removed => {
                return Err(ResizerError::state(format!("Image {} has been removed", self.id)));
            }
        }

        let next = apply_edit(state.requested, edit, state.aspect_ratio, state.keep_aspect_ratio);
        state.requested = next;
        self.requests.request(next);

        debug!("Image {} requested {}", self.id, next);
        Ok(next)
    }
}

impl Drop for ImageResizeController {
    fn drop(&mut self) {
        self.state.lock().status = ResizeStatus::Removed;
        self.worker.abort();
        debug!("Controller {} torn down", self.id);
    }
}

struct Worker {
    input: InputImage,
    state: Arc<Mutex<ControllerState>>,
    ctx: ControllerContext,
}

impl Worker {
    async fn run(self, mut requests: DebounceReceiver<ImageSize>) {
        let Some(decoded) = self.decode().await else {
            return;
        };

        while requests.wait().await {
            // Held across the whole resize; released on every exit path, including abort.
            let busy = self.ctx.busy.acquire();
            if !self.transition(ResizeStatus::Resizing) {
                return;
            }
            let Some(target) = requests.take() else {
                self.transition(ResizeStatus::Ready);
                continue;
            };
            self.resize(&decoded, target).await;
            drop(busy);
            if !self.transition(ResizeStatus::Ready) {
                return;
            }
        }
    }

    /// Moves to `status` unless the controller was removed meanwhile.
    fn transition(&self, status: ResizeStatus) -> bool {
        {
            let mut state = self.state.lock();
            if state.is_removed() {
                return false;
            }
            state.status = status;
        }
        self.ctx.changed.notify_waiters();
        true
    }

    async fn decode(&self) -> Option<DecodedImage> {
        let id = self.input.id;
        if !self.transition(ResizeStatus::Decoding) {
            return None;
        }

        let result = codec::decode(self.input.raw.clone()).await;

        let mut state = self.state.lock();
        if state.is_removed() {
            return None;
        }

        // The status only leaves Decoding after the listener has seen the outcome.
        match result {
            Ok(decoded) => {
                let natural = decoded.natural_size();
                let original = ImageArtifact::from_shared(&self.input.name, self.input.raw.clone(), natural);

                state.natural_size = Some(natural);
                state.aspect_ratio = AspectRatio::from_size(natural);
                state.requested = natural;
                state.target = natural;
                state.original = Some(original.clone());
                state.preview = Some(original.clone());
                drop(state);

                debug!("Image {} decoded at {}", id, natural);
                self.ctx.listener.decoded(id, natural, &original);
                self.transition(ResizeStatus::Ready).then_some(decoded)
            }
            Err(e) => {
                state.error = Some(e.clone());
                drop(state);

                warn!("Failed to decode '{}': {}", self.input.name, e);
                self.ctx.listener.decode_failed(id, &e);
                self.transition(ResizeStatus::Failed);
                None
            }
        }
    }

    async fn resize(&self, decoded: &DecodedImage, target: ImageSize) {
        let id = self.input.id;
        self.ctx.listener.resize_started(id, target);

        let result = codec::encode_resized(decoded.clone(), target, self.ctx.config.filter)
            .await
            .map(|encoded| ImageArtifact::new(&self.input.name, encoded, target));

        let mut state = self.state.lock();
        if state.is_removed() {
            debug!("Discarding resize of removed image {}", id);
            return;
        }

        match result {
            Ok(artifact) => {
                state.target = target;
                state.preview = Some(artifact.clone());
                state.error = None;
                drop(state);

                debug!("Image {} resized to {} ({} bytes)", id, target, artifact.byte_size);
                self.ctx.listener.resize_finished(id, target, &artifact);
            }
            Err(e) => {
                state.error = Some(e.clone());
                drop(state);

                warn!("Resize of '{}' to {} failed: {}", self.input.name, target, e);
                self.ctx.listener.resize_failed(id, target, &e);
            }
        }
    }
}
