//! Codec adapter between raw image bytes, decoded rasters and re-encoded bytes.
//!
//! Decoding and resizing are CPU bound, so the async entry points run each call
//! inside `tokio::task::spawn_blocking`. Calls share no state and may run
//! concurrently for different images.

use std::io::Cursor;
use std::sync::Arc;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::core::{ImageSize, ResizeFilter};
use crate::utils::{
    ResizerError, ResizerResult, detect_format, ensure_encodable, format_name, prepare_for_encoding,
    validate_target_size,
};

/// A decoded raster together with the format it was encoded in.
///
/// The raster is shared so that every resize of one image renders from the
/// same fixed source without copying it.
#[derive(Clone)]
pub struct DecodedImage {
    raster: Arc<DynamicImage>,
    format: ImageFormat,
    natural_size: ImageSize,
}

impl DecodedImage {
    pub fn natural_size(&self) -> ImageSize {
        self.natural_size
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("format", &self.format)
            .field("natural_size", &self.natural_size)
            .finish()
    }
}

/// Decodes `raw` on the blocking pool.
pub async fn decode(raw: Arc<[u8]>) -> ResizerResult<DecodedImage> {
    tokio::task::spawn_blocking(move || decode_blocking(&raw)).await?
}

/// Renders `decoded` at exactly `target` pixels and re-encodes it, on the blocking pool.
pub async fn encode_resized(
    decoded: DecodedImage,
    target: ImageSize,
    filter: ResizeFilter,
) -> ResizerResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode_resized_blocking(&decoded, target, filter)).await?
}

/// Exact byte length of an encoded blob.
pub fn measure_encoded_size(encoded: &[u8]) -> u64 {
    encoded.len() as u64
}

/// Decodes `raw` synchronously.
///
/// Fails with a decode error for unknown, truncated or corrupt data, and for
/// formats that can be read but never written back.
pub fn decode_blocking(raw: &[u8]) -> ResizerResult<DecodedImage> {
    let format = detect_format(raw)?;
    ensure_encodable(format).map_err(|e| match e {
        ResizerError::Format(msg) => ResizerError::Decode(msg),
        other => other,
    })?;

    let raster = image::load_from_memory_with_format(raw, format)
        .map_err(|e| ResizerError::decode(format!("Failed to decode {} data: {e}", format_name(format))))?;
    let natural_size = ImageSize::new(raster.width(), raster.height());

    debug!("Decoded {} image: {}", format_name(format), natural_size);

    Ok(DecodedImage {
        raster: Arc::new(raster),
        format,
        natural_size,
    })
}

/// Resizes and re-encodes synchronously, preserving the source format.
///
/// Zero-area and oversized targets are rejected with an invalid size error.
pub fn encode_resized_blocking(
    decoded: &DecodedImage,
    target: ImageSize,
    filter: ResizeFilter,
) -> ResizerResult<Vec<u8>> {
    validate_target_size(target)?;

    let resized = if target == decoded.natural_size {
        (*decoded.raster).clone()
    } else {
        decoded.raster.resize_exact(target.width, target.height, filter.into())
    };

    let resized = prepare_for_encoding(resized, decoded.format);
    let mut encoded = Vec::new();
    resized.write_to(&mut Cursor::new(&mut encoded), decoded.format)?;

    debug!(
        "Encoded {} -> {} as {} ({} bytes)",
        decoded.natural_size,
        target,
        format_name(decoded.format),
        encoded.len()
    );

    Ok(encoded)
}
