//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::io::Cursor;
use std::time::Duration;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::sync::broadcast::{self, error::TryRecvError};

use image_resizer_lib::{BatchCoordinator, BatchEvent, ResizerConfig};

pub const TIMEOUT: Duration = Duration::from_secs(30);

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn coordinator(debounce_ms: u64) -> BatchCoordinator {
    BatchCoordinator::new(ResizerConfig::default().with_debounce_ms(debounce_ms))
}

/// Waits until nothing is decoding, resizing, debouncing or packaging.
pub async fn settle(batch: &BatchCoordinator) {
    tokio::time::timeout(TIMEOUT, batch.settled())
        .await
        .expect("batch did not settle in time");
}

/// Receives events until one matches `predicate`.
pub async fn wait_for(
    events: &mut broadcast::Receiver<BatchEvent>,
    predicate: impl Fn(&BatchEvent) -> bool,
) -> BatchEvent {
    tokio::time::timeout(TIMEOUT, async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) => {}
                Err(e) => panic!("event stream broke: {e}"),
            }
        }
    })
    .await
    .expect("event did not arrive in time")
}

/// Everything currently buffered on the receiver.
pub fn drain(events: &mut broadcast::Receiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut seen = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => seen.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return seen,
            Err(TryRecvError::Lagged(n)) => panic!("lost {n} events"),
        }
    }
}

/// Entry names of a zip, in archive order.
pub fn zip_names(data: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("valid zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("zip entry").name().to_string())
        .collect()
}

/// Pixel dimensions of one zip entry.
pub fn zip_entry_dimensions(data: &[u8], name: &str) -> (u32, u32) {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("valid zip");
    let mut entry = archive.by_name(name).expect("entry present");
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).expect("read entry");
    let img = image::load_from_memory(&bytes).expect("entry decodes");
    (img.width(), img.height())
}
