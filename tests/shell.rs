//! Shell commands against a live batch, reading and writing real files.

mod common;

use common::*;
use image_resizer_lib::commands::{Command, execute};
use image_resizer_lib::{ImageId, ResizerError};

async fn run(batch: &image_resizer_lib::BatchCoordinator, line: &str) -> Result<String, ResizerError> {
    let command = Command::parse(line)?.expect("non-empty command");
    execute(batch, command).await
}

#[tokio::test(flavor = "multi_thread")]
async fn add_resize_save_and_zip() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let photo = input.path().join("photo.png");
    std::fs::write(&photo, png(120, 80)).unwrap();

    let batch = coordinator(20);
    let added = run(&batch, &format!("add {}", photo.display())).await.unwrap();
    assert!(added.contains("photo.png"), "{added}");
    settle(&batch).await;

    let id = batch.selection()[0];
    let resized = run(&batch, &format!("width {} 60", id)).await.unwrap();
    assert!(resized.contains("60x40"), "{resized}");
    settle(&batch).await;

    let listing = run(&batch, "list").await.unwrap();
    assert!(listing.contains("120x80 -> 60x40"), "{listing}");
    assert!(listing.contains("Archive: 1 file(s)"), "{listing}");

    run(&batch, &format!("save {} {}", id, output.path().display())).await.unwrap();
    let saved = image::open(output.path().join("photo.png")).unwrap();
    assert_eq!((saved.width(), saved.height()), (60, 40));

    run(&batch, &format!("zip {}", output.path().display())).await.unwrap();
    let zipped = std::fs::read(output.path().join("images.zip")).unwrap();
    assert_eq!(zip_names(&zipped), vec!["photo.png"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_files_are_reported_not_added() {
    let dir = tempfile::tempdir().unwrap();
    let batch = coordinator(20);

    let err = run(&batch, &format!("add {}", dir.path().join("nope.png").display()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResizerError::IO(_)));
    assert!(batch.selection().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn zip_refuses_an_empty_batch() {
    let dir = tempfile::tempdir().unwrap();
    let batch = coordinator(20);

    let err = run(&batch, &format!("zip {}", dir.path().display())).await.unwrap_err();
    assert!(matches!(err, ResizerError::State(_)));
    assert!(!dir.path().join("images.zip").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn remove_and_clear_update_the_listing() {
    let batch = coordinator(20);
    let ids = batch.add_images([("a.png", png(4, 4)), ("b.png", png(4, 4))]);
    settle(&batch).await;

    run(&batch, &format!("remove {}", ids[0])).await.unwrap();
    let listing = run(&batch, "list").await.unwrap();
    assert!(!listing.contains("a.png"), "{listing}");
    assert!(listing.contains("b.png"), "{listing}");

    run(&batch, "clear").await.unwrap();
    let listing = run(&batch, "list").await.unwrap();
    assert!(listing.contains("No images selected"), "{listing}");

    let err = run(&batch, &format!("remove {}", ImageId::new(99))).await.unwrap_err();
    assert!(matches!(err, ResizerError::State(_)));
}
