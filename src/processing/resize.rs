//! Size-edit logic mapping user edits to target sizes.

use crate::core::{AspectRatio, ImageSize};

/// A single user edit of the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeEdit {
    Width(u32),
    Height(u32),
    /// Both dimensions verbatim; the aspect lock does not apply
    Exact(ImageSize),
}

/// Applies `edit` to the currently requested size.
///
/// With the aspect lock on, the other dimension is recomputed from the natural
/// ratio; with it off, the other dimension is left as it is.
pub fn apply_edit(current: ImageSize, edit: SizeEdit, ratio: Option<AspectRatio>, keep_aspect: bool) -> ImageSize {
    let ratio = ratio.filter(|_| keep_aspect);

    match (edit, ratio) {
        (SizeEdit::Width(width), Some(ratio)) => ImageSize::new(width, ratio.height_for(width)),
        (SizeEdit::Width(width), None) => ImageSize::new(width, current.height),
        (SizeEdit::Height(height), Some(ratio)) => ImageSize::new(ratio.width_for(height), height),
        (SizeEdit::Height(height), None) => ImageSize::new(current.width, height),
        (SizeEdit::Exact(size), _) => size,
    }
}

/// Fits `size` inside a square preview box, keeping its proportions.
/// Never enlarges an image that already fits.
pub fn fit_within(size: ImageSize, box_size: u32) -> ImageSize {
    if size.is_empty() || (size.width <= box_size && size.height <= box_size) {
        return size;
    }

    let scale = f64::min(
        box_size as f64 / size.width as f64,
        box_size as f64 / size.height as f64,
    );

    ImageSize::new(
        ((size.width as f64 * scale).round() as u32).max(1),
        ((size.height as f64 * scale).round() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ratio_800x600() -> Option<AspectRatio> {
        AspectRatio::from_size(ImageSize::new(800, 600))
    }

    #[rstest]
    #[case(SizeEdit::Width(400), true, ImageSize::new(400, 300))]
    #[case(SizeEdit::Height(300), true, ImageSize::new(400, 300))]
    #[case(SizeEdit::Width(400), false, ImageSize::new(400, 600))]
    #[case(SizeEdit::Height(150), false, ImageSize::new(800, 150))]
    #[case(SizeEdit::Exact(ImageSize::new(10, 10)), true, ImageSize::new(10, 10))]
    #[case(SizeEdit::Width(0), true, ImageSize::new(0, 0))]
    fn edits_follow_the_lock(#[case] edit: SizeEdit, #[case] keep: bool, #[case] expected: ImageSize) {
        let current = ImageSize::new(800, 600);
        assert_eq!(apply_edit(current, edit, ratio_800x600(), keep), expected);
    }

    #[test]
    fn lock_without_ratio_behaves_unlocked() {
        let current = ImageSize::new(5, 7);
        assert_eq!(apply_edit(current, SizeEdit::Width(9), None, true), ImageSize::new(9, 7));
    }

    #[rstest]
    #[case(ImageSize::new(800, 600), 256, ImageSize::new(256, 192))]
    #[case(ImageSize::new(600, 800), 256, ImageSize::new(192, 256))]
    #[case(ImageSize::new(100, 50), 256, ImageSize::new(100, 50))]
    #[case(ImageSize::new(10_000, 1), 256, ImageSize::new(256, 1))]
    fn previews_fit_the_box(#[case] size: ImageSize, #[case] box_size: u32, #[case] expected: ImageSize) {
        assert_eq!(fit_within(size, box_size), expected);
    }
}
