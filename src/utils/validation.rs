use crate::core::ImageSize;
use crate::utils::{ResizerError, ResizerResult};

/// Largest width or height any supported encoder can write (JPEG stores 16-bit dimensions).
pub const MAX_DIMENSION: u32 = 65_535;

/// Largest target area, keeping one RGBA render buffer around 200 MB.
pub const MAX_PIXELS: u64 = 50_000_000;

/// Validates that a target size can actually be rendered.
///
/// Zero-area surfaces are rejected rather than encoded into a degenerate image,
/// and oversized ones before their pixel buffer is allocated.
pub fn validate_target_size(size: ImageSize) -> ResizerResult<()> {
    let area = size.width as u64 * size.height as u64;
    if area == 0 || size.width > MAX_DIMENSION || size.height > MAX_DIMENSION || area > MAX_PIXELS {
        return Err(ResizerError::invalid_size(size.width, size.height));
    }
    Ok(())
}

/// Validates a file name used for an archive entry or a saved artifact.
pub fn validate_file_name(name: &str) -> ResizerResult<()> {
    if name.is_empty() {
        return Err(ResizerError::state("File name cannot be empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ResizerError::state(format!("Invalid file name: {name}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10)]
    #[case(10, 0)]
    #[case(0, 0)]
    fn zero_dimensions_are_invalid(#[case] width: u32, #[case] height: u32) {
        let err = validate_target_size(ImageSize::new(width, height)).unwrap_err();
        assert_eq!(err, ResizerError::invalid_size(width, height));
    }

    #[rstest]
    #[case(65_536, 10)]
    #[case(10, 65_536)]
    #[case(200_000, 150_000)]
    #[case(10_000, 5_001)]
    #[case(u32::MAX, u32::MAX)]
    fn oversized_targets_are_invalid(#[case] width: u32, #[case] height: u32) {
        let err = validate_target_size(ImageSize::new(width, height)).unwrap_err();
        assert_eq!(err, ResizerError::invalid_size(width, height));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(65_535, 1)]
    #[case(1, 65_535)]
    #[case(10_000, 5_000)]
    fn sizes_within_limits_are_valid(#[case] width: u32, #[case] height: u32) {
        assert!(validate_target_size(ImageSize::new(width, height)).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("../escape.png")]
    #[case("nested/photo.jpg")]
    #[case("..")]
    fn rejects_unsafe_names(#[case] name: &str) {
        assert!(validate_file_name(name).is_err());
    }

    #[test]
    fn accepts_plain_names() {
        assert!(validate_file_name("holiday photo (1).JPG").is_ok());
    }
}
