use image::{DynamicImage, ImageFormat};
use crate::utils::{ResizerError, ResizerResult};

/// Detects the encoded format of `raw` from its magic bytes.
///
/// File names are never trusted; a `.png` that is really a JPEG is a JPEG.
pub fn detect_format(raw: &[u8]) -> ResizerResult<ImageFormat> {
    let format = image::guess_format(raw)
        .map_err(|e| ResizerError::decode(format!("Unrecognised image data: {e}")))?;

    if !format.reading_enabled() {
        return Err(ResizerError::decode(format!(
            "No decoder available for {}", format_name(format)
        )));
    }

    Ok(format)
}

/// Checks that resized output can be written back in `format`.
pub fn ensure_encodable(format: ImageFormat) -> ResizerResult<()> {
    if format.writing_enabled() {
        Ok(())
    } else {
        Err(ResizerError::format(format!(
            "No encoder available for {}", format_name(format)
        )))
    }
}

/// Narrows the colour type where the target encoder requires it.
///
/// JPEG has no alpha channel and only 8-bit samples.
pub fn prepare_for_encoding(image: DynamicImage, format: ImageFormat) -> DynamicImage {
    match format {
        ImageFormat::Jpeg => match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image,
            DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
                DynamicImage::ImageLuma8(image.to_luma8())
            }
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        _ => image,
    }
}

/// Human readable name for logs and error messages.
pub fn format_name(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbaImage, Rgba};
    use std::io::Cursor;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255])));
        let img = prepare_for_encoding(img, format);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn detects_from_content() {
        assert_eq!(detect_format(&encoded(ImageFormat::Png)).unwrap(), ImageFormat::Png);
        assert_eq!(detect_format(&encoded(ImageFormat::Jpeg)).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn rejects_garbage() {
        let err = detect_format(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ResizerError::Decode(_)));
    }

    #[test]
    fn jpeg_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let prepared = prepare_for_encoding(img, ImageFormat::Jpeg);
        assert!(matches!(prepared, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn png_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let prepared = prepare_for_encoding(img, ImageFormat::Png);
        assert!(matches!(prepared, DynamicImage::ImageRgba8(_)));
    }
}
