//! Uploaded film images: format sniffing and storage naming.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use uuid::Uuid;

use crate::error::CoreError;

/// Directory (relative to the media root) that film images are stored in.
pub const FILM_IMAGE_DIR: &str = "film-images";

/// A file received from a multipart form, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Format and dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Sniff the format from the content (never the filename) and read the
/// dimensions without decoding pixel data.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageInfo, CoreError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable upload: {e}")))?;

    let extension = match reader.format() {
        Some(ImageFormat::Png) => "png",
        Some(ImageFormat::Jpeg) => "jpg",
        Some(ImageFormat::WebP) => "webp",
        _ => {
            return Err(CoreError::Validation(
                "Upload a valid image. Supported formats: PNG, JPEG, WebP".into(),
            ))
        }
    };

    let (width, height) = reader.into_dimensions().map_err(|_| {
        CoreError::Validation(
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image".into(),
        )
    })?;

    Ok(ImageInfo {
        extension,
        width,
        height,
    })
}

/// Relative storage path for a new upload: `film-images/<uuid>.<ext>`.
///
/// Every upload gets its own file, even when the bytes repeat, so a file
/// belongs to exactly one film.
pub fn stored_image_path(info: &ImageInfo) -> String {
    format!("{FILM_IMAGE_DIR}/{}.{}", Uuid::new_v4().simple(), info.extension)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use image::{DynamicImage, RgbImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encoding a PNG should succeed");
        buf
    }

    #[test]
    fn reads_png_dimensions() {
        let info = inspect_image(&png(3, 2)).expect("valid png");
        assert_eq!(
            info,
            ImageInfo {
                extension: "png",
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn rejects_non_images() {
        assert_matches!(
            inspect_image(b"definitely not an image"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(inspect_image(b""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_truncated_png() {
        let bytes = png(4, 4);
        assert_matches!(inspect_image(&bytes[..12]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn every_upload_gets_its_own_path() {
        let info = inspect_image(&png(1, 1)).unwrap();
        let path = stored_image_path(&info);
        assert!(path.starts_with("film-images/"));
        assert!(path.ends_with(".png"));
        assert_ne!(path, stored_image_path(&info));
    }
}
