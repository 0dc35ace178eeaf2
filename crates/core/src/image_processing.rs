//! Image handling for the upload form.
//!
//! Turns a selected [`ImageFile`] into its [`Preview`]: a data URI over the
//! exact bytes that will be uploaded, plus a small decoded bitmap that the
//! UI can upload as a texture.

use crate::error::{AppError, Result};
use crate::model::{ImageFile, Preview, PreviewBitmap};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::ImageFormat;
use std::path::Path;

/// Longest edge of the decoded preview bitmap, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 512;

/// Declared type for files whose extension is not a known image format.
pub const OPAQUE_CONTENT_TYPE: &str = "application/octet-stream";

/// Image processing utilities for the submission workflow.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Declares a content type from a path or file name, like a browser does
    /// for `File.type`.
    pub fn content_type_for(path: impl AsRef<Path>) -> String {
        ImageFormat::from_path(path.as_ref())
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| OPAQUE_CONTENT_TYPE.to_string())
    }

    /// Encodes bytes as a `data:` URI.
    pub fn data_uri(bytes: &[u8], content_type: &str) -> String {
        format!("data:{};base64,{}", content_type, BASE64.encode(bytes))
    }

    /// Decodes and downscales an image for display.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageProcessing`] if the bytes are not a decodable image.
    pub fn decode_preview(bytes: &[u8]) -> Result<PreviewBitmap> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AppError::image(format!("Failed to decode image: {}", e)))?;

        let scaled = if decoded.width() > PREVIEW_MAX_EDGE || decoded.height() > PREVIEW_MAX_EDGE {
            decoded.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE)
        } else {
            decoded
        };

        let rgba = scaled.to_rgba8();
        Ok(PreviewBitmap {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    /// Derives the full preview of a file.
    ///
    /// Undecodable bytes still get a data URI; only the bitmap is dropped.
    pub fn derive_preview(file: &ImageFile) -> Preview {
        let bitmap = match Self::decode_preview(file.bytes()) {
            Ok(bitmap) => Some(bitmap),
            Err(e) => {
                tracing::debug!(name = file.name(), error = %e, "preview bitmap unavailable");
                None
            }
        };

        Preview {
            data_uri: Self::data_uri(file.bytes(), file.content_type()),
            bitmap,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encodes a solid-colour PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn content_type_comes_from_extension() {
        assert_eq!(ImageProcessor::content_type_for("me.JPG"), "image/jpeg");
        assert_eq!(ImageProcessor::content_type_for("shot.webp"), "image/webp");
        assert_eq!(ImageProcessor::content_type_for("notes.txt"), OPAQUE_CONTENT_TYPE);
        assert_eq!(ImageProcessor::content_type_for("no_extension"), OPAQUE_CONTENT_TYPE);
    }

    #[test]
    fn data_uri_wraps_base64() {
        assert_eq!(ImageProcessor::data_uri(b"abc", "image/png"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn large_images_are_downscaled() {
        let bitmap = ImageProcessor::decode_preview(&png_bytes(1024, 256)).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (512, 128));
        assert_eq!(bitmap.rgba.len(), 512 * 128 * 4);
    }

    #[test]
    fn undecodable_bytes_keep_data_uri() {
        let file = ImageFile::new("broken.png", "image/png", b"not really a png".to_vec());
        let preview = ImageProcessor::derive_preview(&file);
        assert!(preview.bitmap.is_none());
        assert!(preview.data_uri.starts_with("data:image/png;base64,"));
    }
}
