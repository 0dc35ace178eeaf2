//! File intake for the upload area: picker dialog and drag-and-drop.

use crate::error::{AppError, Result};
use crate::image_processing::ImageProcessor;
use crate::model::ImageFile;
use eframe::egui;
use std::path::PathBuf;

/// Extensions offered by the picker's image filter.
pub const PICKER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Shows the native picker.
///
/// Returns `None` if the dialog was dismissed.
pub(crate) async fn pick_image_path() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Choose a photo to roast")
        .add_filter("Images", PICKER_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// The content type a drop declares.
///
/// Web backends fill `mime`; native ones leave it empty, in which case the
/// extension decides.
pub fn declared_content_type(mime: &str, name: &str, path: Option<&PathBuf>) -> String {
    if !mime.trim().is_empty() {
        return mime.trim().to_string();
    }

    match path {
        Some(path) => ImageProcessor::content_type_for(path),
        None => ImageProcessor::content_type_for(name),
    }
}

/// Turns an egui drop into an [`ImageFile`], reading from disk if needed.
pub(crate) async fn image_file_from_drop(dropped: egui::DroppedFile) -> Result<ImageFile> {
    let content_type =
        declared_content_type(&dropped.mime, &dropped.name, dropped.path.as_ref());

    let name = if dropped.name.is_empty() {
        dropped
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    } else {
        dropped.name.clone()
    };

    let bytes = match (dropped.bytes, dropped.path.as_ref()) {
        (Some(bytes), _) => bytes,
        (None, Some(path)) => tokio::fs::read(path).await?.into(),
        (None, None) => {
            return Err(AppError::invalid_input("Dropped item has no readable content"));
        }
    };

    Ok(ImageFile::new(name, content_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn explicit_mime_wins_over_extension() {
        assert_eq!(declared_content_type("image/heic", "photo.txt", None), "image/heic");
    }

    #[test]
    fn empty_mime_falls_back_to_path_then_name() {
        let path = PathBuf::from("/tmp/me.png");
        assert_eq!(declared_content_type("", "ignored.txt", Some(&path)), "image/png");
        assert_eq!(declared_content_type("", "selfie.jpeg", None), "image/jpeg");
        assert_eq!(declared_content_type(" ", "notes.md", None), "application/octet-stream");
    }

    #[tokio::test]
    async fn in_memory_drop_keeps_bytes() {
        let dropped = egui::DroppedFile {
            name: "cat.png".to_string(),
            bytes: Some(Arc::from(vec![1u8, 2, 3])),
            ..Default::default()
        };
        let file = image_file_from_drop(dropped).await.unwrap();
        assert_eq!(file.name(), "cat.png");
        assert_eq!(file.content_type(), "image/png");
        assert_eq!(file.bytes(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_drop_is_rejected() {
        let dropped = egui::DroppedFile::default();
        assert!(matches!(
            image_file_from_drop(dropped).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
