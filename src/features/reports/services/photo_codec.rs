use axum::extract::multipart::{Field, MultipartError};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Photo, MAX_PHOTO_SIZE};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An uploaded file part, as handed over by the multipart reader.
///
/// Contents are only kept while the upload stays within [`MAX_PHOTO_SIZE`];
/// past that point the reader keeps counting bytes but drops them.
#[derive(Debug)]
pub struct UploadedFile {
    pub size: usize,
    pub mime_type: String,
    contents: Vec<u8>,
}

impl UploadedFile {
    #[cfg(test)]
    pub fn new(mime_type: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            size: contents.len(),
            mime_type: mime_type.into(),
            contents,
        }
    }

    /// Drain a multipart field without buffering more than the size ceiling.
    pub async fn read_field(mut field: Field<'_>) -> std::result::Result<Self, MultipartError> {
        let mime_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut size = 0usize;
        let mut contents = Vec::new();

        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            if size <= MAX_PHOTO_SIZE {
                contents.extend_from_slice(&chunk);
            } else if !contents.is_empty() {
                contents = Vec::new();
            }
        }

        if size > MAX_PHOTO_SIZE {
            debug!("Photo upload of {} bytes exceeds the size ceiling", size);
        }

        Ok(Self {
            size,
            mime_type,
            contents,
        })
    }
}

/// Embed an uploaded photo into a report.
///
/// The size ceiling is checked against the declared size before any bytes are
/// moved into the report, so an oversized upload leaves `target` untouched.
pub fn apply_photo(upload: UploadedFile, target: &mut Option<Photo>) -> Result<()> {
    if upload.size > MAX_PHOTO_SIZE {
        return Err(AppError::PayloadTooLarge(
            "Image should be less than 1mb in size".to_string(),
        ));
    }

    *target = Some(Photo {
        data: upload.contents,
        content_type: upload.mime_type,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_within_ceiling_is_embedded() {
        let mut target = None;
        apply_photo(UploadedFile::new("image/png", vec![7; 10]), &mut target).unwrap();

        let photo = target.unwrap();
        assert_eq!(photo.content_type, "image/png");
        assert_eq!(photo.data, vec![7; 10]);
    }

    #[test]
    fn test_exact_ceiling_is_accepted() {
        let mut target = None;
        apply_photo(
            UploadedFile::new("image/jpeg", vec![0; MAX_PHOTO_SIZE]),
            &mut target,
        )
        .unwrap();
        assert_eq!(target.unwrap().len(), MAX_PHOTO_SIZE);
    }

    #[test]
    fn test_oversized_photo_leaves_target_untouched() {
        let existing = Photo {
            data: vec![1, 2, 3],
            content_type: "image/gif".to_string(),
        };
        let mut target = Some(existing.clone());

        let result = apply_photo(
            UploadedFile::new("image/png", vec![0; MAX_PHOTO_SIZE + 1]),
            &mut target,
        );

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert_eq!(target, Some(existing));
    }

    #[test]
    fn test_declared_size_wins_over_buffered_contents() {
        // what the reader hands over once it stopped buffering
        let upload = UploadedFile {
            size: MAX_PHOTO_SIZE + 512,
            mime_type: "image/png".to_string(),
            contents: Vec::new(),
        };
        let mut target = None;
        assert!(apply_photo(upload, &mut target).is_err());
        assert!(target.is_none());
    }
}
