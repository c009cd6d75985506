//! Photo evidence validation
//!
//! The backend accepts JPEG, PNG and WebP only. The type is sniffed from
//! the file contents rather than trusted from the file name.

use image::ImageFormat;
use std::path::Path;

use crate::api::PhotoUpload;
use crate::error::{EcomdeskError, Result};

/// MIME type of an accepted image, or `None` for anything else
pub fn accepted_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

impl PhotoUpload {
    /// Validate `bytes` and wrap them for upload
    ///
    /// # Errors
    ///
    /// Returns [`EcomdeskError::InvalidPhoto`] when the bytes are not a
    /// JPEG, PNG or WebP image.
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Result<Self> {
        let mime_type = accepted_mime_type(&bytes).ok_or_else(|| {
            EcomdeskError::InvalidPhoto(format!("{} is not a JPG, PNG, or WebP image", file_name))
        })?;
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("upload")
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}
