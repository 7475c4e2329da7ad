use std::path::Path;

use crate::foundation::error::{CanvasError, CanvasResult};

/// Extensions accepted by [`UploadKind::from_file_name`].
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["gif", "jpeg", "jpg", "png", "webp"];

/// How an uploaded file enters the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    /// Becomes the animated-image layer.
    Gif,
    /// Becomes the base image.
    Image,
}

impl UploadKind {
    /// Classify by extension (case-insensitive). Anything else, `svg` included, is rejected.
    pub fn from_file_name(name: &str) -> CanvasResult<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "gif" => Ok(Self::Gif),
            "jpeg" | "jpg" | "png" | "webp" => Ok(Self::Image),
            _ => Err(CanvasError::unsupported_extension(ext)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/upload.rs"]
mod tests;
