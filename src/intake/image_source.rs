use std::path::Path;
use std::sync::OnceLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::ImageFormat;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::DEFAULT_MAX_IMAGE_BYTES;
use crate::error::ValidationError;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A user supplied image, buffered in memory. Replaced wholesale on every new
/// selection; never mutated.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    id: Uuid,
    bytes: Bytes,
    mime_hint: String,
    name: Option<String>,
    preview_data_url: OnceLock<String>,
}

impl SelectedImage {
    fn new(bytes: Vec<u8>, mime_hint: String, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: Bytes::from(bytes),
            mime_hint,
            name,
            preview_data_url: OnceLock::new(),
        }
    }

    /// Identity of this selection; two selections of the same file differ.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Handle to the same buffer, without copying the payload.
    pub fn shared_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn mime_hint(&self) -> &str {
        &self.mime_hint
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn size_megabytes(&self) -> f64 {
        self.size_bytes() as f64 / (1024.0 * 1024.0)
    }

    /// `data:` URL of the payload, encoded on first use.
    pub fn preview_data_url(&self) -> &str {
        self.preview_data_url
            .get_or_init(|| format!("data:{};base64,{}", self.mime_hint, STANDARD.encode(&self.bytes)))
    }
}

/// A file handed over by a picker.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// One entry of a clipboard paste. `bytes` is absent when the entry cannot be
/// materialized as a file.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub mime_type: String,
    pub bytes: Option<Vec<u8>>,
}

impl ClipboardItem {
    pub fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }
}

#[derive(Debug, Clone)]
pub struct ImageSource {
    max_image_bytes: u64,
}

impl ImageSource {
    pub fn new(max_image_bytes: u64) -> Self {
        Self { max_image_bytes }
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }

    fn check_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_image_bytes {
            warn!(
                "Rejecting image of {} bytes (limit {})",
                size, self.max_image_bytes
            );
            return Err(ValidationError::SizeExceeded {
                size,
                limit: self.max_image_bytes,
            });
        }
        Ok(())
    }

    pub fn select_from_file(&self, file: FileInput) -> Result<SelectedImage, ValidationError> {
        self.check_size(file.bytes.len() as u64)?;
        let mime_hint = file
            .mime_type
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| mime_from_name(&file.name));
        debug!(
            "Selected file {} ({} bytes, {})",
            file.name,
            file.bytes.len(),
            mime_hint
        );
        Ok(SelectedImage::new(file.bytes, mime_hint, Some(file.name)))
    }

    /// Reads a file from disk. The size is checked from metadata before any
    /// bytes are read.
    pub fn select_from_path(&self, path: &Path) -> Result<SelectedImage, ValidationError> {
        let metadata = std::fs::metadata(path)?;
        self.check_size(metadata.len())?;
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.select_from_file(FileInput {
            name,
            mime_type: None,
            bytes,
        })
    }

    /// Uses the first image entry; later images are ignored.
    pub fn select_from_clipboard(
        &self,
        items: Vec<ClipboardItem>,
    ) -> Result<SelectedImage, ValidationError> {
        for item in items {
            if !item.is_image() {
                continue;
            }
            let Some(bytes) = item.bytes else {
                continue;
            };
            self.check_size(bytes.len() as u64)?;
            debug!("Pasted image ({} bytes, {})", bytes.len(), item.mime_type);
            return Ok(SelectedImage::new(bytes, item.mime_type, None));
        }
        Err(ValidationError::NoImageInClipboard)
    }
}

impl Default for ImageSource {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}

fn mime_from_name(name: &str) -> String {
    ImageFormat::from_path(name)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME.to_string())
}
