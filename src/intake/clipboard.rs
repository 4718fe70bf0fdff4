use std::io::Cursor;

use arboard::Clipboard;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::intake::image_source::ClipboardItem;

/// Destination for copied text.
pub trait TextClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ExportError>;
}

/// The operating system clipboard.
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                warn!("System clipboard unavailable: {}", e);
                None
            }
        };
        Self { inner }
    }

    /// Snapshot of the clipboard as typed entries. Raw pixel images are
    /// re-encoded as PNG.
    pub fn read_items(&mut self) -> Vec<ClipboardItem> {
        let Some(clipboard) = self.inner.as_mut() else {
            return Vec::new();
        };
        let mut items = Vec::new();

        match clipboard.get_image() {
            Ok(image) => {
                let bytes = encode_png(image.width, image.height, image.bytes.into_owned());
                items.push(ClipboardItem {
                    mime_type: "image/png".to_string(),
                    bytes,
                });
            }
            Err(e) => debug!("No image on clipboard: {}", e),
        }

        if let Ok(text) = clipboard.get_text() {
            items.push(ClipboardItem {
                mime_type: "text/plain".to_string(),
                bytes: Some(text.into_bytes()),
            });
        }

        items
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TextClipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ExportError> {
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| ExportError::Clipboard("clipboard unavailable".to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ExportError::Clipboard(e.to_string()))
    }
}

fn encode_png(width: usize, height: usize, rgba: Vec<u8>) -> Option<Vec<u8>> {
    let image = RgbaImage::from_raw(width as u32, height as u32, rgba)?;
    let mut buffer = Vec::new();
    match DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png) {
        Ok(()) => Some(buffer),
        Err(e) => {
            warn!("Failed to encode clipboard image: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let bytes = encode_png(2, 3, vec![255; 2 * 3 * 4]).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), 2);
        assert_eq!(decoded.height(), 3);
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        assert!(encode_png(4, 4, vec![0; 3]).is_none());
    }
}
