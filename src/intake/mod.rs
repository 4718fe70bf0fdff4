pub mod clipboard;
pub mod image_source;

pub use clipboard::{SystemClipboard, TextClipboard};
pub use image_source::{ClipboardItem, FileInput, ImageSource, SelectedImage};
