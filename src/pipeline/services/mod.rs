pub mod export;
pub mod normalizer;
pub mod progress;

pub use export::{EXPORT_FILE_NAME, clipboard_text, export_json, write_export};
pub use normalizer::{Normalized, normalize, to_percent};
pub use progress::{ProgressHandle, ProgressModel, ProgressSimulator};
