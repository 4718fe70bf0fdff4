pub mod app;
pub mod config;
pub mod error;
pub mod intake;
pub mod network;
pub mod pipeline;

pub use app::{AnalyzerApp, SessionController, SessionState};
pub use config::Settings;
pub use error::{AnalysisError, AppError, ExportError, SessionError, ValidationError};
pub use intake::{ImageSource, SelectedImage};
pub use network::AnalysisClient;
pub use pipeline::{NormalizedResult, normalize};
