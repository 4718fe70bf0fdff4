use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Export Error: {0}")]
    Export(#[from] ExportError),
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
    #[error("UI Error: {0}")]
    Ui(String),
}

// Raised while acquiring an image, before it reaches the session.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Image is {size} bytes, the limit is {limit} bytes")]
    SizeExceeded { size: u64, limit: u64 },
    #[error("No image found in clipboard")]
    NoImageInClipboard,
    #[error("Failed to read image: {0}")]
    Unreadable(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis endpoint returned HTTP {status}")]
    Http { status: u16 },
    #[error("Analysis response could not be parsed: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("Analysis request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write to clipboard: {0}")]
    Clipboard(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No image selected")]
    NoImageSelected,
    #[error("An analysis is already in flight")]
    AlreadyAnalyzing,
    #[error("No analysis result available")]
    NoResult,
}
