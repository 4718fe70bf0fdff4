pub mod services;
pub mod types;

pub use services::{Normalized, ProgressHandle, ProgressSimulator, normalize};
pub use types::{AnalysisResult, ConfidenceBand, NormalizedResult};
