mod analysis_result;
mod normalized_result;

pub use analysis_result::{AnalysisResult, Caption, Category, Description, DetectedObject, Tag};
pub use normalized_result::{
    ConfidenceBand, DISPLAYED_TAG_LIMIT, NO_DESCRIPTION, NormalizedCategory, NormalizedObject,
    NormalizedResult, NormalizedTag,
};
