pub const NO_DESCRIPTION: &str = "No description available";

/// Number of tags rendered; the full list is still counted and exported.
pub const DISPLAYED_TAG_LIMIT: usize = 12;

/// Display and export form of a non-empty analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub description: String,
    pub description_confidence: Option<u8>,
    pub tags: Vec<NormalizedTag>,
    pub objects: Vec<NormalizedObject>,
    pub categories: Vec<NormalizedCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTag {
    pub name: String,
    pub confidence: f64,
    pub confidence_percent: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedObject {
    pub label: String,
    pub confidence: f64,
    pub confidence_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCategory {
    pub name: String,
    pub score_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceBand::High
        } else if confidence >= 0.6 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

// Banding is derived from the raw confidence at render time, never stored.
impl NormalizedTag {
    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}

impl NormalizedObject {
    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}

impl NormalizedResult {
    pub fn displayed_tags(&self) -> &[NormalizedTag] {
        &self.tags[..self.tags.len().min(DISPLAYED_TAG_LIMIT)]
    }
}
