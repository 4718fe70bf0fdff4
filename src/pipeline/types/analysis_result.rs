use serde::{Deserialize, Deserializer, Serialize};

/// Analysis payload as returned by the remote service. Every top-level field
/// may be missing, `null` or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub object: String,
    pub confidence: f64,
    // Bounding box geometry, passed through untouched.
    #[serde(default)]
    pub rectangle: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub score: f64,
}

impl AnalysisResult {
    pub fn captions(&self) -> &[Caption] {
        self.description
            .as_ref()
            .map(|d| d.captions.as_slice())
            .unwrap_or(&[])
    }

    /// Only the first caption is ever used.
    pub fn best_caption(&self) -> Option<&Caption> {
        self.captions().first()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_empty() {
        let result: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert!(result.tags.is_empty());
        assert!(result.objects.is_empty());
        assert!(result.categories.is_empty());
        assert!(result.best_caption().is_none());
    }

    #[test]
    fn test_null_fields_are_empty() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"tags":null,"objects":null,"description":{"captions":null},"categories":null}"#,
        )
        .unwrap();
        assert!(result.tags.is_empty());
        assert!(result.captions().is_empty());
    }

    #[test]
    fn test_full_payload() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{
                "tags": [{"name": "cat", "confidence": 0.93}],
                "objects": [{"object": "cat", "confidence": 0.71, "rectangle": {"x": 1, "y": 2, "w": 3, "h": 4}}],
                "description": {"captions": [{"text": "a cat", "confidence": 0.9}, {"text": "an animal", "confidence": 0.4}]},
                "categories": [{"name": "animal_cat", "score": 0.8}],
                "requestId": "ignored"
            }"#,
        )
        .unwrap();
        assert_eq!(result.tags[0].name, "cat");
        assert_eq!(result.objects[0].rectangle.as_ref().unwrap()["w"], 3);
        assert_eq!(result.best_caption().unwrap().text, "a cat");
        assert_eq!(result.categories[0].score, 0.8);
    }

    #[test]
    fn test_entry_missing_confidence_is_rejected() {
        let result = serde_json::from_str::<AnalysisResult>(r#"{"tags":[{"name":"cat"}]}"#);
        assert!(result.is_err());
    }
}
