use crate::pipeline::types::{
    AnalysisResult, NO_DESCRIPTION, NormalizedCategory, NormalizedObject, NormalizedResult,
    NormalizedTag,
};

/// Outcome of normalizing a raw payload. `Empty` is a distinct outcome, not a
/// zero-length result.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Result(NormalizedResult),
    Empty,
}

// Scaling precision used to strip binary noise before rounding (0.845 * 100
// evaluates to 84.49999999999999).
const NOISE_SCALE: f64 = 1e9;

/// Converts a probability in `[0,1]` to an integer percentage, rounding half up.
pub fn to_percent(probability: f64) -> u8 {
    if !probability.is_finite() {
        return 0;
    }
    let scaled = (probability * 100.0 * NOISE_SCALE).round() / NOISE_SCALE;
    (scaled + 0.5).floor().clamp(0.0, 100.0) as u8
}

/// Categories do not count toward emptiness.
pub fn is_empty(raw: &AnalysisResult) -> bool {
    raw.captions().is_empty() && raw.tags.is_empty() && raw.objects.is_empty()
}

pub fn normalize(raw: &AnalysisResult) -> Normalized {
    if is_empty(raw) {
        tracing::debug!(
            "Analysis payload has no captions, tags or objects ({} categories)",
            raw.categories.len()
        );
        return Normalized::Empty;
    }

    let caption = raw.best_caption();
    let description = caption
        .map(|c| c.text.clone())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    Normalized::Result(NormalizedResult {
        description,
        description_confidence: caption.map(|c| to_percent(c.confidence)),
        tags: raw
            .tags
            .iter()
            .map(|tag| NormalizedTag {
                name: tag.name.clone(),
                confidence: tag.confidence,
                confidence_percent: to_percent(tag.confidence),
            })
            .collect(),
        objects: raw
            .objects
            .iter()
            .map(|object| NormalizedObject {
                label: object.object.clone(),
                confidence: object.confidence,
                confidence_percent: to_percent(object.confidence),
            })
            .collect(),
        categories: raw
            .categories
            .iter()
            .map(|category| NormalizedCategory {
                name: category.name.clone(),
                score_percent: to_percent(category.score),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Caption, Category, Description, DetectedObject, Tag};

    fn parse(json: &str) -> AnalysisResult {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rounding() {
        assert_eq!(to_percent(0.5), 50);
        assert_eq!(to_percent(0.845), 85);
        assert_eq!(to_percent(0.004), 0);
        assert_eq!(to_percent(0.005), 1);
        assert_eq!(to_percent(0.93), 93);
        assert_eq!(to_percent(1.0), 100);
        assert_eq!(to_percent(0.0), 0);
    }

    #[test]
    fn test_rounding_out_of_range() {
        assert_eq!(to_percent(1.7), 100);
        assert_eq!(to_percent(-0.2), 0);
        assert_eq!(to_percent(f64::NAN), 0);
    }

    #[test]
    fn test_same_probability_rounds_identically() {
        let raw = AnalysisResult {
            tags: vec![Tag {
                name: "dog".to_string(),
                confidence: 0.845,
            }],
            objects: vec![DetectedObject {
                object: "dog".to_string(),
                confidence: 0.845,
                rectangle: None,
            }],
            description: None,
            categories: vec![Category {
                name: "animal_dog".to_string(),
                score: 0.845,
            }],
        };
        let Normalized::Result(result) = normalize(&raw) else {
            panic!("expected a result");
        };
        assert_eq!(result.tags[0].confidence_percent, 85);
        assert_eq!(result.objects[0].confidence_percent, 85);
        assert_eq!(result.categories[0].score_percent, 85);
    }

    #[test]
    fn test_empty_despite_categories() {
        let raw = parse(
            r#"{"tags":[],"objects":[],"description":{"captions":[]},"categories":[{"name":"animal","score":0.7}]}"#,
        );
        assert_eq!(normalize(&raw), Normalized::Empty);
    }

    #[test]
    fn test_empty_when_everything_missing() {
        assert_eq!(normalize(&parse("{}")), Normalized::Empty);
    }

    #[test]
    fn test_cat_scenario() {
        let raw = parse(
            r#"{"tags":[{"name":"cat","confidence":0.93}],"objects":[],"description":{"captions":[{"text":"a cat","confidence":0.9}]},"categories":[]}"#,
        );
        let Normalized::Result(result) = normalize(&raw) else {
            panic!("expected a result");
        };
        assert_eq!(result.description, "a cat");
        assert_eq!(result.description_confidence, Some(90));
        assert_eq!(result.tags.len(), 1);
        assert_eq!(result.tags[0].name, "cat");
        assert_eq!(result.tags[0].confidence_percent, 93);
        assert!(result.objects.is_empty());
    }

    #[test]
    fn test_caption_only_is_not_empty() {
        let raw = AnalysisResult {
            description: Some(Description {
                captions: vec![Caption {
                    text: "a blurry photo".to_string(),
                    confidence: 0.3,
                }],
            }),
            ..Default::default()
        };
        assert!(matches!(normalize(&raw), Normalized::Result(_)));
    }

    #[test]
    fn test_description_fallback() {
        let raw = parse(r#"{"objects":[{"object":"car","confidence":0.61,"rectangle":null}]}"#);
        let Normalized::Result(result) = normalize(&raw) else {
            panic!("expected a result");
        };
        assert_eq!(result.description, NO_DESCRIPTION);
        assert_eq!(result.description_confidence, None);
        assert_eq!(result.objects[0].label, "car");
        assert_eq!(result.objects[0].confidence_percent, 61);
    }

    #[test]
    fn test_tags_keep_received_order_and_length() {
        let tags = (0..20)
            .map(|i| format!(r#"{{"name":"t{}","confidence":{}}}"#, i, (i as f64) / 20.0))
            .collect::<Vec<_>>()
            .join(",");
        let raw = parse(&format!(r#"{{"tags":[{}]}}"#, tags));
        let Normalized::Result(result) = normalize(&raw) else {
            panic!("expected a result");
        };
        assert_eq!(result.tags.len(), 20);
        assert_eq!(result.tags[0].name, "t0");
        assert_eq!(result.tags[19].name, "t19");
        assert_eq!(result.displayed_tags().len(), 12);
    }
}
