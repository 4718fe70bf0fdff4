use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExportError;
use crate::pipeline::types::NormalizedResult;

pub const EXPORT_FILE_NAME: &str = "image-analysis-results.json";

const NO_TAGS: &str = "No tags detected";
const NO_OBJECTS: &str = "No objects detected";

#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub description: &'a str,
    pub tags: Vec<ExportTag<'a>>,
    pub objects: Vec<ExportObject<'a>>,
    pub categories: Vec<ExportCategory<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ExportTag<'a> {
    pub name: &'a str,
    pub confidence: u8,
}

#[derive(Debug, Serialize)]
pub struct ExportObject<'a> {
    pub object: &'a str,
    pub confidence: u8,
}

#[derive(Debug, Serialize)]
pub struct ExportCategory<'a> {
    pub name: &'a str,
    pub score: u8,
}

impl<'a> From<&'a NormalizedResult> for ExportDocument<'a> {
    fn from(result: &'a NormalizedResult) -> Self {
        Self {
            description: &result.description,
            tags: result
                .tags
                .iter()
                .map(|tag| ExportTag {
                    name: &tag.name,
                    confidence: tag.confidence_percent,
                })
                .collect(),
            objects: result
                .objects
                .iter()
                .map(|object| ExportObject {
                    object: &object.label,
                    confidence: object.confidence_percent,
                })
                .collect(),
            categories: result
                .categories
                .iter()
                .map(|category| ExportCategory {
                    name: &category.name,
                    score: category.score_percent,
                })
                .collect(),
        }
    }
}

/// Plain-text summary placed on the clipboard.
pub fn clipboard_text(result: &NormalizedResult) -> String {
    let tags = join_or(
        result
            .tags
            .iter()
            .map(|tag| format!("{} ({}%)", tag.name, tag.confidence_percent)),
        NO_TAGS,
    );
    let objects = join_or(
        result
            .objects
            .iter()
            .map(|object| format!("{} ({}%)", object.label, object.confidence_percent)),
        NO_OBJECTS,
    );
    format!(
        "AI Description: {}\n\nTags: {}\n\nObjects: {}",
        result.description, tags, objects
    )
}

fn join_or(entries: impl Iterator<Item = String>, fallback: &str) -> String {
    let joined = entries.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

/// Pretty-printed JSON export document.
pub fn export_json(result: &NormalizedResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from(result))?)
}

/// Writes the export document to `path`. A directory gets the default file name.
pub fn write_export(result: &NormalizedResult, path: &Path) -> Result<PathBuf, ExportError> {
    let target = if path.is_dir() {
        path.join(EXPORT_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    std::fs::write(&target, export_json(result)?)?;
    tracing::info!("Exported analysis results to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{NormalizedCategory, NormalizedObject, NormalizedTag};

    fn dog_result() -> NormalizedResult {
        NormalizedResult {
            description: "a dog".to_string(),
            description_confidence: Some(77),
            tags: vec![NormalizedTag {
                name: "dog".to_string(),
                confidence: 0.88,
                confidence_percent: 88,
            }],
            objects: vec![],
            categories: vec![],
        }
    }

    #[test]
    fn test_clipboard_text_format() {
        assert_eq!(
            clipboard_text(&dog_result()),
            "AI Description: a dog\n\nTags: dog (88%)\n\nObjects: No objects detected"
        );
    }

    #[test]
    fn test_clipboard_text_joins_entries() {
        let mut result = dog_result();
        result.tags.push(NormalizedTag {
            name: "grass".to_string(),
            confidence: 0.5,
            confidence_percent: 50,
        });
        result.objects.push(NormalizedObject {
            label: "dog".to_string(),
            confidence: 0.7,
            confidence_percent: 70,
        });
        assert_eq!(
            clipboard_text(&result),
            "AI Description: a dog\n\nTags: dog (88%), grass (50%)\n\nObjects: dog (70%)"
        );
    }

    #[test]
    fn test_clipboard_text_without_tags() {
        let mut result = dog_result();
        result.tags.clear();
        assert!(clipboard_text(&result).contains("Tags: No tags detected"));
    }

    #[test]
    fn test_export_json_shape() {
        let mut result = dog_result();
        result.objects.push(NormalizedObject {
            label: "ball".to_string(),
            confidence: 0.64,
            confidence_percent: 64,
        });
        result.categories.push(NormalizedCategory {
            name: "animal_dog".to_string(),
            score_percent: 91,
        });
        let json = export_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "description": "a dog",
                "tags": [{"name": "dog", "confidence": 88}],
                "objects": [{"object": "ball", "confidence": 64}],
                "categories": [{"name": "animal_dog", "score": 91}],
            })
        );
        assert!(json.contains("\n  \"description\""));
    }

    #[test]
    fn test_write_export_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(&dog_result(), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"a dog\""));
    }

    #[test]
    fn test_write_export_to_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mine.json");
        let path = write_export(&dog_result(), &target).unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }
}
