//! Study-advice model produced by the history aggregator.
//!
//! This is a second level of aggregation, independent of
//! `CorrectionType`: one entry per identified error pattern across many
//! past corrections, not one entry per correction. Every field tolerates
//! absence because the shape comes straight from model output.

use serde::{Deserialize, Serialize};

/// One before/after example attached to an advice entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdviceExample {
    #[serde(default)]
    pub original: String,
    // Some model responses use "correction" for this field.
    #[serde(default, alias = "correction")]
    pub corrected: String,
    #[serde(default)]
    pub explanation: String,
}

/// One recurring error pattern with guidance and examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdviceEntry {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub examples: Vec<AdviceExample>,
}

/// Personalized study advice derived from a user's correction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StudyAdvice {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub corrections: Vec<AdviceEntry>,
}

impl StudyAdvice {
    /// Canned advice for an empty history. No model call is made for this.
    pub fn nothing_to_analyze() -> Self {
        StudyAdvice {
            summary: "Aucune correction à analyser.".to_string(),
            corrections: Vec::new(),
        }
    }

    /// Degraded single-entry advice carrying whatever text is available.
    pub fn degraded(title: &str, content: String) -> Self {
        StudyAdvice {
            summary: title.to_string(),
            corrections: vec![AdviceEntry {
                category: "Autre".to_string(),
                title: title.to_string(),
                content,
                examples: Vec::new(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tolerates_missing_fields() {
        let advice: StudyAdvice = serde_json::from_str("{}").unwrap();
        assert!(advice.summary.is_empty());
        assert!(advice.corrections.is_empty());

        let advice: StudyAdvice =
            serde_json::from_str(r#"{"corrections": [{"category": "Grammaire"}]}"#).unwrap();
        assert_eq!(advice.corrections.len(), 1);
        assert_eq!(advice.corrections[0].category, "Grammaire");
        assert!(advice.corrections[0].examples.is_empty());
    }

    #[test]
    fn test_example_accepts_correction_alias() {
        let example: AdviceExample =
            serde_json::from_str(r#"{"original": "a", "correction": "b"}"#).unwrap();
        assert_eq!(example.corrected, "b");
    }

    #[test]
    fn test_nothing_to_analyze_is_empty() {
        let advice = StudyAdvice::nothing_to_analyze();
        assert!(advice.corrections.is_empty());
        assert!(!advice.summary.is_empty());
    }

    #[test]
    fn test_degraded_has_single_entry() {
        let advice = StudyAdvice::degraded("Réponse illisible", "raw text".to_string());
        assert_eq!(advice.corrections.len(), 1);
        assert_eq!(advice.corrections[0].content, "raw text");
    }
}
