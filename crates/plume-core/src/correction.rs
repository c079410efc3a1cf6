//! Correction result model and the taxonomy classifier.
//!
//! Everything here is a value object: a pipeline run produces a fresh
//! `CorrectionResult` and nothing is shared between invocations. The
//! classifier is total over arbitrary JSON because model output is
//! untrusted - missing or garbled fields must never abort a correction.

use serde::{Deserialize, Serialize};

/// Sentinel used when the model omits the document-level explanation.
pub const NO_EXPLANATION: &str = "No explanation provided.";

/// Closed taxonomy for individual corrections.
///
/// Anything the model returns outside this set collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionType {
    Punctuation,
    Conjugation,
    Spelling,
    Comprehension,
    Grammar,
    Other,
}

impl CorrectionType {
    /// All taxonomy members, in display order.
    pub fn all() -> [CorrectionType; 6] {
        [
            CorrectionType::Punctuation,
            CorrectionType::Conjugation,
            CorrectionType::Spelling,
            CorrectionType::Comprehension,
            CorrectionType::Grammar,
            CorrectionType::Other,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorrectionType::Punctuation => "Punctuation",
            CorrectionType::Conjugation => "Conjugation",
            CorrectionType::Spelling => "Spelling",
            CorrectionType::Comprehension => "Comprehension",
            CorrectionType::Grammar => "Grammar",
            CorrectionType::Other => "Other",
        }
    }

    /// Resolve a raw model-provided value. Exact member names only;
    /// everything else (including absence) is `Other`.
    pub fn from_raw(raw: Option<&str>) -> CorrectionType {
        match raw {
            Some("Punctuation") => CorrectionType::Punctuation,
            Some("Conjugation") => CorrectionType::Conjugation,
            Some("Spelling") => CorrectionType::Spelling,
            Some("Comprehension") => CorrectionType::Comprehension,
            Some("Grammar") => CorrectionType::Grammar,
            _ => CorrectionType::Other,
        }
    }
}

/// A single change the model made to the input text.
///
/// `original` is an approximate quoted snippet, not an offset-addressable
/// span of the input; treat it as display text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionItem {
    pub original: String,
    pub corrected: String,
    #[serde(rename = "shortExplanation", default)]
    pub short_explanation: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(rename = "type")]
    pub kind: CorrectionType,
}

/// The normalized outcome of one correction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    #[serde(rename = "correctedText")]
    pub corrected_text: String,
    pub explanation: String,
    pub corrections: Vec<CorrectionItem>,
}

impl CorrectionResult {
    /// Empty result for whitespace-only input: no model call was made.
    pub fn empty() -> Self {
        CorrectionResult {
            corrected_text: String::new(),
            explanation: String::new(),
            corrections: Vec::new(),
        }
    }
}

fn string_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Normalize one raw correction entry from the model.
///
/// Total over arbitrary input shapes: narrative fields default to empty
/// strings and unknown `type` values resolve to `Other`. This never fails.
pub fn classify_correction(raw: &serde_json::Value) -> CorrectionItem {
    let kind = CorrectionType::from_raw(raw.get("type").and_then(|v| v.as_str()));
    CorrectionItem {
        original: string_field(raw, "original"),
        corrected: string_field(raw, "corrected"),
        short_explanation: string_field(raw, "shortExplanation"),
        explanation: string_field(raw, "explanation"),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_exact_members() {
        assert_eq!(
            CorrectionType::from_raw(Some("Grammar")),
            CorrectionType::Grammar
        );
        assert_eq!(
            CorrectionType::from_raw(Some("Spelling")),
            CorrectionType::Spelling
        );
    }

    #[test]
    fn test_from_raw_unknown_defaults_to_other() {
        assert_eq!(CorrectionType::from_raw(Some("Foo")), CorrectionType::Other);
        assert_eq!(
            // Case matters: only exact member names resolve.
            CorrectionType::from_raw(Some("grammar")),
            CorrectionType::Other
        );
        assert_eq!(CorrectionType::from_raw(None), CorrectionType::Other);
    }

    #[test]
    fn test_classify_copies_fields_verbatim() {
        let raw = json!({
            "original": "je suis aller",
            "corrected": "je suis allé",
            "shortExplanation": "past participle",
            "explanation": "With être, the participle agrees with the subject.",
            "type": "Conjugation"
        });
        let item = classify_correction(&raw);
        assert_eq!(item.original, "je suis aller");
        assert_eq!(item.corrected, "je suis allé");
        assert_eq!(item.short_explanation, "past participle");
        assert_eq!(item.kind, CorrectionType::Conjugation);
    }

    #[test]
    fn test_classify_unknown_type_is_other() {
        let raw = json!({"original": "a", "corrected": "b", "type": "Foo"});
        let item = classify_correction(&raw);
        assert_eq!(item.kind, CorrectionType::Other);
    }

    #[test]
    fn test_classify_is_total_over_junk() {
        for raw in [
            json!({}),
            json!(null),
            json!(42),
            json!("just a string"),
            json!(["array"]),
            json!({"original": 7, "type": {"nested": true}}),
        ] {
            let item = classify_correction(&raw);
            assert_eq!(item.kind, CorrectionType::Other);
            assert!(item.original.is_empty() || raw.get("original").is_some());
        }
    }

    #[test]
    fn test_empty_result() {
        let result = CorrectionResult::empty();
        assert!(result.corrected_text.is_empty());
        assert!(result.corrections.is_empty());
    }

    #[test]
    fn test_result_serde_round_trip_uses_wire_names() {
        let result = CorrectionResult {
            corrected_text: "Bonjour.".to_string(),
            explanation: NO_EXPLANATION.to_string(),
            corrections: vec![CorrectionItem {
                original: "bonjour".to_string(),
                corrected: "Bonjour.".to_string(),
                short_explanation: String::new(),
                explanation: String::new(),
                kind: CorrectionType::Punctuation,
            }],
        };
        let encoded = serde_json::to_value(&result).unwrap();
        assert!(encoded.get("correctedText").is_some());
        assert!(encoded["corrections"][0].get("type").is_some());
        let decoded: CorrectionResult = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, result);
    }
}
