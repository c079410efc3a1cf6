//! Model-response parsing.
//!
//! Two deliberately separate extraction strategies live here. The
//! correction path uses a strict fence-stripped parse with mandatory-field
//! validation; the advice path uses `extract_balanced_object`, which
//! tolerates prose around the payload. They are kept independent - the
//! looser scan is a tolerance trade-off for a supplementary feature, not a
//! general-purpose parser.

use super::error::LlmError;
use plume_core::correction::{classify_correction, CorrectionResult, NO_EXPLANATION};

/// Explanation attached when the response is not valid JSON and the raw
/// text is surfaced instead.
pub(crate) const UNPARSEABLE_EXPLANATION: &str =
    "The AI response could not be parsed; the raw text is shown instead.";

/// Strip markdown code fences from a response
pub(crate) fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if trimmed.starts_with("```json") {
        trimmed.strip_prefix("```json").unwrap_or(trimmed)
    } else if trimmed.starts_with("```") {
        trimmed.strip_prefix("```").unwrap_or(trimmed)
    } else {
        trimmed
    };
    let clean = if clean.ends_with("```") {
        clean.strip_suffix("```").unwrap_or(clean)
    } else {
        clean
    };
    clean.trim()
}

/// Parse a raw model response into a `CorrectionResult`.
///
/// Pure and idempotent. Invalid JSON degrades to a raw-text result rather
/// than failing - a garbled response should still surface something to the
/// user. A response that IS valid JSON but lacks a string `correctedText`
/// fails with `MalformedResponse`.
pub fn parse_correction_response(raw: &str) -> anyhow::Result<CorrectionResult> {
    let trimmed = raw.trim();
    let clean = strip_markdown_fences(trimmed);

    let value: serde_json::Value = match serde_json::from_str(clean) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, "response is not valid JSON, degrading to raw text");
            return Ok(CorrectionResult {
                corrected_text: trimmed.to_string(),
                explanation: UNPARSEABLE_EXPLANATION.to_string(),
                corrections: Vec::new(),
            });
        }
    };

    let corrected_text = match value.get("correctedText") {
        None => {
            return Err(anyhow::Error::new(LlmError::MalformedResponse(
                "Missing correctedText in response".to_string(),
            )))
        }
        Some(field) => field
            .as_str()
            .ok_or_else(|| {
                anyhow::Error::new(LlmError::MalformedResponse(
                    "correctedText is not a string".to_string(),
                ))
            })?
            .to_string(),
    };

    let explanation = value
        .get("explanation")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_EXPLANATION)
        .to_string();

    let corrections = value
        .get("corrections")
        .and_then(|v| v.as_array())
        .map(|entries| entries.iter().map(classify_correction).collect())
        .unwrap_or_default();

    Ok(CorrectionResult {
        corrected_text,
        explanation,
        corrections,
    })
}

/// Extract the first balanced JSON object found anywhere in `text`.
/// Properly handles nested structures and ignores braces inside strings.
pub(crate) fn extract_balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut start_idx = None;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }

        if c == '"' && start_idx.is_some() {
            in_string = !in_string;
            continue;
        }

        if in_string {
            continue;
        }

        if c == '{' {
            if depth == 0 {
                start_idx = Some(i);
            }
            depth += 1;
        } else if c == '}' && start_idx.is_some() {
            depth -= 1;
            if depth == 0 {
                if let Some(start) = start_idx {
                    return Some(&text[start..=i]);
                }
            }
        }
    }

    None
}
