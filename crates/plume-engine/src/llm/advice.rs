//! History aggregator: folds past corrections into study advice.
//!
//! Unlike the correction pipeline, this never fails outward. The feature
//! is supplementary, so every failure mode - gateway errors, exhausted
//! retries, unparseable output - becomes a degraded but valid
//! `StudyAdvice`.

use super::client::GeminiClient;
use super::parse::extract_balanced_object;
use super::{prompts, retry};
use plume_core::advice::StudyAdvice;
use plume_core::correction::CorrectionItem;

const RAW_ADVICE_TITLE: &str = "Analyse non structurée";
const TECHNICAL_ERROR_TITLE: &str = "Erreur technique";

/// Generate study advice from a user's past corrections.
///
/// Empty history returns canned advice with no network call. Otherwise the
/// model is invoked through the shared retry policy and the response is
/// parsed with the loose balanced-object scan, tolerating prose around the
/// JSON payload.
pub async fn study_advice(client: &GeminiClient, items: &[CorrectionItem]) -> StudyAdvice {
    if items.is_empty() {
        return StudyAdvice::nothing_to_analyze();
    }

    let prompt = prompts::advice_prompt(items);
    let outcome = retry::retry_rate_limited(|| client.generate(&prompt, false)).await;
    advice_from_model_output(outcome)
}

/// Total post-processing of the gateway outcome: every branch produces a
/// value.
pub(crate) fn advice_from_model_output(outcome: anyhow::Result<String>) -> StudyAdvice {
    let raw = match outcome {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(%err, "advice generation failed, returning degraded advice");
            return StudyAdvice::degraded(
                TECHNICAL_ERROR_TITLE,
                format!("Une erreur technique est survenue: {}", err),
            );
        }
    };

    let Some(fragment) = extract_balanced_object(&raw) else {
        tracing::debug!("no JSON object in advice response, returning raw text");
        return StudyAdvice::degraded(RAW_ADVICE_TITLE, raw.trim().to_string());
    };

    match serde_json::from_str::<StudyAdvice>(fragment) {
        Ok(advice) => advice,
        Err(err) => {
            tracing::debug!(%err, "advice JSON did not match the expected shape");
            StudyAdvice::degraded(RAW_ADVICE_TITLE, raw.trim().to_string())
        }
    }
}
