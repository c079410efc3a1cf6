//! The correction pipeline: prompt, gateway with retry, parse.

use super::client::GeminiClient;
use super::parse::parse_correction_response;
use super::{prompts, retry};
use plume_core::correction::CorrectionResult;

/// Correct a piece of French text.
///
/// Whitespace-only input short-circuits with an empty result and makes no
/// network call. Rate limits are retried with exponential backoff; every
/// other failure (configuration, transport, malformed payload, exhausted
/// retries) propagates to the caller as a human-readable error.
pub async fn correct_text(client: &GeminiClient, text: &str) -> anyhow::Result<CorrectionResult> {
    if text.trim().is_empty() {
        return Ok(CorrectionResult::empty());
    }

    let prompt = prompts::correction_prompt(text);
    let raw = retry::retry_rate_limited(|| client.generate(&prompt, true)).await?;
    tracing::debug!(response_chars = raw.chars().count(), "received correction response");
    parse_correction_response(&raw)
}
