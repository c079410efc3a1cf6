use super::error::LlmError;
use plume_adapters::config::Config;
use plume_adapters::model_cache::ModelCache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini generative-language API base URL.
pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Transport timeout. The API has no documented ceiling; 30s keeps a hung
/// request from suspending the caller indefinitely.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum length for error content in error messages
const MAX_ERROR_CONTENT_LEN: usize = 200;

pub(crate) fn truncate_str(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Sanitize API response content for error messages to prevent credential leakage.
fn sanitize_api_response(content: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &["api_key", "apikey", "secret", "password", "credential", "bearer", "aiza"];

    let truncated = truncate_str(content, MAX_ERROR_CONTENT_LEN);

    let lower = truncated.to_lowercase();
    for pattern in SECRET_PATTERNS {
        if lower.contains(pattern) {
            return "(response details redacted - may contain sensitive data)".to_string();
        }
    }

    truncated.to_string()
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    /// Text can be absent for non-text parts.
    #[serde(default)]
    text: Option<String>,
}

/// Gateway to the Gemini generateContent endpoint.
///
/// Owns the HTTP client, the credential, and an injected handle to the
/// process-wide model-identifier cache. The credential travels only in the
/// `x-goog-api-key` header and never appears in errors or logs.
#[derive(Debug)]
pub struct GeminiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) api_key: String,
    model_cache: ModelCache,
}

impl GeminiClient {
    /// Build a client from resolved configuration. Fails with a
    /// configuration error before any network traffic when no key is
    /// resolvable.
    pub fn from_config(config: &Config, model_cache: ModelCache) -> anyhow::Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            anyhow::Error::new(LlmError::Configuration(format!(
                "No Gemini API key configured. Set GEMINI_API_KEY or add \"api_key\" to {}.",
                Config::config_location()
            )))
        })?;
        Self::with_key(api_key, model_cache)
    }

    /// Build a client around an explicit key (tests and embedding callers).
    pub fn with_key(api_key: impl Into<String>, model_cache: ModelCache) -> anyhow::Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(anyhow::Error::new(LlmError::Configuration(
                "Gemini API key is empty.".to_string(),
            )));
        }
        Ok(GeminiClient {
            http: create_http_client(REQUEST_TIMEOUT_SECS)?,
            api_key,
            model_cache,
        })
    }

    pub fn model_cache(&self) -> &ModelCache {
        &self.model_cache
    }

    /// The active model identifier: cache hit wins, otherwise the
    /// configured name is read and cached. Readers may see a stale value
    /// until the cache is invalidated after a configuration write.
    pub fn resolve_model(&self) -> String {
        if let Some(model) = self.model_cache.get() {
            return model;
        }
        let model = Config::load().model();
        self.model_cache.set(model.clone());
        model
    }

    /// Send one prompt and return the model's raw text output.
    ///
    /// One outbound call per invocation; retry policy lives in the caller.
    /// `json_mode` asks the API for an `application/json` response body.
    pub async fn generate(&self, prompt: &str, json_mode: bool) -> anyhow::Result<String> {
        let model = self.resolve_model();
        let url = format!("{}/models/{}:generateContent", GEMINI_API_BASE, model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: json_mode.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        tracing::debug!(%model, json_mode, prompt_chars = prompt.chars().count(), "dispatching generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_network_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_network_error)?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            anyhow::Error::new(LlmError::MalformedResponse(format!(
                "Unexpected Gemini response shape: {}",
                e
            )))
        })?;

        extract_candidate_text(&parsed)
    }
}

/// Create a configured HTTP client for Gemini requests
pub(crate) fn create_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))
}

fn map_network_error(err: reqwest::Error) -> anyhow::Error {
    let message = if err.is_timeout() {
        format!("Request to the Gemini API timed out after {}s.", REQUEST_TIMEOUT_SECS)
    } else if err.is_connect() {
        "Could not connect to the Gemini API.".to_string()
    } else {
        format!("Network error talking to the Gemini API: {}", err)
    };
    anyhow::Error::new(LlmError::Transport(message))
}

/// Map a non-success HTTP status onto the failure taxonomy. Only 429 is
/// transient; everything else surfaces immediately.
pub(crate) fn classify_status(status: u16, body: &str) -> anyhow::Error {
    if status == 429 {
        return anyhow::Error::new(LlmError::RateLimited);
    }
    let message = match status {
        400 | 401 | 403 => format!(
            "The Gemini API rejected the request ({}). Check that the API key is valid.",
            status
        ),
        404 => "Unknown model. Check the configured model name with 'plume model get'.".to_string(),
        500..=599 => format!(
            "Gemini server error ({}). The service may be temporarily unavailable.",
            status
        ),
        _ => format!("API error {}: {}", status, sanitize_api_response(body)),
    };
    anyhow::Error::new(LlmError::Transport(message))
}

fn extract_candidate_text(response: &GenerateContentResponse) -> anyhow::Result<String> {
    let content: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if content.is_empty() {
        return Err(anyhow::Error::new(LlmError::MalformedResponse(
            "The Gemini API returned an empty response. Please try again.".to_string(),
        )));
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_429_is_rate_limited() {
        let err = classify_status(429, "quota exceeded");
        assert_eq!(LlmError::of(&err), Some(&LlmError::RateLimited));
    }

    #[test]
    fn test_classify_status_other_is_transport() {
        for status in [400u16, 404, 500, 503] {
            let err = classify_status(status, "boom");
            assert!(matches!(LlmError::of(&err), Some(LlmError::Transport(_))));
        }
    }

    #[test]
    fn test_sanitize_redacts_secretlike_content() {
        let sanitized = sanitize_api_response("error: api_key invalid");
        assert!(!sanitized.contains("api_key"));
        assert!(sanitized.contains("redacted"));
    }

    #[test]
    fn test_sanitize_truncates_long_content() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_api_response(&long).len(), MAX_ERROR_CONTENT_LEN);
    }

    #[test]
    fn test_request_serializes_generation_config_only_in_json_mode() {
        let with = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "bonjour".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };
        let encoded = serde_json::to_value(&with).unwrap();
        assert_eq!(
            encoded["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(encoded["contents"][0]["parts"][0]["text"], "bonjour");

        let without = GenerateContentRequest {
            contents: Vec::new(),
            generation_config: None,
        };
        let encoded = serde_json::to_value(&without).unwrap();
        assert!(encoded.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_candidate_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_candidate_text(&response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_candidate_text_rejects_empty() {
        for raw in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"inlineData":"x"}]}}]}"#,
        ] {
            let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
            let err = extract_candidate_text(&response).unwrap_err();
            assert!(matches!(
                LlmError::of(&err),
                Some(LlmError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_with_key_rejects_blank_credential() {
        let err = GeminiClient::with_key("  ", ModelCache::new()).unwrap_err();
        assert!(matches!(
            LlmError::of(&err),
            Some(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_model_prefers_cache() {
        let cache = ModelCache::new();
        cache.set("gemini-1.5-pro".to_string());
        let client = GeminiClient::with_key("test-key", cache).unwrap();
        assert_eq!(client.resolve_model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_resolve_model_populates_cache_on_miss() {
        let cache = ModelCache::new();
        let client = GeminiClient::with_key("test-key", cache.clone()).unwrap();
        let resolved = client.resolve_model();
        assert!(!resolved.is_empty());
        assert_eq!(cache.get().as_deref(), Some(resolved.as_str()));
    }
}
