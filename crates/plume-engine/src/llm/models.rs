//! Model discovery against the Gemini models endpoint.

use super::client::{classify_status, GeminiClient, GEMINI_API_BASE};
use super::error::LlmError;
use serde::Deserialize;

/// One entry from the models listing. Fields the API omits fall back to
/// conservative defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_input_limit", rename = "inputTokenLimit")]
    pub input_token_limit: u32,
    #[serde(default = "default_output_limit", rename = "outputTokenLimit")]
    pub output_token_limit: u32,
}

fn default_input_limit() -> u32 {
    8192
}

fn default_output_limit() -> u32 {
    2048
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// List the models the configured credential can use.
pub async fn list_models(client: &GeminiClient) -> anyhow::Result<Vec<ModelInfo>> {
    let url = format!("{}/models", GEMINI_API_BASE);

    let response = client
        .http
        .get(&url)
        .header("x-goog-api-key", &client.api_key)
        .send()
        .await
        .map_err(|e| {
            anyhow::Error::new(LlmError::Transport(format!(
                "Failed to list models: {}",
                e
            )))
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        anyhow::Error::new(LlmError::Transport(format!("Failed to list models: {}", e)))
    })?;

    if !status.is_success() {
        return Err(classify_status(status.as_u16(), &text));
    }

    let parsed: ListModelsResponse = serde_json::from_str(&text).map_err(|e| {
        anyhow::Error::new(LlmError::MalformedResponse(format!(
            "Unexpected models listing shape: {}",
            e
        )))
    })?;

    Ok(parsed.models)
}
