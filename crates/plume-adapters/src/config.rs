//! Configuration management for Plume
//!
//! Stores settings in ~/.config/plume/config.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Model used when nothing has been configured yet.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// User id recorded on saved corrections when no identity provider is wired in.
const DEFAULT_USER_ID: &str = "local";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Gemini API key. Environment variables take precedence over this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Active generative model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Identity recorded on stored corrections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plume"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str::<Config>(&content) {
                    Ok(config) => return config,
                    Err(err) => {
                        preserve_corrupt_config(&path, &content);
                        tracing::warn!(
                            "config file was corrupted ({err}); a backup was saved and defaults were loaded"
                        );
                    }
                }
            }
        }
        Self::default()
    }

    /// Save config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        fs::create_dir_all(&dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&dir, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to set config directory permissions: {e}");
            }
        }

        let path = dir.join("config.json");
        let content = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            write_config_atomic(&path, &content)?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, content)?;
        }

        Ok(())
    }

    /// Get the Gemini API key (environment first, config fallback).
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    /// Check if an API key is resolvable at all.
    pub fn has_api_key(&self) -> bool {
        self.resolve_api_key().is_some()
    }

    /// The active model identifier, falling back to the default.
    pub fn model(&self) -> String {
        self.model_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    /// Persist a new active model. Callers must invalidate any
    /// `ModelCache` handles afterwards so readers pick up the change.
    pub fn set_model(&mut self, model_name: &str) -> anyhow::Result<()> {
        let model_name = model_name.trim();
        if model_name.is_empty() {
            anyhow::bail!("Model name cannot be empty");
        }
        self.model_name = Some(model_name.to_string());
        self.save()
    }

    /// Identity recorded on saved corrections.
    pub fn current_user_id(&self) -> String {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_USER_ID)
            .to_string()
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/plume/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &std::path::Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

#[cfg(unix)]
fn write_config_atomic(path: &std::path::Path, content: &str) -> anyhow::Result<()> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::PermissionsExt;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        tracing::warn!("failed to set temp config file permissions: {e}");
    }

    file.write_all(content.as_bytes())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_empty_object() {
        let config = Config::default();
        let encoded = serde_json::to_string(&config).unwrap();
        assert_eq!(encoded, "{}");
    }

    #[test]
    fn test_config_deserializes_legacy_shape_with_defaults() {
        let legacy = r#"{"model_name":"gemini-1.5-pro","theme":"dark"}"#;
        let parsed: Config = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_model_defaults_when_unset_or_blank() {
        let config = Config::default();
        assert_eq!(config.model(), DEFAULT_MODEL);

        let config = Config {
            model_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_current_user_id_defaults_to_local() {
        let config = Config::default();
        assert_eq!(config.current_user_id(), "local");

        let config = Config {
            user_id: Some("marie".to_string()),
            ..Default::default()
        };
        assert_eq!(config.current_user_id(), "marie");
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config {
            api_key: None,
            model_name: Some("gemini-2.5-flash".to_string()),
            user_id: Some("marie".to_string()),
        };
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: Config = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.model(), "gemini-2.5-flash");
        assert_eq!(decoded.current_user_id(), "marie");
    }
}
