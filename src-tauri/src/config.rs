//! App Configuration
//!
//! Persisted as `config.json` in the app config directory. Environment
//! variables override the file for the LLM settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

const ENV_BASE_URL: &str = "MINDWELL_LLM_BASE_URL";
const ENV_API_KEY: &str = "MINDWELL_LLM_API_KEY";
const ENV_MODEL: &str = "MINDWELL_LLM_MODEL";

/// Placeholder shown in place of a stored API key
pub const REDACTED_KEY: &str = "********";

/// LLM endpoint settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Copy safe to hand to the frontend
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| REDACTED_KEY.to_string()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load from `path`; a missing or unreadable file yields defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.llm.base_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.llm.model = model;
        }
        self
    }

    /// Replace the LLM settings from the frontend. A masked or absent key
    /// keeps the stored one; a blank key clears it.
    pub fn merge_llm(&mut self, incoming: LlmConfig) {
        let api_key = match incoming.api_key.as_deref() {
            None | Some(REDACTED_KEY) => self.llm.api_key.take(),
            Some(key) if key.trim().is_empty() => None,
            Some(key) => Some(key.trim().to_string()),
        };
        self.llm = LlmConfig { api_key, ..incoming };
    }

    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }
}

/// Config file location inside the app config directory
pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}
