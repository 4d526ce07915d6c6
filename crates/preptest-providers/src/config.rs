//! Configuration loading, API key resolution, and the service factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use preptest_core::engine::EngineConfig;
use preptest_core::error::EngineError;
use preptest_core::model::Difficulty;
use preptest_core::traits::QuestionService;
use preptest_core::view::FeedbackPolicy;

use crate::gemini::GeminiProvider;

/// The value shipped in sample `.env` files; never a real key.
pub const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

/// Environment variable that overrides the configured key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini connection settings.
///
/// Note: Custom Debug impl masks the API key to keep it out of logs.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Defaults for the setup form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDefaults {
    #[serde(default)]
    pub default_subject: Option<String>,
    #[serde(default)]
    pub default_difficulty: Difficulty,
    #[serde(default = "default_duration")]
    pub default_duration_minutes: u32,
}

impl Default for TestDefaults {
    fn default() -> Self {
        Self {
            default_subject: None,
            default_difficulty: Difficulty::default(),
            default_duration_minutes: default_duration(),
        }
    }
}

fn default_duration() -> u32 {
    30
}

/// Top-level preptest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreptestConfig {
    /// Fetch the API key from this endpoint instead of `gemini.api_key`.
    #[serde(default)]
    pub config_endpoint: Option<String>,
    /// Screen fade-out time in milliseconds.
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,
    /// Screen fade-in delay in milliseconds.
    #[serde(default = "default_fade_in_delay_ms")]
    pub fade_in_delay_ms: u64,
    /// Escape generated feedback instead of inserting it as HTML.
    #[serde(default)]
    pub sanitize_feedback: bool,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub test: TestDefaults,
}

fn default_fade_out_ms() -> u64 {
    500
}
fn default_fade_in_delay_ms() -> u64 {
    50
}

impl Default for PreptestConfig {
    fn default() -> Self {
        Self {
            config_endpoint: None,
            fade_out_ms: default_fade_out_ms(),
            fade_in_delay_ms: default_fade_in_delay_ms(),
            sanitize_feedback: false,
            gemini: GeminiConfig::default(),
            test: TestDefaults::default(),
        }
    }
}

impl PreptestConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fade_out: Duration::from_millis(self.fade_out_ms),
            fade_in_delay: Duration::from_millis(self.fade_in_delay_ms),
            feedback_policy: if self.sanitize_feedback {
                FeedbackPolicy::Escaped
            } else {
                FeedbackPolicy::Trusted
            },
        }
    }
}

/// Body of the configuration endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "geminiApiKey", default)]
    pub gemini_api_key: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("gemini_api_key", &"***")
            .finish()
    }
}

/// Reject empty and placeholder keys.
pub fn validate_api_key(key: &str) -> Result<(), EngineError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(EngineError::Configuration("API key is not set".into()));
    }
    if key == PLACEHOLDER_API_KEY {
        return Err(EngineError::Configuration(
            "API key is still the placeholder value".into(),
        ));
    }
    Ok(())
}

/// GET the configuration endpoint.
pub async fn fetch_api_config(endpoint: &str) -> Result<ApiConfig> {
    let response = reqwest::get(endpoint)
        .await
        .with_context(|| format!("failed to reach config endpoint {endpoint}"))?
        .error_for_status()
        .with_context(|| format!("config endpoint {endpoint} returned an error"))?;
    response
        .json::<ApiConfig>()
        .await
        .context("failed to parse config endpoint response")
}

/// Resolve and validate the API key, from the endpoint when one is set.
pub async fn resolve_api_key(config: &PreptestConfig) -> Result<String, EngineError> {
    let key = match &config.config_endpoint {
        Some(endpoint) => {
            tracing::debug!(%endpoint, "fetching API key from config endpoint");
            fetch_api_config(endpoint)
                .await
                .map_err(|e| EngineError::Configuration(format!("{e:#}")))?
                .gemini_api_key
        }
        None => config.gemini.api_key.clone(),
    };
    validate_api_key(&key)?;
    Ok(key.trim().to_string())
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Apply the key override and `${VAR}` expansion to a parsed config.
fn finalize(mut config: PreptestConfig, key_override: Option<String>) -> PreptestConfig {
    if let Some(key) = key_override.filter(|k| !k.trim().is_empty()) {
        config.gemini.api_key = key;
    }
    config.gemini.api_key = resolve_env_vars(&config.gemini.api_key);
    config.gemini.base_url = config.gemini.base_url.as_deref().map(resolve_env_vars);
    config.config_endpoint = config.config_endpoint.as_deref().map(resolve_env_vars);
    config
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `preptest.toml` in the current directory
/// 2. `~/.config/preptest/config.toml`
///
/// `GEMINI_API_KEY` in the environment overrides the configured key.
pub fn load_config() -> Result<PreptestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PreptestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("preptest.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<PreptestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PreptestConfig::default(),
    };

    Ok(finalize(config, std::env::var(API_KEY_ENV).ok()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("preptest"))
}

/// Create the Gemini service for a resolved key.
pub fn create_service(config: &PreptestConfig, api_key: &str) -> Result<Arc<dyn QuestionService>> {
    let provider = GeminiProvider::new(
        api_key,
        config.gemini.base_url.clone(),
        config.gemini.model.clone(),
    )?;
    Ok(Arc::new(provider))
}
