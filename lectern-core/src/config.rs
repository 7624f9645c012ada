//! Configuration management for Lectern.
//!
//! Provides configuration loading from TOML files with support for
//! multiple file locations, environment variable overrides, and sensible defaults.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Default sampling temperature sent with every chat request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default cap on generated tokens per reply.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default upper bound for a single provider request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default character limit for selected text and page context.
pub const DEFAULT_CONTEXT_MAX_CHARS: usize = 2000;

/// Default character limit for the selection preview shown above the chat.
pub const DEFAULT_PREVIEW_MAX_CHARS: usize = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        /// Path to the configuration file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML parse error.
        source: toml::de::Error,
    },
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Provider used when no stored preference exists (e.g., "openai", "anthropic").
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Fallback API key, used when the provider's environment variable is unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used when no stored preference exists.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request tuning and context limits.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Endpoint overrides for OpenAI- or Anthropic-compatible gateways.
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Request tuning and prompt-size limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatConfig {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens the provider may generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Timeout applied to every provider HTTP request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Character limit for selected text and page context in the prompt.
    #[serde(default = "default_context_max_chars")]
    pub context_max_chars: usize,

    /// Character limit for the selection preview.
    #[serde(default = "default_preview_max_chars")]
    pub preview_max_chars: usize,
}

/// Optional endpoint URL overrides, one per built-in provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EndpointConfig {
    /// Chat Completions URL for the `openai` provider.
    #[serde(default)]
    pub openai: Option<String>,

    /// Messages URL for the `anthropic` provider.
    #[serde(default)]
    pub anthropic: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_context_max_chars() -> usize {
    DEFAULT_CONTEXT_MAX_CHARS
}

fn default_preview_max_chars() -> usize {
    DEFAULT_PREVIEW_MAX_CHARS
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            context_max_chars: default_context_max_chars(),
            preview_max_chars: default_preview_max_chars(),
        }
    }
}

impl Config {
    /// Load configuration from file system.
    ///
    /// Priority order:
    /// 1. LECTERN_CONFIG environment variable
    /// 2. ./config.toml (local directory)
    /// 3. ~/.config/lectern/config.toml (user config)
    ///
    /// Returns default config if no config file found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if a found file cannot be read.
    /// Returns [`ConfigError::ParseError`] if a found file is not valid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("LECTERN_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                return Self::load_from(p);
            }
        }

        let local = PathBuf::from("config.toml");
        if local.exists() {
            return Self::load_from(local);
        }

        if let Some(dir) = config_dir() {
            let user_config = dir.join("config.toml");
            if user_config.exists() {
                return Self::load_from(user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read.
    /// Returns [`ConfigError::ParseError`] if the file is not valid TOML.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the credential for a provider.
    ///
    /// Priority: environment variable > `api_key`. Empty values count as
    /// absent. Providers without a known variable only use `api_key`.
    ///
    /// # Environment Variables
    ///
    /// - `OPENAI_API_KEY` for "openai"
    /// - `ANTHROPIC_API_KEY` for "anthropic"
    pub fn credential_for(&self, provider: &str) -> Option<String> {
        if let Some(var) = api_key_env_var(provider)
            && let Ok(key) = std::env::var(var)
            && !key.is_empty()
        {
            return Some(key);
        }

        self.api_key.clone().filter(|key| !key.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            model: default_model(),
            chat: ChatConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

/// Environment variable holding the API key for a built-in provider.
pub fn api_key_env_var(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// User configuration directory (`~/.config/lectern`).
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/lectern"))
}
