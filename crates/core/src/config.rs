//! Configuration management for paperchat.
//!
//! This module handles loading and merging configuration from multiple
//! sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (`paperchat.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The config names the two external services the workflow consumes: the
//! generation (completion) service and the vector search index.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default request timeout for both external services, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation service provider ("ollama" or "openai")
    pub provider: String,

    /// Generation service endpoint override
    pub llm_endpoint: Option<String>,

    /// Completion model identifier
    pub model: String,

    /// API key for providers that require one
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Vector search index endpoint
    pub index_endpoint: String,

    /// Collection name in the vector index
    pub collection: String,

    /// Request timeout for external services, in seconds
    pub timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            llm_endpoint: None,
            model: "llama3.2".to_string(),
            api_key: None,
            api_key_env: None,
            index_endpoint: "http://localhost:8000".to_string(),
            collection: "arxiv_papers".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

/// Config file structure (`paperchat.yaml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    index: Option<IndexSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IndexSection {
    endpoint: Option<String>,
    collection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `PAPERCHAT_CONFIG`: Path to config file
    /// - `PAPERCHAT_PROVIDER`: Generation service provider
    /// - `PAPERCHAT_ENDPOINT`: Generation service endpoint
    /// - `PAPERCHAT_MODEL`: Completion model identifier
    /// - `PAPERCHAT_API_KEY`: API key
    /// - `PAPERCHAT_INDEX_URL`: Vector index endpoint
    /// - `PAPERCHAT_COLLECTION`: Vector index collection name
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an explicit config file path, which takes
    /// precedence over `PAPERCHAT_CONFIG`.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        config.config_file = config_file;
        if config.config_file.is_none() {
            if let Ok(path) = std::env::var("PAPERCHAT_CONFIG") {
                config.config_file = Some(PathBuf::from(path));
            }
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("paperchat.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(provider) = std::env::var("PAPERCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(endpoint) = std::env::var("PAPERCHAT_ENDPOINT") {
            config.llm_endpoint = Some(endpoint);
        }

        if let Ok(model) = std::env::var("PAPERCHAT_MODEL") {
            config.model = model;
        }

        if let Ok(index_url) = std::env::var("PAPERCHAT_INDEX_URL") {
            config.index_endpoint = index_url;
        }

        if let Ok(collection) = std::env::var("PAPERCHAT_COLLECTION") {
            config.collection = collection;
        }

        if let Ok(api_key) = std::env::var("PAPERCHAT_API_KEY") {
            config.api_key = Some(api_key);
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(endpoint) = llm.endpoint {
                result.llm_endpoint = Some(endpoint);
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(api_key_env) = llm.api_key_env {
                result.api_key_env = Some(api_key_env);
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                result.timeout_secs = timeout_secs;
            }
        }

        if let Some(index) = config_file.index {
            if let Some(endpoint) = index.endpoint {
                result.index_endpoint = endpoint;
            }
            if let Some(collection) = index.collection {
                result.collection = collection;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides, which take precedence over every other source.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the API key for the configured provider.
    ///
    /// Precedence: explicit `api_key` (from `PAPERCHAT_API_KEY`), then the
    /// environment variable named by `apiKeyEnv` in the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        if self.api_key.is_some() {
            return self.api_key.clone();
        }

        self.api_key_env
            .as_ref()
            .and_then(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.collection, "arxiv_papers");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_file_parsing() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  apiKeyEnv: OPENAI_API_KEY
index:
  endpoint: http://search.internal:8000
  collection: arxiv_papers
logging:
  level: debug
  color: false
"#;

        let parsed: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let llm = parsed.llm.unwrap();
        assert_eq!(llm.provider.as_deref(), Some("openai"));
        assert_eq!(llm.api_key_env.as_deref(), Some("OPENAI_API_KEY"));

        let index = parsed.index.unwrap();
        assert_eq!(index.endpoint.as_deref(), Some("http://search.internal:8000"));

        let logging = parsed.logging.unwrap();
        assert_eq!(logging.color, Some(false));
    }

    #[test]
    fn test_cli_overrides() {
        let config = AppConfig::default().with_overrides(
            Some("openai".to_string()),
            Some("gpt-4o-mini".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.verbose);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }
}
