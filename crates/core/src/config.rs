//! Configuration management for the helpdesk assistant.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.helpdesk/config.yaml` in the workspace)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: the FAQ catalog, response
//! templates and transcripts live under `.helpdesk/` by default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Embedding providers the assistant knows how to construct.
pub const EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Sentiment providers the assistant knows how to construct.
pub const SENTIMENT_PROVIDERS: [&str; 2] = ["lexicon", "ollama"];

/// Polarity below which a query is escalated to a human agent.
pub const DEFAULT_ESCALATION_THRESHOLD: f32 = -0.2;

/// Time budget for a single embedding or sentiment provider call.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .helpdesk/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// FAQ source (file or directory); defaults to `.helpdesk/faq.json`
    pub catalog: Option<PathBuf>,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Sentiment provider and escalation settings
    pub sentiment: SentimentSettings,

    /// Response policy settings
    pub policy: PolicySettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Base URL for HTTP providers
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Sentiment provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SentimentSettings {
    /// Provider name: "lexicon" or "ollama"
    pub provider: String,

    /// Model identifier for LLM-backed providers
    pub model: Option<String>,

    /// Base URL for HTTP providers
    pub endpoint: Option<String>,

    /// Polarity strictly below this value escalates the query
    pub escalation_threshold: f32,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            provider: "lexicon".to_string(),
            model: None,
            endpoint: None,
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
        }
    }
}

/// Response policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicySettings {
    /// Squared-L2 distance above which the nearest phrase is not trusted.
    /// `None` keeps the always-answer behaviour.
    pub max_distance: Option<f32>,

    /// Timeout for each provider call, in milliseconds
    pub provider_timeout_ms: u64,

    /// Prefix answers with an acknowledgment phrase
    pub acknowledgments: bool,

    /// Optional response template file
    pub templates: Option<PathBuf>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            max_distance: None,
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            acknowledgments: true,
            templates: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    catalog: Option<PathBuf>,
    embedding: Option<EmbeddingSettings>,
    sentiment: Option<SentimentSettings>,
    policy: Option<PolicySettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            catalog: None,
            embedding: EmbeddingSettings::default(),
            sentiment: SentimentSettings::default(),
            policy: PolicySettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `HELPDESK_WORKSPACE`: Override workspace path
    /// - `HELPDESK_CONFIG`: Path to config file
    /// - `HELPDESK_CATALOG`: FAQ source file or directory
    /// - `HELPDESK_EMBEDDING_PROVIDER`: Embedding provider
    /// - `HELPDESK_SENTIMENT_PROVIDER`: Sentiment provider
    /// - `OLLAMA_URL`: Endpoint for Ollama-backed providers
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use helpdesk_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Catalog: {:?}", config.catalog_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration for an explicit workspace and/or config file.
    ///
    /// Explicit arguments take precedence over `HELPDESK_WORKSPACE` and
    /// `HELPDESK_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("HELPDESK_WORKSPACE")) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("HELPDESK_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.helpdesk_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(catalog) = env_path("HELPDESK_CATALOG") {
            config.catalog = Some(catalog);
        }

        if let Ok(provider) = std::env::var("HELPDESK_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        if let Ok(provider) = std::env::var("HELPDESK_SENTIMENT_PROVIDER") {
            config.sentiment.provider = provider;
        }

        if let Ok(endpoint) = std::env::var("OLLAMA_URL") {
            config.embedding.endpoint = Some(endpoint.clone());
            config.sentiment.endpoint = Some(endpoint);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| {
                AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        let mut result = self.clone();

        if let Some(catalog) = config_file.catalog {
            result.catalog = Some(catalog);
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(sentiment) = config_file.sentiment {
            result.sentiment = sentiment;
        }

        if let Some(policy) = config_file.policy {
            result.policy = policy;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the config file and
    /// environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        catalog: Option<PathBuf>,
        embedding_provider: Option<String>,
        sentiment_provider: Option<String>,
        max_distance: Option<f32>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(catalog) = catalog {
            self.catalog = Some(catalog);
        }

        if let Some(provider) = embedding_provider {
            self.embedding.provider = provider;
        }

        if let Some(provider) = sentiment_provider {
            self.sentiment.provider = provider;
        }

        if let Some(max_distance) = max_distance {
            self.policy.max_distance = Some(max_distance);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .helpdesk directory.
    pub fn helpdesk_dir(&self) -> PathBuf {
        self.workspace.join(".helpdesk")
    }

    /// Resolved FAQ source path.
    ///
    /// Relative paths are taken relative to the workspace.
    pub fn catalog_path(&self) -> PathBuf {
        match &self.catalog {
            Some(path) => self.resolve(path),
            None => self.helpdesk_dir().join("faq.json"),
        }
    }

    /// Resolved response template path, if one is configured.
    pub fn templates_path(&self) -> Option<PathBuf> {
        self.policy.templates.as_ref().map(|path| self.resolve(path))
    }

    /// Time budget for one provider call.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.policy.provider_timeout_ms)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate provider names and numeric settings.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.as_str();
        if !EMBEDDING_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let provider = self.sentiment.provider.as_str();
        if !SENTIMENT_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown sentiment provider: {}. Supported: {}",
                provider,
                SENTIMENT_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        let threshold = self.sentiment.escalation_threshold;
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(AppError::Config(format!(
                "Escalation threshold must lie in [-1, 1], got {}",
                threshold
            )));
        }

        if let Some(max_distance) = self.policy.max_distance {
            if !max_distance.is_finite() || max_distance < 0.0 {
                return Err(AppError::Config(format!(
                    "maxDistance must be a finite, non-negative number, got {}",
                    max_distance
                )));
            }
        }

        if self.policy.provider_timeout_ms == 0 {
            return Err(AppError::Config(
                "providerTimeoutMs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}
