use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;
use url::Url;

use crate::translation::prompts::PromptTemplate;
use crate::validation::ValidationConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and defaulting configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language name, only used in prompts
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language as given by the user (code, tag or name)
    #[serde(default)]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Candidate validation config
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Document processing config
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Full chat completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key, sent as a bearer token when set
    #[serde(default)]
    pub api_key: String,

    /// System prompt template; no system message is sent when empty
    /// Placeholders: {source_language}, {target_language}
    #[serde(default)]
    pub system_prompt: String,

    /// User prompt template
    /// Placeholders: {source_language}, {target_language}, {text}
    #[serde(default = "default_user_prompt")]
    pub user_prompt: String,

    /// Temperature parameter for text generation
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts made for one unit, in order
    #[serde(default = "default_attempts")]
    pub attempts: Vec<AttemptPolicy>,
}

/// Settings for one attempt of the retry ladder
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl AttemptPolicy {
    /// Create an attempt policy
    pub fn new(max_tokens: u32) -> Self {
        Self { max_tokens }
    }
}

/// Configuration for document processing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProcessingConfig {
    /// Retranslate units whose target merely repeats the source
    #[serde(default = "default_true")]
    pub translate_if_target_same_as_source: bool,

    /// Reuse translations of identical source text within a run
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Count units in every file before starting, for an overall progress total
    #[serde(default = "default_true")]
    pub precount_units: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            translate_if_target_same_as_source: true,
            use_cache: true,
            precount_units: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` crate
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_endpoint() -> String {
    "http://127.0.0.1:1234/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "Unbabel/TowerInstruct-7B-v0.2".to_string()
}

fn default_user_prompt() -> String {
    PromptTemplate::DEFAULT_USER_PROMPT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_attempts() -> Vec<AttemptPolicy> {
    vec![AttemptPolicy::new(256), AttemptPolicy::new(64)]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, or the defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language is required"));
        }

        let endpoint = Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", self.translation.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Endpoint must use http or https: {}",
                self.translation.endpoint
            ));
        }

        if self.translation.attempts.is_empty() {
            return Err(anyhow!("At least one translation attempt must be configured"));
        }

        if let Some(index) = self
            .translation
            .attempts
            .iter()
            .position(|attempt| attempt.max_tokens == 0)
        {
            return Err(anyhow!("Attempt {} has max_tokens set to 0", index + 1));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: String::new(),
            translation: TranslationConfig::default(),
            validation: ValidationConfig::default(),
            processing: ProcessingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            system_prompt: String::new(),
            user_prompt: default_user_prompt(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            attempts: default_attempts(),
        }
    }
}
