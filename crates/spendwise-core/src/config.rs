//! Configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/spendwise/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep their default value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::composer::ComposerOptions;
use crate::error::{Error, Result};
use crate::prompts::{default_prompts_dir, PromptLibrary};
use crate::vectorizer::VectorizerOptions;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/spendwise.toml");

/// Retrieval sizes
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Default number of documents for a retrieval
    pub top_k: usize,
    /// Number of documents retrieved when composing a prompt
    pub prompt_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            prompt_top_k: 2,
        }
    }
}

/// Expense context formatting
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub top_categories: usize,
    pub currency: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            top_categories: 3,
            currency: "PKR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub retrieval: RetrievalConfig,
    pub vectorizer: VectorizerOptions,
    pub context: ContextConfig,
    pub composer: ComposerOptions,
    /// Prompt override directory; `None` uses the data dir default
    pub prompt_override_dir: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit file, the data dir override, or the embedded default.
    ///
    /// An explicit path that doesn't exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => read_config(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => read_config(&default_path)?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };
        parse_config(&content)
    }

    /// Parse config from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Resolve prompts, preferring the configured override dir
    pub fn prompt_library(&self) -> Result<PromptLibrary> {
        match self.prompt_override_dir.clone().or_else(default_prompts_dir) {
            Some(dir) => PromptLibrary::with_override_dir(dir),
            None => PromptLibrary::embedded_only(),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Loading config");
    fs::read_to_string(path).map_err(|e| {
        Error::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
    })
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    retrieval: Option<RawRetrieval>,
    vectorizer: Option<RawVectorizer>,
    context: Option<RawContext>,
    prompt: Option<RawPrompt>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetrieval {
    top_k: Option<usize>,
    prompt_top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVectorizer {
    stop_words: Option<bool>,
    min_token_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContext {
    top_categories: Option<usize>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrompt {
    include_scores: Option<bool>,
    min_score: Option<f64>,
    override_dir: Option<PathBuf>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidConfig(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(retrieval) = raw.retrieval {
        if let Some(top_k) = retrieval.top_k {
            config.retrieval.top_k = top_k;
        }
        if let Some(prompt_top_k) = retrieval.prompt_top_k {
            config.retrieval.prompt_top_k = prompt_top_k;
        }
    }

    if let Some(vectorizer) = raw.vectorizer {
        if let Some(stop_words) = vectorizer.stop_words {
            config.vectorizer.stop_words = stop_words;
        }
        if let Some(min_token_len) = vectorizer.min_token_len {
            config.vectorizer.min_token_len = min_token_len;
        }
    }

    if let Some(context) = raw.context {
        if let Some(top_categories) = context.top_categories {
            config.context.top_categories = top_categories;
        }
        if let Some(currency) = context.currency {
            config.context.currency = currency;
        }
    }

    if let Some(prompt) = raw.prompt {
        if let Some(include_scores) = prompt.include_scores {
            config.composer.include_scores = include_scores;
        }
        if let Some(min_score) = prompt.min_score {
            config.composer.min_score = min_score;
        }
        config.prompt_override_dir = prompt.override_dir;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.retrieval.top_k == 0 {
        return Err(Error::InvalidConfig("retrieval.top_k must be >= 1".into()));
    }
    if config.retrieval.prompt_top_k == 0 {
        return Err(Error::InvalidConfig(
            "retrieval.prompt_top_k must be >= 1".into(),
        ));
    }
    if config.vectorizer.min_token_len == 0 {
        return Err(Error::InvalidConfig(
            "vectorizer.min_token_len must be >= 1".into(),
        ));
    }
    if config.context.currency.trim().is_empty() {
        return Err(Error::InvalidConfig("context.currency must not be empty".into()));
    }
    if !(0.0..=1.0).contains(&config.composer.min_score) {
        return Err(Error::InvalidConfig(
            "prompt.min_score must be in [0.0, 1.0]".into(),
        ));
    }
    Ok(())
}
