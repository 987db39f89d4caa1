//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the config file
//! - `open_engine` - Load the knowledge base and build the retrieval index
//! - `open_prompts` - Resolve the prompt library
//! - `read_expenses` - Import an expense CSV

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use spendwise_core::{parse_expenses_csv, Config, ExpenseRecord, KnowledgeBase, PromptLibrary, RagEngine};
use tracing::debug;

/// Load config from `--config`, the data dir override, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(Some(path))
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::load(None).context("Failed to load config"),
    }
}

/// Build the engine over `--knowledge`, or the built-in advice set
pub fn open_engine(knowledge: Option<&Path>, config: Config) -> Result<RagEngine> {
    let knowledge = match knowledge {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("Failed to load knowledge base {}", path.display()))?,
        None => KnowledgeBase::embedded().context("Failed to load built-in knowledge base")?,
    };
    RagEngine::new(knowledge, config).context("Failed to build knowledge index")
}

pub fn open_prompts(config: &Config) -> Result<PromptLibrary> {
    config.prompt_library().context("Failed to load prompts")
}

/// Read and validate an expense CSV
pub fn read_expenses(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let records = parse_expenses_csv(file)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "Loaded expenses");
    Ok(records)
}
