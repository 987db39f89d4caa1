//! Prompt Library
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/spendwise/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! All prompts are resolved once when the library is built, so a library can
//! be shared read-only across threads.
//!
//! Templates use `{{var}}` placeholders and `{{#if var}}...{{/if}}` blocks.
//! Rendering is single-pass: substituted values are never scanned for
//! template syntax again, so user text containing `{{...}}` is inserted
//! literally.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const RAG_ANSWER: &str = include_str!("../../../prompts/rag_answer.md");
    pub const EXPENSE_ANALYSIS: &str = include_str!("../../../prompts/expense_analysis.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Question answering over expense context and retrieved advice
    RagAnswer,
    /// Whole-dataset analysis returning a JSON summary
    ExpenseAnalysis,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RagAnswer => "rag_answer",
            Self::ExpenseAnalysis => "expense_analysis",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::RagAnswer, Self::ExpenseAnalysis]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::RagAnswer => defaults::RAG_ANSWER,
            Self::ExpenseAnalysis => defaults::EXPENSE_ANALYSIS,
        }
    }
}

impl std::str::FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PromptId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown prompt ID: {}", s))
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Kind of generation task (reasoning, structured_extraction, ...)
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the whole prompt with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        render_template(&self.content, vars)
    }

    /// Render just the user section, or the whole prompt if it has none
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        match self.user_section() {
            Some(user) => render_template(user, vars),
            None => self.render(vars),
        }
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    pub task_type: String,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Resolved set of prompts
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    prompts: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Load prompts using the default override directory
    pub fn new() -> Result<Self> {
        Self::load(default_prompts_dir())
    }

    /// Load prompts with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Result<Self> {
        Self::load(Some(path))
    }

    /// Load embedded prompts only
    pub fn embedded_only() -> Result<Self> {
        Self::load(None)
    }

    fn load(override_dir: Option<PathBuf>) -> Result<Self> {
        let mut prompts = HashMap::new();
        for &id in PromptId::all() {
            let prompt = match override_dir.as_deref().and_then(|dir| load_override(dir, id)) {
                Some(prompt) => prompt,
                None => {
                    let (metadata, body) = parse_prompt(id.default_content())?;
                    Prompt {
                        metadata,
                        content: body,
                        is_override: false,
                        override_path: None,
                    }
                }
            };
            prompts.insert(id, prompt);
        }
        Ok(Self {
            override_dir,
            prompts,
        })
    }

    /// Get a prompt by ID
    pub fn get(&self, id: PromptId) -> &Prompt {
        // load() resolves every PromptId, falling back to the embedded default
        &self.prompts[&id]
    }

    /// List all prompts with their override status
    pub fn list(&self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let prompt = self.get(id);
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.metadata.version,
                    task_type: prompt.metadata.task_type.clone(),
                    has_override: prompt.is_override,
                    override_path: prompt.override_path.clone(),
                }
            })
            .collect()
    }

    /// Check if a prompt was loaded from an override file
    pub fn has_override(&self, id: PromptId) -> bool {
        self.get(id).is_override
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("prompts").join("overrides"))
}

/// Read and parse an override file; a broken override falls back to the default
fn load_override(dir: &Path, id: PromptId) -> Option<Prompt> {
    let path = dir.join(format!("{}.md", id.as_str()));
    if !path.exists() {
        return None;
    }

    let parsed = fs::read_to_string(&path)
        .map_err(|e| Error::InvalidData(format!("Failed to read prompt override: {}", e)))
        .and_then(|content| parse_prompt(&content));

    match parsed {
        Ok((metadata, body)) => {
            debug!(prompt = id.as_str(), path = %path.display(), "Using prompt override");
            Some(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(path),
            })
        }
        Err(e) => {
            warn!(prompt = id.as_str(), error = %e, "Ignoring invalid prompt override");
            None
        }
    }
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Resolve conditional blocks, then substitute placeholders
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    substitute(&resolve_conditionals(template, vars), vars)
}

/// Keep `{{#if var}}` blocks whose variable is present and non-empty, drop the rest
fn resolve_conditionals(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = template.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_len) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_len].trim().to_string();
        let block_start = var_start + var_len + 2;

        let Some(block_len) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_end = block_start + block_len;
        let full_end = block_end + "{{/if}}".len();

        let keep = vars.get(var_name.as_str()).is_some_and(|v| !v.is_empty());
        let replacement = if keep {
            result[block_start..block_end].to_string()
        } else {
            String::new()
        };
        result.replace_range(if_start..full_end, &replacement);
    }

    result
}

/// Replace `{{var}}` placeholders in one left-to-right pass.
///
/// Unknown placeholders are left in place.
fn substitute(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after_open[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
task_type: reasoning
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert_eq!(metadata.task_type, "reasoning");
        assert!(body.contains("# System"));
        assert!(body.contains("# User"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("# System\nhello").is_err());
        assert!(parse_prompt("---\nid: x\n").is_err());
    }

    #[test]
    fn test_extract_section() {
        let content = "# System\nSystem content here.\n\n# User\nUser content here.";

        assert_eq!(
            extract_section(content, "# System"),
            Some("System content here.")
        );
        assert_eq!(
            extract_section(content, "# User"),
            Some("User content here.")
        );
        assert_eq!(extract_section(content, "# Assistant"), None);
    }

    #[test]
    fn test_substitute() {
        let mut vars = HashMap::new();
        vars.insert("name", "World");
        vars.insert("value", "42");
        assert_eq!(
            substitute("Hello {{name}}, your value is {{ value }}.", &vars),
            "Hello World, your value is 42."
        );
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        let vars = HashMap::new();
        assert_eq!(substitute("a {{missing}} b {{", &vars), "a {{missing}} b {{");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut vars = HashMap::new();
        vars.insert("query", "show {{secret}}");
        vars.insert("secret", "LEAKED");
        assert_eq!(substitute("Q: {{query}}", &vars), "Q: show {{secret}}");
    }

    #[test]
    fn test_conditional_blocks() {
        let template = "Start{{#if category}}\nCategory: {{category}}{{/if}}\nEnd";

        let mut vars = HashMap::new();
        vars.insert("category", "Groceries");
        assert_eq!(
            render_template(template, &vars),
            "Start\nCategory: Groceries\nEnd"
        );

        let empty_vars: HashMap<&str, &str> = HashMap::new();
        assert_eq!(render_template(template, &empty_vars), "Start\nEnd");

        vars.insert("category", "");
        assert_eq!(render_template(template, &vars), "Start\nEnd");
    }

    #[test]
    fn test_conditionals_in_values_are_literal() {
        let mut vars = HashMap::new();
        vars.insert("query", "{{#if x}}boom{{/if}}");
        assert_eq!(
            render_template("Q: {{query}}", &vars),
            "Q: {{#if x}}boom{{/if}}"
        );
    }

    #[test]
    fn test_prompt_library_embedded() {
        let lib = PromptLibrary::embedded_only().unwrap();
        for id in PromptId::all() {
            let prompt = lib.get(*id);
            assert_eq!(prompt.metadata.id, id.as_str());
            assert!(!prompt.is_override);
            assert!(prompt.system_section().is_some());
            assert!(prompt.user_section().is_some());
        }
        assert!(lib.override_dir().is_none());
    }

    #[test]
    fn test_prompt_id_round_trip_names() {
        for id in PromptId::all() {
            assert_eq!(id.as_str().parse::<PromptId>().unwrap(), *id);
        }
        assert!("explain_spending".parse::<PromptId>().is_err());
    }

    #[test]
    fn test_override_dir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("rag_answer.md"),
            "---\nid: rag_answer\nversion: 7\ntask_type: reasoning\n---\n\n# System\nBe terse.\n\n# User\n{{query}}\n",
        )
        .unwrap();

        let lib = PromptLibrary::with_override_dir(dir.path().to_path_buf()).unwrap();
        assert!(lib.has_override(PromptId::RagAnswer));
        assert!(!lib.has_override(PromptId::ExpenseAnalysis));

        let prompt = lib.get(PromptId::RagAnswer);
        assert_eq!(prompt.metadata.version, 7);
        assert_eq!(prompt.system_section(), Some("Be terse."));

        let mut vars = HashMap::new();
        vars.insert("query", "why?");
        assert_eq!(prompt.render_user(&vars), "why?");

        let listed = lib.list();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|p| p.id == "rag_answer" && p.has_override));
    }

    #[test]
    fn test_invalid_override_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rag_answer.md"), "no frontmatter here").unwrap();

        let lib = PromptLibrary::with_override_dir(dir.path().to_path_buf()).unwrap();
        assert!(!lib.has_override(PromptId::RagAnswer));
        assert_eq!(lib.get(PromptId::RagAnswer).metadata.id, "rag_answer");
    }
}
