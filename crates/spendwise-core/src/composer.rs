//! Prompt Composer
//!
//! Merges the expense context, the retrieved advice and the user's question
//! into the `rag_answer` prompt, and answers direct category advice lookups.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::knowledge::KnowledgeBase;
use crate::models::{Category, RetrievalResult};
use crate::prompts::{PromptId, PromptLibrary};

/// Options controlling how retrieved advice is listed
#[derive(Debug, Clone)]
pub struct ComposerOptions {
    /// Append each document's similarity score to its line
    pub include_scores: bool,
    /// Retrieved documents scoring below this are left out of the prompt.
    /// Documents with a zero score are always left out.
    pub min_score: f64,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            include_scores: false,
            min_score: 0.0,
        }
    }
}

/// A generation-ready prompt and the advice it cites
#[derive(Debug, Clone, Serialize)]
pub struct ComposedPrompt<'a> {
    /// System instructions for the generator, if the template has them
    pub system: Option<String>,
    /// The composed user prompt
    pub text: String,
    /// Documents listed in the prompt, in ranked order
    pub sources: RetrievalResult<'a>,
}

/// Composes prompts from borrowed engine state
pub struct PromptComposer<'a> {
    knowledge: &'a KnowledgeBase,
    prompts: &'a PromptLibrary,
    options: &'a ComposerOptions,
}

impl<'a> PromptComposer<'a> {
    pub fn new(
        knowledge: &'a KnowledgeBase,
        prompts: &'a PromptLibrary,
        options: &'a ComposerOptions,
    ) -> Self {
        Self {
            knowledge,
            prompts,
            options,
        }
    }

    /// Build the prompt for `query`.
    ///
    /// Only documents that share at least one term with the query (score
    /// above zero) and clear `min_score` are listed. The advice section is
    /// omitted entirely when none do.
    pub fn compose<'r>(
        &self,
        query: &str,
        expense_context: &str,
        retrieval: RetrievalResult<'r>,
    ) -> ComposedPrompt<'r> {
        let sources: RetrievalResult<'r> = retrieval
            .into_iter()
            .filter(|s| s.score > 0.0 && s.score >= self.options.min_score)
            .collect();
        let knowledge = self.format_knowledge(&sources);

        let mut vars: HashMap<&str, &str> = HashMap::new();
        vars.insert("expense_context", expense_context);
        vars.insert("retrieved_knowledge", &knowledge);
        vars.insert("query", query);

        let prompt = self.prompts.get(PromptId::RagAnswer);
        debug!(
            sources = sources.len(),
            prompt_version = prompt.metadata.version,
            "Composed RAG prompt"
        );

        ComposedPrompt {
            system: prompt.system_section().map(str::to_string),
            text: prompt.render_user(&vars),
            sources,
        }
    }

    /// Numbered `[Category] text` lines, one per document
    pub fn format_knowledge(&self, sources: &RetrievalResult<'_>) -> String {
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if self.options.include_scores {
                    format!(
                        "{}. [{}] (score {:.2}) {}",
                        i + 1,
                        s.document.category,
                        s.score,
                        s.document.text
                    )
                } else {
                    format!("{}. [{}] {}", i + 1, s.document.category, s.document.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Advice texts for a category label, in knowledge base order.
    ///
    /// Labels that are not advice categories (free-form expense categories)
    /// return an empty list.
    pub fn category_specific_advice(&self, category: &str) -> Vec<String> {
        match category.parse::<Category>() {
            Ok(category) => self
                .knowledge
                .advice_for(category)
                .into_iter()
                .map(|doc| doc.text.clone())
                .collect(),
            Err(_) => {
                debug!(category, "No advice category for label");
                Vec::new()
            }
        }
    }
}
