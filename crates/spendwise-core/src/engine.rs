//! Retrieval-augmented prompt engine
//!
//! [`RagEngine`] is built once at startup: it fits the vectorizer over the
//! knowledge base and keeps the corpus vectors. After construction nothing in
//! it changes, so a single `Arc<RagEngine>` can be shared by every caller.
//!
//! [`Assistant`] pairs a shared engine with the running expense history.

use std::sync::Arc;

use tracing::{debug, info};

use crate::composer::{ComposedPrompt, PromptComposer};
use crate::config::Config;
use crate::context::ContextBuilder;
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::ledger::HistoryLedger;
use crate::models::{ExpenseRecord, RetrievalResult, ScoredDocument};
use crate::prompts::PromptLibrary;
use crate::ranker::rank;
use crate::vectorizer::{FittedVectorizer, Vectorizer};

/// Immutable retrieval and prompt-building state
#[derive(Debug)]
pub struct RagEngine {
    knowledge: KnowledgeBase,
    vectorizer: FittedVectorizer,
    prompts: PromptLibrary,
    context: ContextBuilder,
    config: Config,
}

impl RagEngine {
    /// Build an engine, resolving prompts from the configured override dir
    pub fn new(knowledge: KnowledgeBase, config: Config) -> Result<Self> {
        let prompts = config.prompt_library()?;
        Self::with_prompts(knowledge, config, prompts)
    }

    /// Build an engine with an already-resolved prompt library
    pub fn with_prompts(
        knowledge: KnowledgeBase,
        config: Config,
        prompts: PromptLibrary,
    ) -> Result<Self> {
        let texts: Vec<&str> = knowledge
            .documents()
            .iter()
            .map(|d| d.text.as_str())
            .collect();
        let vectorizer = Vectorizer::new(&config.vectorizer)?.fit(&texts)?;
        let context = ContextBuilder::new(
            config.context.top_categories,
            config.context.currency.clone(),
        );

        info!(
            documents = knowledge.len(),
            vocabulary = vectorizer.vocabulary_len(),
            "Knowledge base indexed"
        );

        Ok(Self {
            knowledge,
            vectorizer,
            prompts,
            context,
            config,
        })
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn vectorizer(&self) -> &FittedVectorizer {
        &self.vectorizer
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub fn context_builder(&self) -> &ContextBuilder {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The `top_k` documents most similar to `query`, best first.
    ///
    /// A query with no known terms scores every document zero and returns
    /// the first `top_k` documents in knowledge base order.
    pub fn retrieve_relevant_knowledge(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalResult<'_>> {
        let query_vector = self.vectorizer.transform(query);
        let ranked = rank(&query_vector, self.vectorizer.corpus_vectors(), top_k)?;

        debug!(
            query_terms = query_vector.nnz(),
            top_k,
            best = ranked.first().map(|r| r.score).unwrap_or(0.0),
            "Retrieved knowledge"
        );

        // Corpus vectors were built from the documents in order, so every
        // ranked index is a valid document index
        let documents = self.knowledge.documents();
        Ok(ranked
            .into_iter()
            .map(|r| ScoredDocument {
                document: &documents[r.index],
                score: r.score,
            })
            .collect())
    }

    /// Retrieve with the configured default `top_k`
    pub fn retrieve_default(&self, query: &str) -> Result<RetrievalResult<'_>> {
        self.retrieve_relevant_knowledge(query, self.config.retrieval.top_k)
    }

    pub fn build_context_from_expenses(&self, records: &[ExpenseRecord]) -> String {
        self.context.build(records)
    }

    /// Retrieve advice for `query` and compose the full answer prompt
    pub fn compose_prompt(&self, query: &str, expense_context: &str) -> Result<ComposedPrompt<'_>> {
        let retrieval =
            self.retrieve_relevant_knowledge(query, self.config.retrieval.prompt_top_k)?;
        Ok(self.composer().compose(query, expense_context, retrieval))
    }

    /// The composed answer prompt as plain text
    pub fn generate_rag_enhanced_prompt(&self, query: &str, expense_context: &str) -> Result<String> {
        Ok(self.compose_prompt(query, expense_context)?.text)
    }

    pub fn get_category_specific_advice(&self, category: &str) -> Vec<String> {
        self.composer().category_specific_advice(category)
    }

    fn composer(&self) -> PromptComposer<'_> {
        PromptComposer::new(&self.knowledge, &self.prompts, &self.config.composer)
    }
}

/// A shared engine plus this session's expense history
#[derive(Debug)]
pub struct Assistant {
    engine: Arc<RagEngine>,
    ledger: HistoryLedger,
}

impl Assistant {
    pub fn new(engine: Arc<RagEngine>) -> Self {
        Self {
            engine,
            ledger: HistoryLedger::new(),
        }
    }

    pub fn engine(&self) -> &Arc<RagEngine> {
        &self.engine
    }

    pub fn retrieve_relevant_knowledge(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalResult<'_>> {
        self.engine.retrieve_relevant_knowledge(query, top_k)
    }

    pub fn build_context_from_expenses(&self, records: &[ExpenseRecord]) -> String {
        self.engine.build_context_from_expenses(records)
    }

    pub fn generate_rag_enhanced_prompt(&self, query: &str, expense_context: &str) -> Result<String> {
        self.engine.generate_rag_enhanced_prompt(query, expense_context)
    }

    pub fn get_category_specific_advice(&self, category: &str) -> Vec<String> {
        self.engine.get_category_specific_advice(category)
    }

    /// Validate and add an expense to the history
    pub fn record_expense(&self, record: ExpenseRecord) -> Result<()> {
        self.ledger.append(record)
    }

    pub fn history(&self) -> Vec<ExpenseRecord> {
        self.ledger.all()
    }

    /// Expense context over everything recorded so far
    pub fn build_context_from_history(&self) -> String {
        self.engine.build_context_from_expenses(&self.ledger.all())
    }
}
