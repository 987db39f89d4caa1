//! Spendwise Core Library
//!
//! Retrieval-augmented prompt building for the Spendwise expense assistant:
//! - Financial advice knowledge base with category lookup
//! - TF-IDF vectorizer and cosine similarity ranking
//! - Expense context summaries for LLM prompts
//! - Prompt library and composer for answer prompts
//! - Append-only expense history shared across threads
//! - CSV import and whole-dataset analysis requests

pub mod analysis;
pub mod composer;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod import;
pub mod knowledge;
pub mod ledger;
pub mod models;
pub mod prompts;
pub mod ranker;
pub mod vectorizer;

pub use analysis::{build_analysis_request, parse_analysis_reply, AnalysisReport, AnalysisRequest};
pub use composer::{ComposedPrompt, ComposerOptions, PromptComposer};
pub use config::Config;
pub use context::{CategoryTotal, ContextBuilder, ExpenseSummary, NO_EXPENSE_DATA};
pub use engine::{Assistant, RagEngine};
pub use error::{Error, Result};
pub use import::parse_expenses_csv;
pub use knowledge::KnowledgeBase;
pub use ledger::HistoryLedger;
pub use models::{
    Category, Document, ExpenseCategory, ExpenseRecord, RetrievalResult, ScoredDocument,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use ranker::{cosine_similarity, rank, Ranked};
pub use vectorizer::{FittedVectorizer, TermVector, Vectorizer, VectorizerOptions};
