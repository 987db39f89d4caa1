//! Error types for Spendwise

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The vectorizer was asked to fit a corpus with no documents
    #[error("Cannot fit a term-weight model on an empty corpus")]
    EmptyCorpus,

    #[error("Invalid top_k: {0} (must be at least 1)")]
    InvalidTopK(usize),

    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
