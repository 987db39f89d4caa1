//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendwise - Expense-aware financial advice prompts
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Retrieval-augmented expense assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge base TOML file (defaults to the built-in advice set)
    #[arg(long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the advice most relevant to a question
    Retrieve {
        /// Question or search text
        query: String,

        /// Number of documents to return (defaults to retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the advice for one category
    Advice {
        /// Category name (Food, Transport, Bills, Shopping, General, Savings, Budget)
        category: String,
    },

    /// Summarize an expense CSV (Date,Category,Amount,Description)
    Summary {
        /// Expense CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the answer prompt for a question
    Ask {
        /// Question to answer
        query: String,

        /// Expense CSV providing context
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output the prompt, system text and sources as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a whole-dataset analysis request, or read back a reply
    Analyze {
        /// Expense CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Generator reply to parse instead of printing the request
        #[arg(long)]
        reply: Option<PathBuf>,
    },

    /// List the knowledge base documents
    Knowledge,

    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (rag_answer, expense_analysis)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
