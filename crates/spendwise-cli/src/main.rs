//! Spendwise CLI - Expense-aware financial advice prompts
//!
//! Usage:
//!   spendwise retrieve "how do I save on food?"   Find relevant advice
//!   spendwise summary --file expenses.csv        Summarize expenses
//!   spendwise ask "..." --file expenses.csv      Build the answer prompt
//!   spendwise analyze --file expenses.csv        Build an analysis request

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let knowledge = cli.knowledge.as_deref();

    match cli.command {
        Commands::Retrieve { query, top_k, json } => {
            let engine = commands::open_engine(knowledge, config)?;
            commands::cmd_retrieve(&engine, &query, top_k, json)
        }
        Commands::Advice { category } => {
            let engine = commands::open_engine(knowledge, config)?;
            commands::cmd_advice(&engine, &category)
        }
        Commands::Summary { file, json } => {
            let engine = commands::open_engine(knowledge, config)?;
            commands::cmd_summary(&engine, &file, json)
        }
        Commands::Ask { query, file, json } => {
            let engine = commands::open_engine(knowledge, config)?;
            commands::cmd_ask(engine, &query, file.as_deref(), json)
        }
        Commands::Analyze { file, reply } => {
            let engine = commands::open_engine(knowledge, config)?;
            commands::cmd_analyze(&engine, &file, reply.as_deref())
        }
        Commands::Knowledge => {
            let engine = commands::open_engine(knowledge, config)?;
            commands::cmd_knowledge(&engine)
        }
        Commands::Prompts { action } => {
            let library = commands::open_prompts(&config)?;
            match action {
                None | Some(PromptsAction::List) => commands::cmd_prompts_list(&library),
                Some(PromptsAction::Show { prompt_id }) => {
                    commands::cmd_prompts_show(&library, &prompt_id)
                }
                Some(PromptsAction::Path) => commands::cmd_prompts_path(&library),
            }
        }
    }
}
