//! Expense command implementations (summary, ask, analyze)

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use spendwise_core::{
    build_analysis_request, parse_analysis_reply, Assistant, ExpenseSummary, RagEngine,
    NO_EXPENSE_DATA,
};

use super::read_expenses;

/// Print spending statistics for an expense file
pub fn cmd_summary(engine: &RagEngine, file: &Path, json: bool) -> Result<()> {
    let records = read_expenses(file)?;
    let builder = engine.context_builder();
    let summary = builder.summarize(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json(summary.as_ref())?)?);
        return Ok(());
    }

    let Some(summary) = summary else {
        println!("{}", NO_EXPENSE_DATA);
        return Ok(());
    };

    let currency = builder.currency();
    println!("📊 Expense Summary");
    println!("   ─────────────────────────────");
    println!("   Records:  {}", summary.count);
    println!("   Total:    {:.2} {}", summary.total, currency);
    println!("   Average:  {:.2} {}", summary.average, currency);
    println!();
    println!("   {:<16} {:>6}  {:>14}", "CATEGORY", "COUNT", "TOTAL");
    for category in &summary.by_category {
        println!(
            "   {:<16} {:>6}  {:>10.2} {}",
            category.category, category.count, category.total, currency
        );
    }
    println!();
    println!("{}", builder.render(&summary));

    Ok(())
}

/// JSON form of a summary; an empty file reports that no data is available
pub fn summary_json(summary: Option<&ExpenseSummary>) -> Result<serde_json::Value> {
    Ok(match summary {
        Some(summary) => serde_json::to_value(summary)?,
        None => json!({
            "count": 0,
            "message": NO_EXPENSE_DATA,
        }),
    })
}

/// Build the answer prompt for a question, optionally grounded in an expense file
pub fn cmd_ask(engine: RagEngine, query: &str, file: Option<&Path>, json: bool) -> Result<()> {
    let assistant = Assistant::new(Arc::new(engine));

    if let Some(file) = file {
        for record in read_expenses(file)? {
            assistant.record_expense(record)?;
        }
    }

    let context = assistant.build_context_from_history();
    let composed = assistant.engine().compose_prompt(query, &context)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&composed)?);
        return Ok(());
    }

    if let Some(system) = &composed.system {
        println!("--- System ---");
        println!("{}", system);
        println!();
    }
    println!("--- Prompt ---");
    println!("{}", composed.text);

    Ok(())
}

/// Print the analysis request as chat messages, or parse a saved reply
pub fn cmd_analyze(engine: &RagEngine, file: &Path, reply: Option<&Path>) -> Result<()> {
    let records = read_expenses(file)?;

    if let Some(reply) = reply {
        let text = fs::read_to_string(reply)
            .with_context(|| format!("Failed to read reply {}", reply.display()))?;
        let report = parse_analysis_reply(&text);

        println!("📊 Expense Summary");
        println!("{}", non_empty(&report.summary, "No summary generated."));
        println!();
        println!("💡 Recommendations");
        println!(
            "{}",
            non_empty(&report.recommendations, "No recommendations generated.")
        );
        return Ok(());
    }

    let request = build_analysis_request(&records, engine.prompts(), engine.context_builder())?;
    let messages = json!({
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ]
    });
    println!("{}", serde_json::to_string_pretty(&messages)?);

    Ok(())
}

fn non_empty<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}
