//! Retrieval command implementations

use anyhow::Result;
use spendwise_core::{Category, RagEngine};

use super::truncate;

/// Rank the knowledge base against a query
pub fn cmd_retrieve(engine: &RagEngine, query: &str, top_k: Option<usize>, json: bool) -> Result<()> {
    let top_k = top_k.unwrap_or(engine.config().retrieval.top_k);
    let results = engine.retrieve_relevant_knowledge(query, top_k)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("🔎 Top {} matches for \"{}\"", results.len(), query);
    println!();
    println!("{:>4}  {:<10}  {:>6}  TEXT", "#", "CATEGORY", "SCORE");
    println!("{}", "-".repeat(80));
    for (i, scored) in results.iter().enumerate() {
        println!(
            "{:>4}  {:<10}  {:>6.3}  {}",
            i + 1,
            scored.document.category,
            scored.score,
            truncate(&scored.document.text, 52)
        );
    }

    if results.iter().all(|s| s.score == 0.0) {
        println!();
        println!("No advice shares words with this question; showing documents in order.");
    }

    Ok(())
}

/// Print every advice passage for a category
pub fn cmd_advice(engine: &RagEngine, category: &str) -> Result<()> {
    let mut advice = engine.get_category_specific_advice(category);

    // Custom knowledge bases may not cover every category
    if advice.is_empty() {
        if let Ok(known) = category.parse::<Category>() {
            advice = engine
                .knowledge()
                .advice_or_general(known)
                .into_iter()
                .map(|doc| doc.text.clone())
                .collect();
            if !advice.is_empty() {
                println!("No {} advice yet; showing general advice.", known);
            }
        }
    }

    if advice.is_empty() {
        println!("No advice found for category '{}'.", category);
        println!();
        println!("Available categories:");
        for category in Category::all() {
            println!("  - {}", category);
        }
        return Ok(());
    }

    println!("💡 {} advice", category);
    for text in advice {
        println!();
        println!("{}", text);
    }

    Ok(())
}
