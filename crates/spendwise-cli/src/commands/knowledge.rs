//! Knowledge base command implementations

use anyhow::Result;
use spendwise_core::RagEngine;

use super::truncate;

/// List every advice document
pub fn cmd_knowledge(engine: &RagEngine) -> Result<()> {
    let knowledge = engine.knowledge();

    println!(
        "📚 {} documents, {} indexed terms",
        knowledge.len(),
        engine.vectorizer().vocabulary_len()
    );
    println!();
    println!("{:>4}  {:<10}  TEXT", "ID", "CATEGORY");
    println!("{}", "-".repeat(80));
    for doc in knowledge.documents() {
        println!(
            "{:>4}  {:<10}  {}",
            doc.id,
            doc.category,
            truncate(&doc.text, 62)
        );
    }

    Ok(())
}
