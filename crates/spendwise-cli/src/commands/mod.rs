//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_engine, read_expenses)
//! - `retrieve` - Knowledge retrieval and category advice
//! - `expenses` - Expense summary, answer prompt and analysis commands
//! - `knowledge` - Knowledge base listing
//! - `prompts` - Prompt library management commands

pub mod core;
pub mod expenses;
pub mod knowledge;
pub mod prompts;
pub mod retrieve;

// Re-export command functions for main.rs
pub use core::*;
pub use expenses::*;
pub use knowledge::*;
pub use prompts::*;
pub use retrieve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
