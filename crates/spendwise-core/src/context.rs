//! Expense Context Builder
//!
//! Turns a set of expense records into a compact, single-line statistical
//! summary for LLM prompts:
//! - Record count, total and average spend
//! - Spend per category (sorted by label)
//! - Top-N categories by total spend
//!
//! Output is deterministic for a given set of records regardless of their
//! order: amounts are summed in sorted order within each category, and the
//! grand total is summed over categories in label order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ExpenseRecord;

/// Context text used when there are no expenses to summarize
pub const NO_EXPENSE_DATA: &str = "No expense data available.";

/// Spend within one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

/// Statistics over a non-empty set of expenses
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    /// Every category present, sorted by label
    pub by_category: Vec<CategoryTotal>,
    /// Highest-spend categories, largest first
    pub top_categories: Vec<CategoryTotal>,
}

/// Builds expense context strings
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    top_n: usize,
    currency: String,
}

impl ContextBuilder {
    pub fn new(top_n: usize, currency: impl Into<String>) -> Self {
        Self {
            top_n,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Compute statistics, or `None` when there are no records
    pub fn summarize(&self, records: &[ExpenseRecord]) -> Option<ExpenseSummary> {
        if records.is_empty() {
            return None;
        }

        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.category.label())
                .or_default()
                .push(record.amount);
        }

        // Amounts are summed in sorted order so float rounding can't depend
        // on record order
        let by_category: Vec<CategoryTotal> = groups
            .into_iter()
            .map(|(category, mut amounts)| {
                amounts.sort_by(f64::total_cmp);
                CategoryTotal {
                    category: category.to_string(),
                    total: amounts.iter().sum(),
                    count: amounts.len(),
                }
            })
            .collect();

        // by_category is label-sorted, and the sort is stable, so equal
        // totals stay in label order
        let mut top_categories = by_category.clone();
        top_categories.sort_by(|a, b| b.total.total_cmp(&a.total));
        top_categories.truncate(self.top_n);

        let total: f64 = by_category.iter().map(|c| c.total).sum();
        Some(ExpenseSummary {
            count: records.len(),
            total,
            average: total / records.len() as f64,
            by_category,
            top_categories,
        })
    }

    /// Build the context string for a set of expenses
    pub fn build(&self, records: &[ExpenseRecord]) -> String {
        match self.summarize(records) {
            Some(summary) => self.render(&summary),
            None => NO_EXPENSE_DATA.to_string(),
        }
    }

    /// Render a summary as a single line of text
    pub fn render(&self, summary: &ExpenseSummary) -> String {
        let cur = &self.currency;
        let mut context = format!(
            "Expense records: {}. Total spending: {:.2} {}. Average expense: {:.2} {}. ",
            summary.count, summary.total, cur, summary.average, cur
        );

        let categories = summary
            .by_category
            .iter()
            .map(|c| format!("{}: {:.2} {}", c.category, c.total, cur))
            .collect::<Vec<_>>()
            .join(", ");
        context.push_str(&format!("Spending by category: {}.", categories));

        if !summary.top_categories.is_empty() {
            let top = summary
                .top_categories
                .iter()
                .map(|c| format!("{} ({:.2} {})", c.category, c.total, cur))
                .collect::<Vec<_>>()
                .join(", ");
            context.push_str(&format!(" Top categories: {}.", top));
        }

        context
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(3, "PKR")
    }
}
