//! Whole-dataset expense analysis
//!
//! Builds the `expense_analysis` request (system instructions plus the
//! expenses as CSV) and reads the generator's JSON reply back into an
//! [`AnalysisReport`]. Generation itself happens outside this crate.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::context::ContextBuilder;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;
use crate::prompts::{PromptId, PromptLibrary};

/// Messages to send to a text generator
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub system: String,
    pub user: String,
}

/// Parsed analysis reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "text_or_list")]
    pub recommendations: String,
}

/// Accept recommendations as a string or a list of strings
fn text_or_list<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => format!("- {}", s),
                other => format!("- {}", other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Expenses as `Date,Category,Amount,Description` CSV
pub fn expenses_to_csv(records: &[ExpenseRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Date", "Category", "Amount", "Description"])?;
    for record in records {
        wtr.write_record([
            record.timestamp.format("%Y-%m-%d").to_string(),
            record.category.label().to_string(),
            format!("{:.2}", record.amount),
            record.description.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}

/// Build the analysis request for a set of expenses
pub fn build_analysis_request(
    records: &[ExpenseRecord],
    prompts: &PromptLibrary,
    context: &ContextBuilder,
) -> Result<AnalysisRequest> {
    let csv = expenses_to_csv(records)?;
    let overview = match context.summarize(records) {
        Some(summary) => context.render(&summary),
        None => String::new(),
    };

    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("expense_context", &overview);
    vars.insert("expense_csv", &csv);

    let prompt = prompts.get(PromptId::ExpenseAnalysis);
    Ok(AnalysisRequest {
        system: prompt.system_section().unwrap_or_default().to_string(),
        user: prompt.render_user(&vars),
    })
}

/// Parse a generator reply.
///
/// Replies often wrap the JSON in prose or code fences, so the outermost
/// `{...}` span is tried when the whole reply isn't JSON. A reply with no
/// usable JSON becomes the summary, with no recommendations.
pub fn parse_analysis_reply(reply: &str) -> AnalysisReport {
    let reply = reply.trim();
    if let Ok(report) = serde_json::from_str::<AnalysisReport>(reply) {
        return report;
    }

    if let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) {
        if start < end {
            if let Ok(report) = serde_json::from_str::<AnalysisReport>(&reply[start..=end]) {
                return report;
            }
        }
    }

    debug!("Analysis reply is not JSON, using it as the summary");
    AnalysisReport {
        summary: reply.to_string(),
        recommendations: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{DateTime, Utc};

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_705_276_800, 0).unwrap() // 2024-01-15
    }

    #[test]
    fn test_expenses_to_csv() {
        let records = vec![
            ExpenseRecord::new(Category::Food, 1200.0, ts())
                .unwrap()
                .with_description("Groceries, weekly"),
            ExpenseRecord::new("Other", 50.0, ts()).unwrap(),
        ];
        let csv = expenses_to_csv(&records).unwrap();
        assert_eq!(
            csv,
            "Date,Category,Amount,Description\n\
             2024-01-15,Food,1200.00,\"Groceries, weekly\"\n\
             2024-01-15,Other,50.00,\n"
        );
    }

    #[test]
    fn test_build_analysis_request() {
        let prompts = PromptLibrary::embedded_only().unwrap();
        let records = vec![ExpenseRecord::new(Category::Bills, 80.0, ts()).unwrap()];
        let request =
            build_analysis_request(&records, &prompts, &ContextBuilder::default()).unwrap();

        assert!(request.system.contains("financial data analyst"));
        assert!(request.user.starts_with("Overview: Expense records: 1."));
        assert!(request.user.ends_with("\n\nDate,Category,Amount,Description\n2024-01-15,Bills,80.00,\n"));
    }

    #[test]
    fn test_build_analysis_request_without_records() {
        let prompts = PromptLibrary::embedded_only().unwrap();
        let request = build_analysis_request(&[], &prompts, &ContextBuilder::default()).unwrap();
        assert_eq!(request.user, "Date,Category,Amount,Description\n");
    }

    #[test]
    fn test_parse_plain_json() {
        let report =
            parse_analysis_reply(r#"{"summary": "Mostly food.", "recommendations": "Cook more."}"#);
        assert_eq!(report.summary, "Mostly food.");
        assert_eq!(report.recommendations, "Cook more.");
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here you go:\n```json\n{\"summary\": \"S\", \"recommendations\": [\"a\", \"b\"]}\n```";
        let report = parse_analysis_reply(reply);
        assert_eq!(report.summary, "S");
        assert_eq!(report.recommendations, "- a\n- b");
    }

    #[test]
    fn test_parse_missing_fields_default() {
        let report = parse_analysis_reply(r#"{"summary": "only this"}"#);
        assert_eq!(report.summary, "only this");
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_parse_prose_falls_back_to_summary() {
        let report = parse_analysis_reply("  You spend a lot on {food}.  ");
        assert_eq!(report.summary, "You spend a lot on {food}.");
        assert!(report.recommendations.is_empty());
    }
}
