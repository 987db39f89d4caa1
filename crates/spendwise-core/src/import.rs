//! CSV import for expense files
//!
//! Expected layout is `Date,Category,Amount,Description`. Header names are
//! matched case-insensitively and may appear in any order; `Description` is
//! optional.

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    category: usize,
    amount: usize,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing '{}' column", name)))
        };

        Ok(Self {
            date: require("Date")?,
            category: require("Category")?,
            amount: require("Amount")?,
            description: find("Description"),
        })
    }
}

/// Parse an expense CSV into validated records
pub fn parse_expenses_csv<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result?;
        // Header is line 1
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }

        let record = parse_row(&row, &columns)
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;
        records.push(record);
    }

    debug!(records = records.len(), "Parsed expense CSV");
    Ok(records)
}

fn parse_row(row: &StringRecord, columns: &Columns) -> Result<ExpenseRecord> {
    let date = row
        .get(columns.date)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import("Missing date".into()))?;
    let timestamp = parse_date(date)?;

    let category = row
        .get(columns.category)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import("Missing category".into()))?;

    let amount = row
        .get(columns.amount)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import("Missing amount".into()))?;
    let amount = parse_amount(amount)?;

    let record = ExpenseRecord::new(category, amount, timestamp)?;
    Ok(match columns.description.and_then(|i| row.get(i)) {
        Some(description) => record.with_description(description),
        None => record,
    })
}

/// Parse a date or timestamp; plain dates are taken as midnight UTC
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts.and_utc());
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Currency markers accepted before or after an amount, longest first
const CURRENCY_MARKERS: [&str; 4] = ["PKR", "Rs.", "Rs", "$"];

/// Strip currency markers from both ends, ignoring ASCII case
fn strip_currency(mut s: &str) -> &str {
    loop {
        let before = s.len();
        s = s.trim();
        for marker in CURRENCY_MARKERS {
            let n = marker.len();
            if s.get(..n).is_some_and(|p| p.eq_ignore_ascii_case(marker)) {
                s = &s[n..];
            }
            if s.len() >= n
                && s
                    .get(s.len() - n..)
                    .is_some_and(|p| p.eq_ignore_ascii_case(marker))
            {
                s = &s[..s.len() - n];
            }
        }
        if s.len() == before {
            return s;
        }
    }
}

/// Parse an amount string, handling currency markers and thousands separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = strip_currency(s).replace([',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExpenseCategory};

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("01/15/2024").unwrap(), expected);
        assert_eq!(
            parse_date("2024-01-15T10:30:00Z").unwrap(),
            expected + chrono::Duration::minutes(630)
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("PKR 2,500").unwrap(), 2500.0);
        assert_eq!(parse_amount("Rs.300").unwrap(), 300.0);
        assert_eq!(parse_amount("Rs 300").unwrap(), 300.0);
        assert_eq!(parse_amount("1,200 PKR").unwrap(), 1200.0);
        assert_eq!(parse_amount("450 rs").unwrap(), 450.0);
        assert_eq!(parse_amount(" 75.5 $ ").unwrap(), 75.5);
        assert!(parse_amount("PKR").is_err());
        assert!(parse_amount("lots").is_err());
    }

    #[test]
    fn test_parse_expenses_csv() {
        let csv = "Date,Category,Amount,Description
2024-01-15,Food,1200,Groceries
2024-01-16,Transport,300,Rickshaw
2024-01-17,Other,50,";

        let records = parse_expenses_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].category, ExpenseCategory::Known(Category::Food));
        assert_eq!(records[0].amount, 1200.0);
        assert_eq!(records[0].description.as_deref(), Some("Groceries"));
        assert_eq!(records[2].category, ExpenseCategory::Other("Other".into()));
        assert_eq!(records[2].description, None);
    }

    #[test]
    fn test_headers_case_insensitive_any_order() {
        let csv = "amount,CATEGORY,date\n10.5,bills,2024-02-01\n";
        let records = parse_expenses_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, ExpenseCategory::Known(Category::Bills));
        assert_eq!(records[0].amount, 10.5);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let csv = "Date,Amount\n2024-01-15,10\n";
        let err = parse_expenses_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Category"), "{}", err);
    }

    #[test]
    fn test_negative_amount_names_line() {
        let csv = "Date,Category,Amount\n2024-01-15,Food,10\n2024-01-16,Food,-5\n";
        let err = parse_expenses_csv(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{}", message);
        assert!(message.contains("non-negative"), "{}", message);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let csv = "Date,Category,Amount\n2024-01-15,Food,10\n,,\n";
        assert_eq!(parse_expenses_csv(csv.as_bytes()).unwrap().len(), 1);
    }
}
