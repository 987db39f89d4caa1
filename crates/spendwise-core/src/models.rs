//! Domain models for Spendwise

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Advice categories covered by the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Food,
    Transport,
    Bills,
    Shopping,
    Savings,
    Budget,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Bills => "Bills",
            Self::Shopping => "Shopping",
            Self::Savings => "Savings",
            Self::Budget => "Budget",
            Self::General => "General",
        }
    }

    /// Get all categories in declaration order
    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Bills,
            Self::Shopping,
            Self::Savings,
            Self::Budget,
            Self::General,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "bills" => Ok(Self::Bills),
            "shopping" => Ok(Self::Shopping),
            "savings" => Ok(Self::Savings),
            "budget" => Ok(Self::Budget),
            "general" => Ok(Self::General),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Category attached to an expense.
///
/// Users may enter categories outside the advice set ("Other", "Rent", ...),
/// so anything that doesn't parse as a [`Category`] is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseCategory {
    Known(Category),
    Other(String),
}

impl ExpenseCategory {
    pub fn label(&self) -> &str {
        match self {
            Self::Known(category) => category.as_str(),
            Self::Other(label) => label.as_str(),
        }
    }

    /// The advice category, if this expense category has one
    pub fn known(&self) -> Option<Category> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Other(_) => None,
        }
    }
}

impl From<Category> for ExpenseCategory {
    fn from(category: Category) -> Self {
        Self::Known(category)
    }
}

impl From<&str> for ExpenseCategory {
    fn from(label: &str) -> Self {
        match label.parse::<Category>() {
            Ok(category) => Self::Known(category),
            Err(_) => Self::Other(label.trim().to_string()),
        }
    }
}

impl From<String> for ExpenseCategory {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<ExpenseCategory> for String {
    fn from(category: ExpenseCategory) -> Self {
        category.label().to_string()
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// A single observed expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub category: ExpenseCategory,
    /// Always non-negative; expenses are recorded as positive amounts
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub description: Option<String>,
}

impl ExpenseRecord {
    /// Create a validated expense record
    pub fn new(
        category: impl Into<ExpenseCategory>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let record = Self {
            category: category.into(),
            amount,
            timestamp,
            description: None,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    /// Reject records that would corrupt the statistics built from them
    pub fn validate(&self) -> Result<()> {
        if self.category.label().trim().is_empty() {
            return Err(Error::InvalidExpense("category is missing".into()));
        }
        if !self.amount.is_finite() {
            return Err(Error::InvalidExpense(format!(
                "amount is not a number: {}",
                self.amount
            )));
        }
        if self.amount < 0.0 {
            return Err(Error::InvalidExpense(format!(
                "amount must be non-negative, got {:.2}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// A financial advice passage in the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Insertion index within the knowledge base
    pub id: usize,
    pub category: Category,
    pub text: String,
}

/// A retrieved document with its similarity to the query
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    /// Cosine similarity in `[0.0, 1.0]`
    pub score: f64,
}

/// Ranked retrieval output, best match first
pub type RetrievalResult<'a> = Vec<ScoredDocument<'a>>;
