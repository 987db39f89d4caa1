//! Financial advice knowledge base
//!
//! A small, fixed set of advice passages tagged with a [`Category`]. The set
//! is built once and never changes; document ids are insertion indices.
//!
//! The default set is compiled into the binary. Custom sets can be loaded
//! from a TOML file with the same shape:
//!
//! ```toml
//! [[documents]]
//! category = "Food"
//! text = "Cook at home more often."
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{Category, Document};

/// Embedded default knowledge base (compiled into binary)
const DEFAULT_KNOWLEDGE: &str = include_str!("../../../knowledge/financial_advice.toml");

#[derive(Debug, Deserialize)]
struct RawKnowledge {
    #[serde(default)]
    documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    category: String,
    text: String,
}

/// Immutable collection of advice documents
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    documents: Vec<Document>,
}

impl KnowledgeBase {
    /// The built-in seven-category advice set
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_KNOWLEDGE)
    }

    /// Load a knowledge base from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::InvalidData(format!(
                "Failed to read knowledge base {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawKnowledge = toml::from_str(content)
            .map_err(|e| Error::InvalidData(format!("Invalid knowledge base TOML: {}", e)))?;

        let mut entries = Vec::with_capacity(raw.documents.len());
        for (index, doc) in raw.documents.into_iter().enumerate() {
            let category = doc.category.parse::<Category>().map_err(|e| {
                Error::InvalidData(format!("Knowledge document {}: {}", index + 1, e))
            })?;
            if doc.text.trim().is_empty() {
                return Err(Error::InvalidData(format!(
                    "Knowledge document {} has no text",
                    index + 1
                )));
            }
            entries.push((category, doc.text));
        }

        Ok(Self::from_documents(entries))
    }

    /// Build from `(category, text)` pairs, assigning ids in order
    pub fn from_documents<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Category, S)>,
        S: Into<String>,
    {
        let documents = entries
            .into_iter()
            .enumerate()
            .map(|(id, (category, text))| Document {
                id,
                category,
                text: text.into(),
            })
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: usize) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents tagged with `category`, in insertion order.
    ///
    /// Returns an empty list when the category has no advice.
    pub fn advice_for(&self, category: Category) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|doc| doc.category == category)
            .collect()
    }

    /// Category advice, falling back to [`Category::General`] when none exists
    pub fn advice_or_general(&self, category: Category) -> Vec<&Document> {
        let advice = self.advice_for(category);
        if advice.is_empty() && category != Category::General {
            return self.advice_for(Category::General);
        }
        advice
    }
}
