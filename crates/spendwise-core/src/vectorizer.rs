//! TF-IDF vectorizer
//!
//! Builds a term-weight model over the knowledge base and projects arbitrary
//! text into the same weight space.
//!
//! ## Weighting
//!
//! ```text
//! idf(t)    = ln((1 + N) / (1 + df(t))) + 1
//! weight(t) = count(t in text) * idf(t)
//! ```
//!
//! where `N` is the number of fitted documents and `df(t)` the number of
//! documents containing `t`. Term frequency is the raw count; every vector is
//! then L2-normalized, so document length does not change its magnitude.
//!
//! ## Lifecycle
//!
//! [`Vectorizer::fit`] consumes the unfitted vectorizer and returns a
//! [`FittedVectorizer`]. There is no way to refit a fitted model: the
//! vocabulary and IDF weights are frozen for as long as the value lives.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

/// Common English words that carry no retrieval signal
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "else", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "may", "me", "might", "more", "most", "much", "must", "my", "myself",
    "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Tokenizer settings
#[derive(Debug, Clone)]
pub struct VectorizerOptions {
    /// Drop common English stop words
    pub stop_words: bool,
    /// Tokens shorter than this (in chars) are dropped
    pub min_token_len: usize,
}

impl Default for VectorizerOptions {
    fn default() -> Self {
        Self {
            stop_words: true,
            min_token_len: 2,
        }
    }
}

/// Lower-cases text and splits it on non-alphanumeric boundaries
#[derive(Debug, Clone)]
pub struct Tokenizer {
    word: Regex,
    stop_words: HashSet<&'static str>,
    min_len: usize,
}

impl Tokenizer {
    pub fn new(options: &VectorizerOptions) -> Result<Self> {
        let stop_words = if options.stop_words {
            STOP_WORDS.iter().copied().collect()
        } else {
            HashSet::new()
        };
        Ok(Self {
            word: Regex::new(r"[\p{L}\p{N}]+")?,
            stop_words,
            min_len: options.min_token_len.max(1),
        })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.word
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| t.chars().count() >= self.min_len)
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}

/// Sparse term-weight vector, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(usize, f64)>,
}

impl TermVector {
    /// Build from `(term index, weight)` pairs; zero weights are dropped
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let map: BTreeMap<usize, f64> = entries.into_iter().filter(|(_, w)| *w != 0.0).collect();
        Self {
            entries: map.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero terms
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &TermVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Unfitted vectorizer
#[derive(Debug, Clone)]
pub struct Vectorizer {
    tokenizer: Tokenizer,
}

impl Vectorizer {
    pub fn new(options: &VectorizerOptions) -> Result<Self> {
        Ok(Self {
            tokenizer: Tokenizer::new(options)?,
        })
    }

    /// Fit the model over the full corpus
    pub fn fit<S: AsRef<str>>(self, texts: &[S]) -> Result<FittedVectorizer> {
        if texts.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for text in texts {
            let unique: BTreeSet<String> =
                self.tokenizer.tokenize(text.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        // BTreeMap iteration is sorted, so indices follow term order
        let n = texts.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        let mut fitted = FittedVectorizer {
            tokenizer: self.tokenizer,
            vocabulary,
            idf,
            corpus_vectors: Vec::new(),
        };
        let corpus_vectors: Vec<TermVector> =
            texts.iter().map(|t| fitted.transform(t.as_ref())).collect();
        fitted.corpus_vectors = corpus_vectors;

        debug!(
            documents = texts.len(),
            vocabulary = fitted.vocabulary_len(),
            "Fitted TF-IDF model"
        );

        Ok(fitted)
    }
}

/// Frozen TF-IDF model with the vectors of the corpus it was fit on
#[derive(Debug, Clone)]
pub struct FittedVectorizer {
    tokenizer: Tokenizer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    corpus_vectors: Vec<TermVector>,
}

impl FittedVectorizer {
    /// Project text into the fitted weight space.
    ///
    /// Terms outside the fitted vocabulary are ignored; text with no known
    /// terms yields the zero vector.
    pub fn transform(&self, text: &str) -> TermVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in self.tokenizer.tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        TermVector::from_entries(
            counts
                .into_iter()
                .map(|(index, count)| (index, count * self.idf[index])),
        )
        .normalized()
    }

    /// One vector per fitted document, in corpus order
    pub fn corpus_vectors(&self) -> &[TermVector] {
        &self.corpus_vectors
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight of a term, if it is in the vocabulary
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(texts: &[&str]) -> FittedVectorizer {
        Vectorizer::new(&VectorizerOptions::default())
            .unwrap()
            .fit(texts)
            .unwrap()
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let tokenizer = Tokenizer::new(&VectorizerOptions::default()).unwrap();
        assert_eq!(
            tokenizer.tokenize("Cut FOOD-costs: cook@home, 24 hours!"),
            vec!["cut", "food", "costs", "cook", "home", "24", "hours"]
        );
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        let tokenizer = Tokenizer::new(&VectorizerOptions::default()).unwrap();
        assert_eq!(
            tokenizer.tokenize("How can I reduce my food expenses?"),
            vec!["reduce", "food", "expenses"]
        );
    }

    #[test]
    fn test_tokenize_keeps_stop_words_when_disabled() {
        let tokenizer = Tokenizer::new(&VectorizerOptions {
            stop_words: false,
            min_token_len: 1,
        })
        .unwrap();
        assert_eq!(tokenizer.tokenize("I save"), vec!["i", "save"]);
    }

    #[test]
    fn test_stop_words_are_lowercase() {
        for word in STOP_WORDS {
            assert_eq!(*word, word.to_lowercase());
        }
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let empty: [&str; 0] = [];
        let err = Vectorizer::new(&VectorizerOptions::default())
            .unwrap()
            .fit(&empty)
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn test_idf_smoothing() {
        let model = fit(&["budget food", "budget rent", "budget travel"]);
        // in every document: ln(4/4) + 1
        assert!((model.idf("budget").unwrap() - 1.0).abs() < 1e-12);
        // in one document: ln(4/2) + 1
        assert!((model.idf("food").unwrap() - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!(model.idf("unseen").is_none());
    }

    #[test]
    fn test_vocabulary_indices_follow_term_order() {
        let model = fit(&["zebra apple", "mango"]);
        let apple = model.transform("apple");
        let mango = model.transform("mango");
        let zebra = model.transform("zebra");
        assert_eq!(apple.entries()[0].0, 0);
        assert_eq!(mango.entries()[0].0, 1);
        assert_eq!(zebra.entries()[0].0, 2);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let model = fit(&["meal planning saves money", "carpool to work"]);
        let a = model.transform("Meal planning and carpooling");
        let b = model.transform("Meal planning and carpooling");
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_out_of_vocabulary_is_zero() {
        let model = fit(&["meal planning", "carpool"]);
        assert!(model.transform("cryptocurrency yachts").is_zero());
        assert!(model.transform("").is_zero());
    }

    #[test]
    fn test_transform_is_unit_length() {
        let model = fit(&["meal planning meal prep", "carpool to work"]);
        let v = model.transform("meal meal planning");
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_terms_weigh_more() {
        let model = fit(&["food waste", "food budget", "rent"]);
        let v = model.transform("waste waste budget");
        let weights: HashMap<usize, f64> = v.entries().iter().copied().collect();
        let waste = model.transform("waste").entries()[0].0;
        let budget = model.transform("budget").entries()[0].0;
        assert!(weights[&waste] > weights[&budget]);
    }

    #[test]
    fn test_corpus_vectors_match_corpus() {
        let texts = ["meal planning", "carpool to work", "negotiate bills"];
        let model = fit(&texts);
        assert_eq!(model.corpus_vectors().len(), texts.len());
        for (text, stored) in texts.iter().zip(model.corpus_vectors()) {
            assert_eq!(&model.transform(text), stored);
        }
    }

    #[test]
    fn test_corpus_of_only_stop_words_fits() {
        let model = fit(&["the and of", "to be"]);
        assert_eq!(model.vocabulary_len(), 0);
        assert!(model.corpus_vectors().iter().all(TermVector::is_zero));
    }

    #[test]
    fn test_term_vector_dot_sparse_merge() {
        let a = TermVector::from_entries([(0, 1.0), (2, 2.0), (5, 3.0)]);
        let b = TermVector::from_entries([(2, 4.0), (3, 1.0), (5, 1.0)]);
        assert!((a.dot(&b) - 11.0).abs() < 1e-12);
        assert!((a.dot(&b) - b.dot(&a)).abs() < 1e-12);
    }

    #[test]
    fn test_term_vector_from_entries_sorts_and_drops_zeros() {
        let v = TermVector::from_entries([(3, 1.0), (1, 0.0), (0, 2.0)]);
        assert_eq!(v.entries(), &[(0, 2.0), (3, 1.0)]);
        assert_eq!(v.nnz(), 2);
    }
}
