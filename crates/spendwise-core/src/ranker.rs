//! Cosine similarity ranking over term vectors.
//!
//! Sort order is score (desc), then corpus index (asc), so equal scores keep
//! the corpus insertion order and the output is fully deterministic.

use crate::error::{Error, Result};
use crate::vectorizer::TermVector;

/// A corpus entry's position and similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    /// Index into the corpus the query was ranked against
    pub index: usize,
    /// Cosine similarity in `[0.0, 1.0]`
    pub score: f64,
}

/// Cosine similarity between two term vectors.
///
/// Returns `0.0` when either vector has zero magnitude. Term weights are
/// non-negative, so the result is clamped to `[0.0, 1.0]` to absorb
/// floating-point overshoot.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }

    let denom = a.norm() * b.norm();
    let similarity = if denom.is_normal() {
        a.dot(b) / denom
    } else {
        // Norms underflowed or overflowed
        let (a, b) = (rescaled(a), rescaled(b));
        a.dot(&b) / (a.norm() * b.norm())
    };

    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    }
}

/// Divide every weight by the largest magnitude so it lands in `[-1, 1]`
fn rescaled(v: &TermVector) -> TermVector {
    let max = v
        .entries()
        .iter()
        .map(|(_, w)| w.abs())
        .fold(0.0_f64, f64::max);
    TermVector::from_entries(v.entries().iter().map(|&(i, w)| (i, w / max)))
}

/// Rank every corpus vector against `query` and keep the best `top_k`.
///
/// `top_k` larger than the corpus returns the whole corpus ranked.
pub fn rank(query: &TermVector, corpus: &[TermVector], top_k: usize) -> Result<Vec<Ranked>> {
    if top_k == 0 {
        return Err(Error::InvalidTopK(top_k));
    }

    let mut ranked: Vec<Ranked> = corpus
        .iter()
        .enumerate()
        .map(|(index, doc)| Ranked {
            index,
            score: cosine_similarity(query, doc),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked.truncate(top_k);

    Ok(ranked)
}
