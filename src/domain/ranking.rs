//! Brute-force similarity ranking over a snapshot of cases.
//!
//! Every candidate is scored with cosine similarity against the query and the
//! best `k` are returned by descending score. Equal scores keep the order the
//! candidates were supplied in, so repeated queries over the same snapshot
//! return identical results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::domain::{Case, DomainError, Match};

/// Below this many candidates a full sort is cheaper than maintaining a heap.
const HEAP_MIN_CANDIDATES: usize = 256;

/// Cosine similarity of two equal-length vectors.
///
/// Returns `0.0` when either side has zero magnitude. The result is clamped
/// to `[-1.0, 1.0]` to absorb rounding drift.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DomainError> {
    if a.len() != b.len() {
        return Err(DomainError::dimension_mismatch(a.len(), b.len()));
    }

    let mut dot = 0.0f64;
    let mut a_norm = 0.0f64;
    let mut b_norm = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        a_norm += x * x;
        b_norm += y * y;
    }

    let denom = a_norm.sqrt() * b_norm.sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0) as f32)
}

/// Ranks `candidates` against `query` and returns at most `k` matches.
///
/// All candidate dimensions are validated before any scoring happens, so a
/// mismatch never yields partial output.
pub fn rank<'a>(
    query: &[f32],
    candidates: &'a [Case],
    k: usize,
) -> Result<Vec<Match<'a>>, DomainError> {
    if k == 0 {
        return Err(DomainError::InvalidK(k));
    }

    if let Some(bad) = candidates
        .iter()
        .find(|case| case.embedding.dims() != query.len())
    {
        return Err(DomainError::dimension_mismatch(
            query.len(),
            bad.embedding.dims(),
        ));
    }

    let mut scored = Vec::with_capacity(candidates.len());
    for (index, case) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, &case.embedding.vector)?;
        scored.push(Ranked { score, index });
    }

    let ranked = if candidates.len() >= HEAP_MIN_CANDIDATES && k < candidates.len() / 2 {
        select_with_heap(scored, k)
    } else {
        scored.sort();
        scored.truncate(k);
        scored
    };

    Ok(ranked
        .into_iter()
        .map(|entry| Match {
            case: &candidates[entry.index],
            score: entry.score,
        })
        .collect())
}

/// Keeps only the best `k` entries, evicting the worst as it goes.
fn select_with_heap(scored: Vec<Ranked>, k: usize) -> Vec<Ranked> {
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for entry in scored {
        heap.push(entry);
        if heap.len() > k {
            heap.pop();
        }
    }
    heap.into_sorted_vec()
}

/// Score plus original position. Orders best-first: higher score, then lower
/// index, so the heap's maximum is always the worst retained entry.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    score: f32,
    index: usize,
}

impl Ranked {
    fn key(&self) -> f32 {
        if self.score.is_nan() {
            f32::NEG_INFINITY
        } else if self.score == 0.0 {
            // folds -0.0 into 0.0
            0.0
        } else {
            self.score
        }
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key()
            .total_cmp(&self.key())
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}
