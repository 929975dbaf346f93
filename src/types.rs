use crate::error::{MotifError, Result};
use std::collections::HashMap;
use std::fmt;

/// Strand of motif B when aligned against motif A
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    /// B is reverse-complemented before alignment
    Reverse,
    /// B is aligned as given
    Forward,
}

impl Orientation {
    pub fn sign(self) -> i32 {
        match self {
            Orientation::Forward => 1,
            Orientation::Reverse => -1,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sign())
    }
}

/// Result of aligning motif A against motif B
///
/// `offset` is the start of B relative to the start of A and may be negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseScore {
    pub similarity: f64,
    pub offset: isize,
    pub orientation: Orientation,
}

impl PairwiseScore {
    pub fn new(similarity: f64, offset: isize, orientation: Orientation) -> Self {
        PairwiseScore {
            similarity,
            offset,
            orientation,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ScoreRow {
    targets: Vec<String>,
    scores: HashMap<String, PairwiseScore>,
}

/// Pairwise comparison results indexed by motif identifier
///
/// Behaves like a nested mapping `first -> second -> score` in which both
/// levels remember insertion order. Scores are directional: `get(a, b)` and
/// `get(b, a)` are independent entries.
#[derive(Debug, Clone, Default)]
pub struct ScoreMap {
    order: Vec<String>,
    rows: HashMap<String, ScoreRow>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the score of `first` compared to `second`, replacing any previous value
    pub fn insert(&mut self, first: &str, second: &str, score: PairwiseScore) {
        if !self.rows.contains_key(first) {
            self.order.push(first.to_string());
        }
        let row = self.rows.entry(first.to_string()).or_default();
        if row.scores.insert(second.to_string(), score).is_none() {
            row.targets.push(second.to_string());
        }
    }

    pub fn get(&self, first: &str, second: &str) -> Option<&PairwiseScore> {
        self.rows.get(first)?.scores.get(second)
    }

    /// Like [`ScoreMap::get`] but fails with `MotifError::MissingScore`
    pub fn score(&self, first: &str, second: &str) -> Result<&PairwiseScore> {
        self.get(first, second)
            .ok_or_else(|| MotifError::missing_score(first, second))
    }

    /// First-level keys in insertion order
    pub fn first_keys(&self) -> &[String] {
        &self.order
    }

    /// Second-level keys recorded for `first`, in insertion order
    pub fn second_keys(&self, first: &str) -> Option<&[String]> {
        self.rows.get(first).map(|row| row.targets.as_slice())
    }

    /// Number of first-level keys
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Replaces tab characters so identifiers can be used as table labels
pub fn normalize_id(id: &str) -> String {
    id.replace('\t', " ")
}
