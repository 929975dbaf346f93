//! Pairwise motif comparison
//!
//! Two motifs are compared at every relative offset on both strands. At each
//! offset the overlapping position vectors are scored with a [`Metric`] and the
//! per-position scores are folded with a [`Combine`] rule; the best offset and
//! strand are reported as a [`PairwiseScore`].

use crate::error::{MotifError, Result};
use crate::motif::{Motif, NUCLEOTIDES};
use crate::types::{Orientation, PairwiseScore, ScoreMap};
use itertools::Itertools;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const UNIFORM_BACKGROUND: [f64; 4] = [0.25; 4];

/// Score function applied to a pair of aligned position vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Pearson correlation coefficient
    Pcc,
    /// Euclidean distance
    Ed,
    /// Sum of squared differences
    Sdd,
}

impl Metric {
    /// Whether larger scores mean more similar motifs
    pub fn higher_is_better(self) -> bool {
        matches!(self, Metric::Pcc)
    }

    pub fn score(self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Metric::Pcc => pearson(x, y),
            Metric::Ed => squared_differences(x, y).sqrt(),
            Metric::Sdd => squared_differences(x, y),
        }
    }
}

impl FromStr for Metric {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pcc" => Ok(Metric::Pcc),
            "ed" => Ok(Metric::Ed),
            "sdd" => Ok(Metric::Sdd),
            _ => Err(MotifError::invalid_parameter(
                "metric",
                s,
                "expected one of pcc, ed, sdd",
            )),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Pcc => "pcc",
            Metric::Ed => "ed",
            Metric::Sdd => "sdd",
        };
        f.write_str(name)
    }
}

/// How per-position scores are folded into one alignment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combine {
    Mean,
    Sum,
}

impl FromStr for Combine {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Combine::Mean),
            "sum" => Ok(Combine::Sum),
            _ => Err(MotifError::invalid_parameter(
                "combine",
                s,
                "expected one of mean, sum",
            )),
        }
    }
}

impl fmt::Display for Combine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combine::Mean => f.write_str("mean"),
            Combine::Sum => f.write_str("sum"),
        }
    }
}

/// Source of pairwise motif scores
///
/// `compare_all` runs `compare` over the full cross product in parallel and
/// gathers the results into a [`ScoreMap`] keyed by the motifs' raw identifiers.
pub trait MotifComparer: Sync {
    fn compare(&self, a: &Motif, b: &Motif, metric: Metric, combine: Combine) -> PairwiseScore;

    fn compare_all<M>(
        &self,
        first: &[M],
        second: &[M],
        metric: Metric,
        combine: Combine,
    ) -> ScoreMap
    where
        M: Borrow<Motif> + Sync,
    {
        let pairs: Vec<(usize, usize)> = (0..first.len())
            .cartesian_product(0..second.len())
            .collect();

        let scores: Vec<PairwiseScore> = pairs
            .par_iter()
            .map(|&(i, j)| {
                self.compare(first[i].borrow(), second[j].borrow(), metric, combine)
            })
            .collect();

        let mut map = ScoreMap::new();
        for (&(i, j), score) in pairs.iter().zip(scores) {
            map.insert(first[i].borrow().id(), second[j].borrow().id(), score);
        }
        map
    }
}

/// Ungapped alignment comparer scoring every offset on both strands
///
/// Positions outside the overlap are filled with a background vector.
#[derive(Debug, Clone)]
pub struct AlignmentComparer {
    background: [f64; 4],
}

impl Default for AlignmentComparer {
    fn default() -> Self {
        AlignmentComparer {
            background: UNIFORM_BACKGROUND,
        }
    }
}

impl AlignmentComparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score of `second` placed at `offset` relative to `first`
    fn score_at(
        &self,
        first: &Array2<f64>,
        second: &Array2<f64>,
        offset: isize,
        metric: Metric,
        combine: Combine,
    ) -> f64 {
        let (lead_first, lead_second) = if offset >= 0 {
            (0, offset.unsigned_abs())
        } else {
            (offset.unsigned_abs(), 0)
        };
        let width = (lead_first + first.nrows()).max(lead_second + second.nrows());

        let scores: Vec<f64> = (0..width)
            .map(|pos| {
                let x = self.position(first, pos, lead_first);
                let y = self.position(second, pos, lead_second);
                metric.score(&x, &y)
            })
            .collect();

        match combine {
            Combine::Mean => scores.iter().mean(),
            Combine::Sum => scores.iter().sum(),
        }
    }

    fn position(&self, matrix: &Array2<f64>, pos: usize, lead: usize) -> [f64; 4] {
        match pos.checked_sub(lead) {
            Some(p) if p < matrix.nrows() => {
                let mut out = [0.0; 4];
                for (slot, v) in out.iter_mut().zip(matrix.row(p).iter()) {
                    *slot = *v;
                }
                out
            }
            _ => self.background,
        }
    }
}

impl MotifComparer for AlignmentComparer {
    fn compare(&self, a: &Motif, b: &Motif, metric: Metric, combine: Combine) -> PairwiseScore {
        let first = a.frequencies();
        let mut best: Option<PairwiseScore> = None;

        for orientation in [Orientation::Forward, Orientation::Reverse] {
            let second = match orientation {
                Orientation::Forward => b.frequencies(),
                Orientation::Reverse => b.reverse_complement().frequencies(),
            };
            let min_offset = -(second.nrows() as isize - 1);
            for offset in min_offset..first.nrows() as isize {
                let similarity = self.score_at(&first, &second, offset, metric, combine);
                let candidate = PairwiseScore::new(similarity, offset, orientation);
                best = match best {
                    Some(current) if !improves(metric, &candidate, &current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        // both motifs have at least one position, so one offset was scored
        best.unwrap_or(PairwiseScore::new(f64::NAN, 0, Orientation::Forward))
    }
}

/// Orders alignments as (score, offset, orientation) tuples
fn improves(metric: Metric, candidate: &PairwiseScore, current: &PairwiseScore) -> bool {
    let ordering = candidate
        .similarity
        .partial_cmp(&current.similarity)
        .map(|o| {
            o.then(candidate.offset.cmp(&current.offset))
                .then(candidate.orientation.cmp(&current.orientation))
        });
    match ordering {
        Some(Ordering::Greater) => metric.higher_is_better(),
        Some(Ordering::Less) => !metric.higher_is_better(),
        _ => false,
    }
}

/// Pearson correlation; 0 when either vector is constant
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let sx = x.iter().std_dev();
    let sy = y.iter().std_dev();
    if sx == 0.0 || sy == 0.0 || sx.is_nan() || sy.is_nan() {
        return 0.0;
    }
    x.iter().covariance(y.iter()) / (sx * sy)
}

fn squared_differences(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), NUCLEOTIDES.len());
    x.iter().zip(y).map(|(a, b)| (a - b).powi(2)).sum()
}
