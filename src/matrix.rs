use crate::error::{MotifError, Result};
use crate::types::{normalize_id, ScoreMap};
use log::debug;
use ndarray::Array2;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// Symmetric motif x motif distance table
///
/// Row labels and column labels hold the same normalized identifiers, possibly
/// in different orders. `values[[r, c]]` is the distance between row label `r`
/// and column label `c`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl DistanceMatrix {
    /// Creates a matrix whose rows and columns share the same labels
    ///
    /// # Errors
    /// * `MotifError::InvalidInput` if `values` is not `labels.len()` x `labels.len()`
    /// * `MotifError::DuplicateMotifId` if a label occurs twice
    pub fn new(labels: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let n = labels.len();
        if values.dim() != (n, n) {
            return Err(MotifError::InvalidInput(format!(
                "distance matrix of shape {:?} does not match {} labels",
                values.dim(),
                n
            )));
        }
        let labels = normalized_labels(&labels)?;
        Ok(DistanceMatrix {
            rows: labels.clone(),
            columns: labels,
            values,
        })
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of motifs
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distance between two labelled motifs
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        Some(self.values[[r, c]])
    }

    /// Upper triangle in row-label order, excluding the diagonal
    ///
    /// Entry `(i, j)` with `i < j` is the distance between row labels `i` and `j`,
    /// laid out row by row as expected by [`crate::linkage::linkage`].
    pub fn condensed(&self) -> Vec<f64> {
        let column_index: HashMap<&str, usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(c, label)| (label.as_str(), c))
            .collect();

        let n = self.rows.len();
        let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                condensed.push(self.values[[i, column_index[self.rows[j].as_str()]]]);
            }
        }
        condensed
    }

    /// Converts the matrix to a DataFrame with a leading "Motif" label column
    ///
    /// # Errors
    /// * `MotifError::DataError` if a column cannot be created (e.g. a motif named "Motif")
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new("Motif".into(), self.rows.clone()));
        for (c, label) in self.columns.iter().enumerate() {
            columns.push(Column::new(
                label.as_str().into(),
                self.values.column(c).to_vec(),
            ));
        }
        let df = DataFrame::new(columns)?;
        Ok(df)
    }
}

/// Rounds `1 - mean(a, b)` to three decimals, with -0 reported as 0
pub fn similarity_to_distance(a: f64, b: f64) -> f64 {
    let distance = round_to(1.0 - (a + b) / 2.0, 3);
    if distance == 0.0 {
        0.0
    } else {
        distance
    }
}

/// Round half to even at `decimals` digits
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Builds the symmetric distance matrix from directional pairwise scores
///
/// Every motif must have been compared to every motif, itself included. The
/// distance of a pair is `round(1 - mean(sim(i, j), sim(j, i)), 3)` and is written
/// to both `(i, j)` and `(j, i)`, so the result is exactly symmetric even though
/// the two directional similarities usually differ. The diagonal is computed the
/// same way and is not forced to zero.
///
/// Column labels follow the first-level keys of `scores`, row labels the
/// second-level keys of the first entry; all labels have tabs replaced by spaces.
///
/// # Errors
/// * `MotifError::EmptyMotifSet` if `scores` is empty
/// * `MotifError::KeyMismatch` if any motif was not compared to exactly the full motif set
/// * `MotifError::DuplicateMotifId` if two identifiers collide after normalization
pub fn build_distance_matrix(scores: &ScoreMap) -> Result<DistanceMatrix> {
    let first_keys = scores.first_keys();
    if first_keys.is_empty() {
        return Err(MotifError::EmptyMotifSet);
    }

    let expected: HashSet<&str> = first_keys.iter().map(String::as_str).collect();
    for id in first_keys {
        let targets = scores.second_keys(id).unwrap_or(&[]);
        let found: HashSet<&str> = targets.iter().map(String::as_str).collect();
        if found != expected || targets.len() != first_keys.len() {
            return Err(MotifError::key_mismatch(
                id.as_str(),
                first_keys.len(),
                targets.len(),
            ));
        }
    }
    let second_keys = scores.second_keys(&first_keys[0]).unwrap_or(&[]);

    let columns = normalized_labels(first_keys)?;
    let rows = normalized_labels(second_keys)?;

    let row_index: HashMap<&str, usize> = second_keys
        .iter()
        .enumerate()
        .map(|(r, id)| (id.as_str(), r))
        .collect();
    let column_index: HashMap<&str, usize> = first_keys
        .iter()
        .enumerate()
        .map(|(c, id)| (id.as_str(), c))
        .collect();

    let n = first_keys.len();
    let mut values = Array2::zeros((n, n));
    for (c, first) in first_keys.iter().enumerate() {
        for (r, second) in second_keys.iter().enumerate() {
            let forward = scores.score(first, second)?.similarity;
            let backward = scores.score(second, first)?.similarity;
            let distance = similarity_to_distance(forward, backward);

            values[[r, c]] = distance;
            values[[row_index[first.as_str()], column_index[second.as_str()]]] = distance;
        }
    }

    debug!("Built {}x{} distance matrix", n, n);

    Ok(DistanceMatrix {
        rows,
        columns,
        values,
    })
}

fn normalized_labels(ids: &[String]) -> Result<Vec<String>> {
    let labels: Vec<String> = ids.iter().map(|id| normalize_id(id)).collect();
    let mut seen = HashSet::with_capacity(labels.len());
    for label in &labels {
        if !seen.insert(label.as_str()) {
            return Err(MotifError::DuplicateMotifId(label.clone()));
        }
    }
    Ok(labels)
}

/// Labels of motifs that are farther than `threshold` from every motif
///
/// A column qualifies when all of its entries, the diagonal included, strictly
/// exceed `threshold`. Only columns `0..=len - 2` are examined: the last column
/// is never reported.
pub fn dissimilar_motifs(matrix: &DistanceMatrix, threshold: f64) -> Vec<String> {
    let n_columns = matrix.columns.len();
    (0..n_columns.saturating_sub(1))
        .filter(|&c| matrix.values.column(c).iter().all(|&d| d > threshold))
        .map(|c| matrix.columns[c].clone())
        .collect()
}
