use crate::error::{MotifError, Result};
use crate::types::{normalize_id, Orientation};
use ndarray::{s, Array2, ArrayView1, Axis};
use phf::phf_map;

/// Column order of every motif matrix
pub const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Maps a nucleotide symbol to its matrix column
pub static NUCLEOTIDE_INDEX: phf::Map<char, usize> = phf_map! {
    'A' => 0,
    'C' => 1,
    'G' => 2,
    'T' => 3,
};

/// A sequence motif: an identifier and a position x nucleotide matrix
///
/// Rows are motif positions, the four columns hold counts or frequencies for
/// A, C, G and T. Motifs are never modified in place; operations such as
/// [`Motif::average`] and [`Motif::reverse_complement`] build new values.
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    id: String,
    matrix: Array2<f64>,
}

impl Motif {
    /// Creates a motif after checking the matrix shape and values
    ///
    /// # Errors
    /// * `MotifError::InvalidMatrix` if the matrix does not have 4 columns, has no rows,
    ///   or contains negative or non-finite values
    pub fn new(id: impl Into<String>, matrix: Array2<f64>) -> Result<Self> {
        let id = id.into();
        if matrix.ncols() != NUCLEOTIDES.len() {
            return Err(MotifError::invalid_matrix(
                id,
                format!("expected 4 columns, found {}", matrix.ncols()),
            ));
        }
        if matrix.nrows() == 0 {
            return Err(MotifError::invalid_matrix(id, "motif has no positions"));
        }
        if matrix.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(MotifError::invalid_matrix(
                id,
                "values must be finite and non-negative",
            ));
        }
        Ok(Motif { id, matrix })
    }

    /// Creates a motif from one `[A, C, G, T]` row per position
    pub fn from_rows(id: impl Into<String>, rows: &[[f64; 4]]) -> Result<Self> {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((rows.len(), 4), flat)
            .map_err(|e| MotifError::DataError(e.to_string()))?;
        Self::new(id, matrix)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier with tabs replaced, as used for matrix and report labels
    pub fn label(&self) -> String {
        normalize_id(&self.id)
    }

    /// Returns the same motif under a new identifier
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Motif {
            id: id.into(),
            matrix: self.matrix,
        }
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// Sum of the first row, i.e. the number of sites for a count matrix
    pub fn total_count(&self) -> f64 {
        self.matrix.row(0).sum()
    }

    /// Row-normalized copy of the matrix; empty rows become uniform
    pub fn frequencies(&self) -> Array2<f64> {
        let mut freqs = self.matrix.clone();
        for mut row in freqs.axis_iter_mut(Axis(0)) {
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            } else {
                row.fill(0.25);
            }
        }
        freqs
    }

    /// Count matrix with `sites` observations at every position
    pub fn scaled_to(&self, sites: f64) -> Motif {
        Motif {
            id: self.id.clone(),
            matrix: self.frequencies() * sites,
        }
    }

    /// Fraction of C and G over all positions, computed on frequencies
    pub fn gc_content(&self) -> f64 {
        let freqs = self.frequencies();
        let gc: f64 = freqs
            .axis_iter(Axis(0))
            .map(|row| row[NUCLEOTIDE_INDEX[&'C']] + row[NUCLEOTIDE_INDEX[&'G']])
            .sum();
        gc / self.len() as f64
    }

    /// Reverse complement: positions reversed and A<->T, C<->G swapped
    pub fn reverse_complement(&self) -> Motif {
        Motif {
            id: self.id.clone(),
            matrix: self.matrix.slice(s![..;-1, ..;-1]).to_owned(),
        }
    }

    /// Consensus sequence, one symbol per position
    ///
    /// Positions where no nucleotide reaches a frequency of 0.5 are reported as `N`.
    pub fn consensus(&self) -> String {
        self.frequencies()
            .axis_iter(Axis(0))
            .map(consensus_symbol)
            .collect()
    }

    /// Combines this motif with `other` into a new position-wise summed motif
    ///
    /// `offset` is the start of `other` relative to this motif, and `orientation`
    /// tells whether `other` must be reverse-complemented first, matching the
    /// alignment reported by a [`crate::compare::MotifComparer`]. Positions covered
    /// by only one of the two motifs receive a uniform background row for the
    /// missing one, weighted by that motif's total count, so every position of the
    /// result carries the weight of both inputs.
    ///
    /// The merged motif keeps this motif's identifier; callers rename it.
    pub fn average(&self, other: &Motif, offset: isize, orientation: Orientation) -> Motif {
        let second = match orientation {
            Orientation::Forward => other.clone(),
            Orientation::Reverse => other.reverse_complement(),
        };

        let (lead_first, lead_second) = if offset >= 0 {
            (0, offset.unsigned_abs())
        } else {
            (offset.unsigned_abs(), 0)
        };
        let width = (lead_first + self.len()).max(lead_second + second.len());

        let merged = padded(&self.matrix, lead_first, width, self.total_count() / 4.0)
            + padded(&second.matrix, lead_second, width, second.total_count() / 4.0);

        Motif {
            id: self.id.clone(),
            matrix: merged,
        }
    }
}

/// Places `matrix` at row `lead` of a `width` x 4 matrix filled with `background`
fn padded(matrix: &Array2<f64>, lead: usize, width: usize, background: f64) -> Array2<f64> {
    let mut out = Array2::from_elem((width, NUCLEOTIDES.len()), background);
    out.slice_mut(s![lead..lead + matrix.nrows(), ..])
        .assign(matrix);
    out
}

fn consensus_symbol(row: ArrayView1<f64>) -> char {
    let (best, freq) = row
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
    if freq >= 0.5 {
        NUCLEOTIDES[best]
    } else {
        'N'
    }
}
