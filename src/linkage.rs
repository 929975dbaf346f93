//! Agglomerative hierarchical clustering over a condensed distance vector
//!
//! The merge tree uses the usual encoding: leaves are numbered `0..n`, the
//! cluster created by merge `k` is numbered `n + k`, and each merge lists the
//! smaller node id first.

use crate::error::{MotifError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inter-cluster distance update rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageMethod {
    Single,
    Complete,
    Average,
    Weighted,
    Centroid,
    Median,
    Ward,
}

impl LinkageMethod {
    /// Distance from cluster `i` to the union of clusters `x` and `y`
    ///
    /// `d_xi`, `d_yi` and `d_xy` are the current distances, `size_*` the cluster
    /// sizes. Centroid, median and ward work on squared distances; a negative
    /// radicand (possible when the input is not Euclidean) yields 0.
    fn update(
        self,
        d_xi: f64,
        d_yi: f64,
        d_xy: f64,
        size_x: usize,
        size_y: usize,
        size_i: usize,
    ) -> f64 {
        let (sx, sy, si) = (size_x as f64, size_y as f64, size_i as f64);
        match self {
            LinkageMethod::Single => d_xi.min(d_yi),
            LinkageMethod::Complete => d_xi.max(d_yi),
            LinkageMethod::Average => (sx * d_xi + sy * d_yi) / (sx + sy),
            LinkageMethod::Weighted => 0.5 * (d_xi + d_yi),
            LinkageMethod::Centroid => {
                let radicand = (sx * d_xi * d_xi + sy * d_yi * d_yi) / (sx + sy)
                    - sx * sy * d_xy * d_xy / ((sx + sy) * (sx + sy));
                radicand.max(0.0).sqrt()
            }
            LinkageMethod::Median => {
                let radicand = 0.5 * (d_xi * d_xi + d_yi * d_yi) - 0.25 * d_xy * d_xy;
                radicand.max(0.0).sqrt()
            }
            LinkageMethod::Ward => {
                let t = 1.0 / (sx + sy + si);
                let radicand = (si + sx) * t * d_xi * d_xi + (si + sy) * t * d_yi * d_yi
                    - si * t * d_xy * d_xy;
                radicand.max(0.0).sqrt()
            }
        }
    }
}

impl FromStr for LinkageMethod {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(LinkageMethod::Single),
            "complete" => Ok(LinkageMethod::Complete),
            "average" => Ok(LinkageMethod::Average),
            "weighted" => Ok(LinkageMethod::Weighted),
            "centroid" => Ok(LinkageMethod::Centroid),
            "median" => Ok(LinkageMethod::Median),
            "ward" => Ok(LinkageMethod::Ward),
            _ => Err(MotifError::invalid_parameter(
                "linkage method",
                s,
                "expected one of single, complete, average, weighted, centroid, median, ward",
            )),
        }
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkageMethod::Single => "single",
            LinkageMethod::Complete => "complete",
            LinkageMethod::Average => "average",
            LinkageMethod::Weighted => "weighted",
            LinkageMethod::Centroid => "centroid",
            LinkageMethod::Median => "median",
            LinkageMethod::Ward => "ward",
        };
        f.write_str(name)
    }
}

/// One agglomeration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    /// Number of leaves under the new node
    pub size: usize,
}

/// Full merge tree over `leaves` observations
#[derive(Debug, Clone, PartialEq)]
pub struct Linkage {
    leaves: usize,
    merges: Vec<Merge>,
}

impl Linkage {
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// `(n - 1) x 4` array of `[left, right, distance, size]` rows
    pub fn to_array(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.merges.len(), 4));
        for (k, merge) in self.merges.iter().enumerate() {
            out[[k, 0]] = merge.left as f64;
            out[[k, 1]] = merge.right as f64;
            out[[k, 2]] = merge.distance;
            out[[k, 3]] = merge.size as f64;
        }
        out
    }

    fn children(&self, node: usize) -> Option<(usize, usize)> {
        node.checked_sub(self.leaves)
            .and_then(|k| self.merges.get(k))
            .map(|m| (m.left, m.right))
    }

    fn leaves_under(&self, node: usize) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match self.children(current) {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => found.push(current),
            }
        }
        found
    }
}

/// Number of observations behind a condensed vector of length `len`
fn observations(len: usize) -> Result<usize> {
    let n = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    if n * (n - 1) / 2 != len {
        return Err(MotifError::InvalidInput(format!(
            "condensed distance vector of length {} is not triangular",
            len
        )));
    }
    Ok(n)
}

/// Runs agglomerative clustering on a condensed distance vector
///
/// At every step the two closest active clusters are merged (the first pair in
/// row-major order wins ties) and distances to the new cluster are derived with
/// the Lance-Williams style update of `method`.
///
/// # Errors
/// * `MotifError::DegenerateClustering` if the vector describes fewer than two observations
/// * `MotifError::InvalidInput` if the length is not triangular or a distance is not finite
pub fn linkage(condensed: &[f64], method: LinkageMethod) -> Result<Linkage> {
    let n = observations(condensed.len())?;
    if n < 2 {
        return Err(MotifError::DegenerateClustering { n });
    }
    if let Some(bad) = condensed.iter().find(|d| !d.is_finite()) {
        return Err(MotifError::InvalidInput(format!(
            "distance matrix contains non-finite value {}",
            bad
        )));
    }

    let mut dist = Array2::<f64>::zeros((n, n));
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            dist[[i, j]] = condensed[k];
            dist[[j, i]] = condensed[k];
            k += 1;
        }
    }

    let mut active = vec![true; n];
    let mut size = vec![1usize; n];
    let mut node = (0..n).collect::<Vec<usize>>();
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..n - 1 {
        let mut closest: Option<(usize, usize, f64)> = None;
        for x in (0..n).filter(|&x| active[x]) {
            for y in ((x + 1)..n).filter(|&y| active[y]) {
                let d = dist[[x, y]];
                if closest.map_or(true, |(_, _, best)| d < best) {
                    closest = Some((x, y, d));
                }
            }
        }
        let Some((x, y, d_xy)) = closest else {
            return Err(MotifError::InvalidInput(
                "no active clusters left to merge".into(),
            ));
        };

        merges.push(Merge {
            left: node[x].min(node[y]),
            right: node[x].max(node[y]),
            distance: d_xy,
            size: size[x] + size[y],
        });

        // the merged cluster takes over slot y
        for i in (0..n).filter(|&i| active[i] && i != x && i != y) {
            let d = method.update(
                dist[[x, i]],
                dist[[y, i]],
                d_xy,
                size[x],
                size[y],
                size[i],
            );
            dist[[y, i]] = d;
            dist[[i, y]] = d;
        }
        active[x] = false;
        size[y] += size[x];
        node[y] = n + step;
    }

    Ok(Linkage { leaves: n, merges })
}

/// Flat cluster labels from a distance cut of the merge tree
///
/// A subtree becomes one cluster when the largest merge distance inside it is
/// at most `threshold`. Labels start at 1 and are handed out in left-to-right
/// order of the tree; `labels[i]` belongs to leaf `i`.
pub fn fcluster(linkage: &Linkage, threshold: f64) -> Vec<usize> {
    let n = linkage.leaves;
    let mut labels = vec![0; n];
    if linkage.merges.is_empty() {
        for (i, label) in labels.iter_mut().enumerate() {
            *label = i + 1;
        }
        return labels;
    }

    // monotone heights, so inversions from centroid/median cannot split a subtree
    let mut max_dist = Vec::with_capacity(linkage.merges.len());
    for merge in &linkage.merges {
        let mut height = merge.distance;
        for child in [merge.left, merge.right] {
            if let Some(k) = child.checked_sub(n) {
                height = height.max(max_dist[k]);
            }
        }
        max_dist.push(height);
    }

    let root = n + linkage.merges.len() - 1;
    let mut next = 0;
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        match current.checked_sub(n) {
            Some(k) if max_dist[k] > threshold => {
                let merge = &linkage.merges[k];
                stack.push(merge.right);
                stack.push(merge.left);
            }
            _ => {
                next += 1;
                for leaf in linkage.leaves_under(current) {
                    labels[leaf] = next;
                }
            }
        }
    }
    labels
}
