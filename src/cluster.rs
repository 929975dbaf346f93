use crate::error::{MotifError, Result};
use crate::linkage::{fcluster, linkage, Linkage, LinkageMethod};
use crate::matrix::DistanceMatrix;
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Flat clusters keyed by their 1-based ordinal
///
/// Clusters are exposed under names of the form `Cluster_<n>` and are listed in
/// the order their first member was assigned, not by ordinal. Within a cluster,
/// motif labels keep the order in which they were assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAssignment {
    clusters: Vec<(usize, Vec<String>)>,
}

impl ClusterAssignment {
    /// Groups `names[i]` under cluster `labels[i]`
    ///
    /// # Errors
    /// * `MotifError::InvalidInput` if the slices differ in length or a label is 0
    pub fn from_labels(labels: &[usize], names: &[String]) -> Result<Self> {
        if labels.len() != names.len() {
            return Err(MotifError::InvalidInput(format!(
                "{} cluster labels for {} motifs",
                labels.len(),
                names.len()
            )));
        }
        let mut clusters: Vec<(usize, Vec<String>)> = Vec::new();
        for (&label, name) in labels.iter().zip(names) {
            if label == 0 {
                return Err(MotifError::InvalidInput(format!(
                    "cluster labels are 1-based, got 0 for {}",
                    name
                )));
            }
            match clusters.iter_mut().find(|(ordinal, _)| *ordinal == label) {
                Some((_, members)) => members.push(name.clone()),
                None => clusters.push((label, vec![name.clone()])),
            }
        }
        Ok(ClusterAssignment { clusters })
    }

    /// A single cluster holding one motif
    pub fn singleton(name: impl Into<String>) -> Self {
        ClusterAssignment {
            clusters: vec![(1, vec![name.into()])],
        }
    }

    pub fn cluster_name(ordinal: usize) -> String {
        format!("Cluster_{}", ordinal)
    }

    /// Clusters in order of first appearance as `(name, members)`
    pub fn iter(&self) -> impl Iterator<Item = (String, &[String])> + '_ {
        self.clusters
            .iter()
            .map(|(n, members)| (Self::cluster_name(*n), members.as_slice()))
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        let ordinal = name.strip_prefix("Cluster_")?.parse::<usize>().ok()?;
        self.clusters
            .iter()
            .find(|(n, _)| *n == ordinal)
            .map(|(_, members)| members.as_slice())
    }

    /// Name of the cluster containing `label`
    pub fn cluster_of(&self, label: &str) -> Option<String> {
        self.clusters
            .iter()
            .find(|(_, members)| members.iter().any(|m| m == label))
            .map(|(n, _)| Self::cluster_name(*n))
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl Serialize for ClusterAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clusters.len()))?;
        for (name, members) in self.iter() {
            map.serialize_entry(&name, members)?;
        }
        map.end()
    }
}

/// Clusters the motifs of a distance matrix hierarchically
///
/// The matrix is condensed in row-label order, clustered with `method`, and the
/// tree is cut so that every flat cluster has a maximum merge distance of at most
/// `threshold`.
///
/// # Returns
/// * The full merge tree and the flat clusters over the matrix row labels
///
/// # Errors
/// * `MotifError::DegenerateClustering` if the matrix has fewer than two motifs;
///   callers wanting a trivial cluster for a single motif must check beforehand
pub fn cluster_motifs(
    matrix: &DistanceMatrix,
    threshold: f64,
    method: LinkageMethod,
) -> Result<(Linkage, ClusterAssignment)> {
    if matrix.len() < 2 {
        return Err(MotifError::DegenerateClustering { n: matrix.len() });
    }

    let tree = linkage(&matrix.condensed(), method)?;
    let labels = fcluster(&tree, threshold);
    let clusters = ClusterAssignment::from_labels(&labels, matrix.rows())?;

    debug!(
        "Cut {} linkage at {}: {} clusters",
        method,
        threshold,
        clusters.len()
    );

    Ok((tree, clusters))
}
