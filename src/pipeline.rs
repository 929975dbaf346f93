use crate::cluster::{cluster_motifs, ClusterAssignment};
use crate::compare::MotifComparer;
use crate::config::ClusterConfig;
use crate::consensus::{consensus_motifs, ConsensusMotif};
use crate::error::{MotifError, Result};
use crate::linkage::Linkage;
use crate::matrix::{build_distance_matrix, dissimilar_motifs, DistanceMatrix};
use crate::motif::Motif;
use crate::types::ScoreMap;
use log::{debug, info};
use std::collections::HashSet;

/// Everything computed by [`run`]
#[derive(Debug, Clone)]
pub struct ClusterRun<'a> {
    pub scores: ScoreMap,
    pub matrix: DistanceMatrix,
    /// Labels of motifs farther than the threshold from every motif
    pub dissimilar: Vec<String>,
    /// `None` when a single motif was given and no tree was built
    pub linkage: Option<Linkage>,
    pub clusters: ClusterAssignment,
    pub consensus: Vec<ConsensusMotif<'a>>,
}

/// Compares, clusters and summarizes a motif collection
///
/// A single motif is placed in a trivial `Cluster_1` without invoking linkage.
///
/// # Errors
/// * `MotifError::EmptyMotifSet` if `motifs` is empty
/// * `MotifError::DuplicateMotifId` if two motifs share a label
/// * `MotifError::InvalidParameter` if `config` is invalid
/// * Any error from the matrix, clustering or consensus steps
pub fn run<'a, C: MotifComparer>(
    motifs: &'a [Motif],
    config: &ClusterConfig,
    comparer: &C,
) -> Result<ClusterRun<'a>> {
    config.validate()?;
    if motifs.is_empty() {
        return Err(MotifError::EmptyMotifSet);
    }
    let mut seen = HashSet::with_capacity(motifs.len());
    for motif in motifs {
        if !seen.insert(motif.label()) {
            return Err(MotifError::DuplicateMotifId(motif.label()));
        }
    }

    info!("Generating similarity matrix");
    let scores = comparer.compare_all(motifs, motifs, config.metric, config.combine);
    let matrix = build_distance_matrix(&scores)?;

    let dissimilar = dissimilar_motifs(&matrix, config.threshold);
    debug!("{} dissimilar motifs", dissimilar.len());

    info!("Clustering motifs");
    let (linkage, clusters) = if matrix.len() == 1 {
        (None, ClusterAssignment::singleton(matrix.rows()[0].clone()))
    } else {
        let (tree, clusters) = cluster_motifs(&matrix, config.threshold, config.linkage)?;
        (Some(tree), clusters)
    };
    info!("- Identified {} clusters", clusters.len());

    info!("Building consensus motifs for each cluster");
    let consensus = consensus_motifs(motifs, &clusters, &scores, comparer)?;

    Ok(ClusterRun {
        scores,
        matrix,
        dissimilar,
        linkage,
        clusters,
        consensus,
    })
}
