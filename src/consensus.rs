use crate::cluster::ClusterAssignment;
use crate::compare::{Combine, Metric, MotifComparer};
use crate::error::{MotifError, Result};
use crate::motif::Motif;
use crate::types::{PairwiseScore, ScoreMap};
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::HashSet;

/// Consensus of one cluster
///
/// A single-member cluster borrows its member unchanged; larger clusters own
/// the motif produced by the last merge.
#[derive(Debug, Clone)]
pub struct ConsensusMotif<'a> {
    pub cluster: String,
    pub motif: Cow<'a, Motif>,
    /// Number of pairwise merges performed, one less than the cluster size
    pub merges: usize,
}

impl ConsensusMotif<'_> {
    /// Copy of the consensus renamed to `<cluster>_<id>` for output
    pub fn labelled(&self) -> Motif {
        let id = format!("{}_{}", self.cluster, self.motif.id());
        self.motif.as_ref().clone().with_id(id)
    }
}

/// Most similar pair of the working list
///
/// Pairs are enumerated as `(0, 1), (0, 2), ..., (1, 2), ...` and a pair replaces
/// the running best when its similarity is greater than *or equal to* it, so the
/// last of several tied pairs is chosen.
fn most_similar_pair(
    working: &[Cow<'_, Motif>],
    scores: &ScoreMap,
) -> Result<(usize, usize, PairwiseScore)> {
    let mut best: Option<(usize, usize, PairwiseScore)> = None;
    for (i, j) in (0..working.len()).tuple_combinations() {
        let score = *scores.score(working[i].id(), working[j].id())?;
        if best.map_or(true, |(_, _, current)| score.similarity >= current.similarity) {
            best = Some((i, j, score));
        }
    }
    best.ok_or_else(|| MotifError::InvalidInput("fewer than two motifs to merge".into()))
}

/// Reduces the members of one cluster to a single consensus motif
///
/// The two most similar motifs (according to `scores` for the first round) are
/// averaged using their recorded offset and orientation; the average, named
/// `<first>_<second>`, replaces both parents at the end of the working list. The
/// new list is then re-scored with `comparer` (Pearson correlation, mean over
/// positions) and the process repeats until one motif is left, i.e. after
/// `members.len() - 1` merges.
///
/// # Errors
/// * `MotifError::InvalidClusterState` if `members` is empty
/// * `MotifError::MissingScore` if `scores` lacks a pair of the initial members
/// * `MotifError::DuplicateMotifId` if a merged name equals a remaining member's id
pub fn build_consensus<'a, C: MotifComparer>(
    cluster: &str,
    members: Vec<&'a Motif>,
    scores: &ScoreMap,
    comparer: &C,
) -> Result<ConsensusMotif<'a>> {
    if members.is_empty() {
        return Err(MotifError::InvalidClusterState(cluster.to_string()));
    }

    let mut working: Vec<Cow<'a, Motif>> = members.into_iter().map(Cow::Borrowed).collect();
    let mut rescored: Option<ScoreMap> = None;
    let mut merges = 0;

    while working.len() > 1 {
        let current = rescored.as_ref().unwrap_or(scores);
        let (i, j, score) = most_similar_pair(&working, current)?;

        let id = format!("{}_{}", working[i].id(), working[j].id());
        // scores are keyed by id, so the merged motif must not shadow a remaining one
        if working.iter().any(|motif| motif.id() == id) {
            return Err(MotifError::DuplicateMotifId(id));
        }
        debug!(
            "{}: merging {} and {} (similarity {:.4}, offset {}, orientation {})",
            cluster,
            working[i].id(),
            working[j].id(),
            score.similarity,
            score.offset,
            score.orientation
        );
        let merged = working[i]
            .average(&working[j], score.offset, score.orientation)
            .with_id(id);

        working = working
            .into_iter()
            .enumerate()
            .filter(|&(k, _)| k != i && k != j)
            .map(|(_, motif)| motif)
            .chain(std::iter::once(Cow::Owned(merged)))
            .collect();
        merges += 1;

        if working.len() > 1 {
            rescored = Some(comparer.compare_all(&working, &working, Metric::Pcc, Combine::Mean));
        }
    }

    let motif = working
        .pop()
        .ok_or_else(|| MotifError::InvalidClusterState(cluster.to_string()))?;

    Ok(ConsensusMotif {
        cluster: cluster.to_string(),
        motif,
        merges,
    })
}

/// Builds one consensus motif per cluster
///
/// Members are taken from `motifs` in input order, matched on their normalized
/// label. Clusters are independent and are processed in parallel; the result
/// follows cluster order.
///
/// # Errors
/// * `MotifError::InvalidClusterState` if a cluster matches none of `motifs`
/// * Any error from [`build_consensus`]
pub fn consensus_motifs<'a, C: MotifComparer>(
    motifs: &'a [Motif],
    clusters: &ClusterAssignment,
    scores: &ScoreMap,
    comparer: &C,
) -> Result<Vec<ConsensusMotif<'a>>> {
    let labels: Vec<String> = motifs.iter().map(Motif::label).collect();

    clusters
        .iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(name, ids)| {
            let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
            let members: Vec<&Motif> = motifs
                .iter()
                .zip(&labels)
                .filter(|(_, label)| wanted.contains(label.as_str()))
                .map(|(motif, _)| motif)
                .collect();
            build_consensus(&name, members, scores, comparer)
        })
        .collect()
}
