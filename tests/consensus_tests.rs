use motif_clust::cluster::ClusterAssignment;
use motif_clust::compare::{AlignmentComparer, Combine, Metric, MotifComparer};
use motif_clust::consensus::{build_consensus, consensus_motifs};
use motif_clust::error::MotifError;
use motif_clust::motif::{Motif, NUCLEOTIDE_INDEX};
use motif_clust::types::{Orientation, PairwiseScore, ScoreMap};
use std::borrow::Cow;

/// Count matrix with 10 sites per position following `sequence`
fn motif(id: &str, sequence: &str) -> Motif {
    let rows: Vec<[f64; 4]> = sequence
        .chars()
        .map(|c| {
            let mut row = [0.0; 4];
            row[NUCLEOTIDE_INDEX[&c]] = 10.0;
            row
        })
        .collect();
    Motif::from_rows(id, &rows).unwrap()
}

fn scores_for(motifs: &[&Motif], pairs: &[(&str, &str, f64)]) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for a in motifs {
        for b in motifs {
            let similarity = if a.id() == b.id() {
                1.0
            } else {
                pairs
                    .iter()
                    .find(|(x, y, _)| {
                        (*x == a.id() && *y == b.id()) || (*x == b.id() && *y == a.id())
                    })
                    .map(|p| p.2)
                    .unwrap_or(0.0)
            };
            scores.insert(a.id(), b.id(), PairwiseScore::new(similarity, 0, Orientation::Forward));
        }
    }
    scores
}

#[test]
fn test_singleton_returns_original_motif() {
    let a = motif("A", "ACGT");
    let comparer = AlignmentComparer::new();

    let consensus = build_consensus("Cluster_1", vec![&a], &ScoreMap::new(), &comparer).unwrap();

    assert_eq!(consensus.merges, 0);
    assert!(matches!(consensus.motif, Cow::Borrowed(m) if std::ptr::eq(m, &a)));
    assert_eq!(consensus.motif.id(), "A");
    assert_eq!(consensus.labelled().id(), "Cluster_1_A");
}

#[test]
fn test_most_similar_pair_merges_first() {
    let a = motif("A", "ACGT");
    let b = motif("B", "ACGA");
    let c = motif("C", "TTTT");
    let scores = scores_for(&[&a, &b, &c], &[("A", "B", 0.9), ("A", "C", 0.2), ("B", "C", 0.3)]);

    let consensus =
        build_consensus("Cluster_1", vec![&a, &b, &c], &scores, &AlignmentComparer::new()).unwrap();

    // A and B merge first and the average is appended after C
    assert_eq!(consensus.motif.id(), "C_A_B");
    assert_eq!(consensus.merges, 2);
}

#[test]
fn test_ties_favor_later_pair() {
    let a = motif("A", "ACGT");
    let b = motif("B", "ACGA");
    let c = motif("C", "ACCA");
    let scores = scores_for(&[&a, &b, &c], &[("A", "B", 0.9), ("A", "C", 0.1), ("B", "C", 0.9)]);

    let consensus =
        build_consensus("Cluster_1", vec![&a, &b, &c], &scores, &AlignmentComparer::new()).unwrap();

    // (B, C) is enumerated after (A, B) and wins the tie
    assert_eq!(consensus.motif.id(), "A_B_C");
}

#[test]
fn test_cluster_of_k_needs_k_minus_one_merges() {
    let motifs = [
        motif("m1", "ACGTAC"),
        motif("m2", "ACGTAA"),
        motif("m3", "CCGTAC"),
        motif("m4", "ACGTTC"),
        motif("m5", "GCGTAC"),
    ];
    let members: Vec<&Motif> = motifs.iter().collect();
    let comparer = AlignmentComparer::new();
    let scores = comparer.compare_all(&members, &members, Metric::Pcc, Combine::Mean);

    let consensus = build_consensus("Cluster_3", members, &scores, &comparer).unwrap();

    assert_eq!(consensus.merges, 4);
    assert!(matches!(consensus.motif, Cow::Owned(_)));
    let mut parents: Vec<&str> = consensus.motif.id().split('_').collect();
    parents.sort();
    assert_eq!(parents, vec!["m1", "m2", "m3", "m4", "m5"]);
}

#[test]
fn test_merge_uses_recorded_alignment() {
    let a = motif("A", "TTGG");
    let b = motif("B", "GG");
    let mut scores = ScoreMap::new();
    for (x, y) in [("A", "A"), ("B", "B")] {
        scores.insert(x, y, PairwiseScore::new(1.0, 0, Orientation::Forward));
    }
    scores.insert("A", "B", PairwiseScore::new(0.5, 2, Orientation::Forward));
    scores.insert("B", "A", PairwiseScore::new(0.5, -2, Orientation::Forward));

    let consensus =
        build_consensus("Cluster_1", vec![&a, &b], &scores, &AlignmentComparer::new()).unwrap();

    assert_eq!(consensus.motif.id(), "A_B");
    assert_eq!(consensus.motif.len(), 4);
    assert_eq!(consensus.motif.consensus(), "TTGG");
    assert_eq!(consensus.motif.matrix()[[2, 2]], 20.0);
}

#[test]
fn test_consensus_per_cluster() {
    let motifs = vec![motif("A", "ACGT"), motif("C", "TTTT"), motif("B", "ACGA")];
    let refs: Vec<&Motif> = motifs.iter().collect();
    let scores = scores_for(&refs, &[("A", "B", 0.9), ("A", "C", 0.2), ("B", "C", 0.3)]);
    let clusters = ClusterAssignment::from_labels(
        &[1, 2, 1],
        &["A".to_string(), "C".to_string(), "B".to_string()],
    )
    .unwrap();

    let consensus =
        consensus_motifs(&motifs, &clusters, &scores, &AlignmentComparer::new()).unwrap();

    assert_eq!(consensus.len(), 2);
    assert_eq!(consensus[0].cluster, "Cluster_1");
    assert_eq!(consensus[0].merges, 1);
    assert_eq!(consensus[0].labelled().id(), "Cluster_1_A_B");
    assert_eq!(consensus[1].cluster, "Cluster_2");
    assert!(matches!(consensus[1].motif, Cow::Borrowed(m) if std::ptr::eq(m, &motifs[1])));
    assert_eq!(consensus[1].labelled().id(), "Cluster_2_C");
}

#[test]
fn test_empty_cluster_is_an_error() {
    let comparer = AlignmentComparer::new();
    let result = build_consensus("Cluster_7", Vec::new(), &ScoreMap::new(), &comparer);
    assert!(matches!(result, Err(MotifError::InvalidClusterState(ref c)) if c == "Cluster_7"));

    let motifs = vec![motif("A", "ACGT")];
    let clusters = ClusterAssignment::singleton("missing");
    let result = consensus_motifs(&motifs, &clusters, &ScoreMap::new(), &comparer);
    assert!(matches!(result, Err(MotifError::InvalidClusterState(_))));
}

#[test]
fn test_merged_name_clashing_with_member_is_an_error() {
    let a = motif("A", "ACGT");
    let b = motif("B", "ACGA");
    let ab = motif("A_B", "TTTT");
    let scores = scores_for(
        &[&a, &b, &ab],
        &[("A", "B", 0.9), ("A", "A_B", 0.1), ("B", "A_B", 0.1)],
    );

    let comparer = AlignmentComparer::new();
    let result = build_consensus("Cluster_1", vec![&a, &b, &ab], &scores, &comparer);
    assert!(matches!(result, Err(MotifError::DuplicateMotifId(ref id)) if id == "A_B"));
}

#[test]
fn test_missing_score_is_reported() {
    let a = motif("A", "ACGT");
    let b = motif("B", "ACGA");
    let comparer = AlignmentComparer::new();
    let result = build_consensus("Cluster_1", vec![&a, &b], &ScoreMap::new(), &comparer);
    assert!(matches!(result, Err(MotifError::MissingScore { .. })));
}
