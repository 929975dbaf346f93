use motif_clust::compare::{AlignmentComparer, Metric};
use motif_clust::config::ClusterConfig;
use motif_clust::error::MotifError;
use motif_clust::linkage::LinkageMethod;
use motif_clust::motif::{Motif, NUCLEOTIDE_INDEX};
use motif_clust::pipeline::run;
use std::borrow::Cow;

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

#[test]
fn test_identical_motifs_form_one_cluster() {
    let motifs = vec![motif("A", "ACGTAC"), motif("B", "ACGTAC")];
    let result = run(&motifs, &ClusterConfig::default(), &AlignmentComparer::new()).unwrap();

    let distance = result.matrix.get("A", "B").unwrap();
    assert_eq!(distance, 0.0);
    assert!(distance.is_sign_positive());
    assert!(result.dissimilar.is_empty());

    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.consensus.len(), 1);
    assert_eq!(result.consensus[0].merges, 1);
    assert_eq!(result.consensus[0].labelled().id(), "Cluster_1_A_B");
    assert_eq!(result.consensus[0].motif.consensus(), "ACGTAC");
}

#[test]
fn test_unrelated_motif_gets_own_cluster() {
    let motifs = vec![
        motif("A", "ACGTAC"),
        motif("B", "ACGTAC"),
        motif("C", "TTTTTT"),
    ];
    let result = run(&motifs, &ClusterConfig::default(), &AlignmentComparer::new()).unwrap();

    assert!(result.matrix.get("A", "C").unwrap() > 0.5);
    assert_eq!(result.linkage.as_ref().unwrap().merges().len(), 2);
    assert_eq!(result.clusters.len(), 2);
    assert_eq!(result.clusters.cluster_of("A"), result.clusters.cluster_of("B"));
    assert_eq!(result.clusters.cluster_of("C"), Some("Cluster_1".to_string()));

    let singleton = result
        .consensus
        .iter()
        .find(|c| c.cluster == "Cluster_1")
        .unwrap();
    assert!(matches!(singleton.motif, Cow::Borrowed(m) if std::ptr::eq(m, &motifs[2])));
}

#[test]
fn test_single_motif_skips_linkage() {
    let motifs = vec![motif("A", "ACGTAC")];
    let result = run(&motifs, &ClusterConfig::default(), &AlignmentComparer::new()).unwrap();

    assert!(result.linkage.is_none());
    assert_eq!(result.matrix.len(), 1);
    assert_eq!(result.clusters.get("Cluster_1").unwrap(), &["A".to_string()]);
    assert_eq!(result.consensus.len(), 1);
    assert!(matches!(result.consensus[0].motif, Cow::Borrowed(_)));
    assert_eq!(result.consensus[0].labelled().id(), "Cluster_1_A");
}

#[test]
fn test_invalid_runs() {
    let comparer = AlignmentComparer::new();
    let config = ClusterConfig::default();

    assert!(matches!(
        run(&[], &config, &comparer),
        Err(MotifError::EmptyMotifSet)
    ));

    let duplicates = vec![motif("A", "ACGT"), motif("A", "TTGG")];
    assert!(matches!(
        run(&duplicates, &config, &comparer),
        Err(MotifError::DuplicateMotifId(ref id)) if id == "A"
    ));

    let bad = ClusterConfig {
        threshold: -1.0,
        ..ClusterConfig::default()
    };
    let motifs = vec![motif("A", "ACGT")];
    assert!(matches!(
        run(&motifs, &bad, &comparer),
        Err(MotifError::InvalidParameter { .. })
    ));
}

#[test]
fn test_config_from_yaml() {
    let config: ClusterConfig = serde_yaml::from_str("threshold: 0.3\nlinkage: ward\n").unwrap();
    assert_eq!(config.threshold, 0.3);
    assert_eq!(config.linkage, LinkageMethod::Ward);
    assert_eq!(config.metric, Metric::Pcc);
    assert!(config.validate().is_ok());

    let default = ClusterConfig::default();
    assert_eq!(default.threshold, 0.5);
    assert_eq!(default.linkage, LinkageMethod::Average);
}
