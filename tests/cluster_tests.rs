use motif_clust::cluster::{cluster_motifs, ClusterAssignment};
use motif_clust::error::MotifError;
use motif_clust::linkage::{fcluster, linkage, LinkageMethod, Merge};
use motif_clust::matrix::DistanceMatrix;
use ndarray::array;

const ALL_METHODS: [LinkageMethod; 7] = [
    LinkageMethod::Single,
    LinkageMethod::Complete,
    LinkageMethod::Average,
    LinkageMethod::Weighted,
    LinkageMethod::Centroid,
    LinkageMethod::Median,
    LinkageMethod::Ward,
];

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn abc_matrix() -> DistanceMatrix {
    DistanceMatrix::new(
        labels(&["A", "B", "C"]),
        array![[0.0, 0.1, 0.8], [0.1, 0.0, 0.7], [0.8, 0.7, 0.0]],
    )
    .unwrap()
}

/// Points 0, 1, 3 and 7 on a line
fn line_distances() -> Vec<f64> {
    vec![1.0, 3.0, 7.0, 2.0, 6.0, 4.0]
}

#[test]
fn test_abc_scenario_all_methods() {
    let matrix = abc_matrix();
    for method in ALL_METHODS {
        let (tree, clusters) = cluster_motifs(&matrix, 0.5, method).unwrap();
        assert_eq!(tree.merges().len(), 2);
        assert_eq!(clusters.len(), 2, "method {}", method);
        assert_eq!(clusters.cluster_of("A"), clusters.cluster_of("B"));
        assert_ne!(clusters.cluster_of("A"), clusters.cluster_of("C"));
    }
}

#[test]
fn test_abc_average_linkage() {
    let (tree, clusters) = cluster_motifs(&abc_matrix(), 0.5, LinkageMethod::Average).unwrap();

    assert_eq!(
        tree.merges()[0],
        Merge {
            left: 0,
            right: 1,
            distance: 0.1,
            size: 2
        }
    );
    assert_eq!(tree.merges()[1].left, 2);
    assert_eq!(tree.merges()[1].right, 3);
    assert!((tree.merges()[1].distance - 0.75).abs() < 1e-12);

    // clusters are numbered in dendrogram order
    assert_eq!(clusters.get("Cluster_1").unwrap(), &["C".to_string()]);
    assert_eq!(
        clusters.get("Cluster_2").unwrap(),
        &["A".to_string(), "B".to_string()]
    );
}

#[test]
fn test_single_and_complete_heights() {
    let single = linkage(&line_distances(), LinkageMethod::Single).unwrap();
    let heights: Vec<f64> = single.merges().iter().map(|m| m.distance).collect();
    assert_eq!(heights, vec![1.0, 2.0, 4.0]);
    assert_eq!((single.merges()[1].left, single.merges()[1].right), (2, 4));
    assert_eq!(single.merges()[2].size, 4);

    let complete = linkage(&line_distances(), LinkageMethod::Complete).unwrap();
    let heights: Vec<f64> = complete.merges().iter().map(|m| m.distance).collect();
    assert_eq!(heights, vec![1.0, 3.0, 7.0]);
    assert_eq!((complete.merges()[2].left, complete.merges()[2].right), (3, 5));

    let z = single.to_array();
    assert_eq!(z.dim(), (3, 4));
    assert_eq!(z.row(0).to_vec(), vec![0.0, 1.0, 1.0, 2.0]);
}

#[test]
fn test_fcluster_threshold() {
    let tree = linkage(&line_distances(), LinkageMethod::Single).unwrap();

    assert_eq!(fcluster(&tree, 2.5), vec![2, 2, 2, 1]);
    assert_eq!(fcluster(&tree, 10.0), vec![1, 1, 1, 1]);
    assert_eq!(fcluster(&tree, 0.5), vec![3, 4, 2, 1]);
    // a merge exactly at the threshold is kept
    assert_eq!(fcluster(&tree, 1.0), vec![3, 3, 2, 1]);
}

#[test]
fn test_clustering_is_deterministic() {
    let matrix = DistanceMatrix::new(
        labels(&["A", "B", "C", "D"]),
        array![
            [0.0, 0.2, 0.2, 0.9],
            [0.2, 0.0, 0.2, 0.9],
            [0.2, 0.2, 0.0, 0.9],
            [0.9, 0.9, 0.9, 0.0]
        ],
    )
    .unwrap();

    for method in ALL_METHODS {
        let first = cluster_motifs(&matrix, 0.5, method).unwrap();
        let second = cluster_motifs(&matrix, 0.5, method).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_degenerate_input() {
    let single = DistanceMatrix::new(labels(&["A"]), array![[0.0]]).unwrap();
    assert!(matches!(
        cluster_motifs(&single, 0.5, LinkageMethod::Average),
        Err(MotifError::DegenerateClustering { n: 1 })
    ));
    assert!(matches!(
        linkage(&[], LinkageMethod::Single),
        Err(MotifError::DegenerateClustering { n: 1 })
    ));
    assert!(matches!(
        linkage(&[0.1, 0.2], LinkageMethod::Single),
        Err(MotifError::InvalidInput(_))
    ));
    assert!(matches!(
        linkage(&[f64::NAN], LinkageMethod::Single),
        Err(MotifError::InvalidInput(_))
    ));
}

#[test]
fn test_cluster_assignment_from_labels() {
    let names = labels(&["m1", "m2", "m3", "m4"]);
    let clusters = ClusterAssignment::from_labels(&[2, 1, 2, 3], &names).unwrap();

    let listed: Vec<(String, Vec<String>)> = clusters
        .iter()
        .map(|(name, members)| (name, members.to_vec()))
        .collect();
    // clusters are listed in order of first appearance
    assert_eq!(
        listed,
        vec![
            ("Cluster_2".to_string(), labels(&["m1", "m3"])),
            ("Cluster_1".to_string(), labels(&["m2"])),
            ("Cluster_3".to_string(), labels(&["m4"])),
        ]
    );
    assert_eq!(clusters.cluster_of("m3"), Some("Cluster_2".to_string()));
    assert!(clusters.get("Cluster_9").is_none());

    assert!(ClusterAssignment::from_labels(&[1], &names).is_err());
    assert!(ClusterAssignment::from_labels(&[0, 1, 1, 1], &names).is_err());
}

#[test]
fn test_linkage_method_names() {
    for method in ALL_METHODS {
        let parsed: LinkageMethod = method.to_string().parse().unwrap();
        assert_eq!(parsed, method);
    }
    assert!("upgma".parse::<LinkageMethod>().is_err());
}
