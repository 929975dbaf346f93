use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use motif_clust::compare::{AlignmentComparer, Combine, Metric};
use motif_clust::config::ClusterConfig;
use motif_clust::error::MotifError;
use motif_clust::io::{
    read_motifs, write_clusters, write_distance_matrix, write_linkage, write_motif_stats,
    write_motifs, MotifFormat,
};
use motif_clust::linkage::LinkageMethod;
use motif_clust::motif::Motif;
use motif_clust::pipeline;
use motif_clust::stats::{motif_stats, motif_stats_for};
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ClusterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Motif(#[from] MotifError),

    #[error("Output path is not valid UTF-8: {0}")]
    InvalidPath(String),
}

#[derive(Parser)]
#[command(
    name = "cluster-motifs",
    about = "Clusters motifs based on similarity and creates one consensus motif per cluster",
    long_about = "Compares every motif against every other motif, turns the similarities into a \
                  distance matrix, clusters it hierarchically and cuts the tree at the given \
                  threshold. For each cluster the members are merged pairwise, most similar first, \
                  into a single consensus motif.",
    version,
    after_help = "Example usage:\n    \
                  cluster-motifs --motifs motifs.jaspar\n    \
                  cluster-motifs --motifs a.meme b.pfm --threshold 0.3 --clust-method complete",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// One or more motif files (MEME, JASPAR, PFM or TRANSFAC) to compare and cluster
    #[arg(short, long, required = true, num_args = 1..)]
    motifs: Vec<String>,

    /// Clustering threshold, also used to report dissimilar motifs
    #[arg(short, long, default_value = "0.5")]
    threshold: f64,

    /// Metric for comparing motifs [pcc, ed, sdd]
    #[arg(long, default_value = "pcc")]
    dist_method: Metric,

    /// How per-position scores are combined [mean, sum]
    #[arg(long, default_value = "mean")]
    combine: Combine,

    /// Linkage method [single, complete, average, weighted, centroid, median, ward]
    #[arg(long, default_value = "average")]
    clust_method: LinkageMethod,

    /// Format of the consensus motif file [pfm, meme, jaspar, transfac]
    #[arg(short = 'a', long, default_value = "pfm")]
    cons_format: MotifFormat,

    /// Output prefix
    #[arg(short, long, default_value = "motif_comparison")]
    prefix: String,

    /// Output directory, created if it does not exist
    #[arg(short, long, default_value = "ClusterMotifs")]
    outdir: String,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> ClusterConfig {
        ClusterConfig {
            threshold: self.threshold,
            metric: self.dist_method,
            combine: self.combine,
            linkage: self.clust_method,
            consensus_format: self.cons_format,
        }
    }
}

fn output_path(outdir: &str, prefix: &str, suffix: &str) -> Result<String, ClusterError> {
    let path = Path::new(outdir).join(format!("{}_{}", prefix, suffix));
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| ClusterError::InvalidPath(path.display().to_string()))
}

fn main() -> Result<(), ClusterError> {
    let start_time = std::time::Instant::now();

    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).init();

    let config = args.config();
    config.validate()?;
    debug!("Arguments: {:?}", args);

    fs::create_dir_all(&args.outdir)?;

    info!("Handling input file(s)");
    let mut motifs: Vec<Motif> = Vec::new();
    for filename in &args.motifs {
        debug!("Reading {}", filename);
        let (file_motifs, format) = read_motifs(filename)?;
        info!(
            "- Read {} motifs from {} (format: {})",
            file_motifs.len(),
            filename,
            format
        );
        motifs.extend(file_motifs);
    }

    let comparer = AlignmentComparer::new();
    let run = pipeline::run(&motifs, &config, &comparer)?;

    let matrix_out = output_path(&args.outdir, &args.prefix, "matrix.txt")?;
    info!("- Saving similarity matrix to the file: {}", matrix_out);
    write_distance_matrix(&run.matrix, &matrix_out)?;

    info!("Making matrix statistics about dissimilar motifs and GC-content");
    let mut stats = motif_stats(&motifs)?;
    write_motif_stats(
        &mut stats,
        &output_path(&args.outdir, &args.prefix, "stats_motifs.txt")?,
    )?;
    let mut dissimilar = motif_stats_for(&motifs, &run.dissimilar)?;
    write_motif_stats(
        &mut dissimilar,
        &output_path(&args.outdir, &args.prefix, "dissimilar_motifs.txt")?,
    )?;

    write_clusters(
        &run.clusters,
        &output_path(&args.outdir, &args.prefix, "clusters.yml")?,
    )?;

    // the merge tree is only needed for plotting, so failures are not fatal
    if let Some(linkage) = &run.linkage {
        let linkage_out = output_path(&args.outdir, &args.prefix, "linkage.txt")?;
        if let Err(e) = write_linkage(linkage, &linkage_out) {
            warn!("Skipped writing of linkage table: {}", e);
        }
    }

    let consensus: Vec<Motif> = run.consensus.iter().map(|c| c.labelled()).collect();
    let consensus_out = output_path(
        &args.outdir,
        &args.prefix,
        &format!("consensus_motifs.{}", config.consensus_format.extension()),
    )?;
    info!("- Saving {} consensus motifs to {}", consensus.len(), consensus_out);
    write_motifs(&consensus, config.consensus_format, &consensus_out)?;

    let elapsed = start_time.elapsed();
    info!(
        "Total execution time: {:.4} minutes",
        elapsed.as_secs_f64() / 60.0
    );

    Ok(())
}
