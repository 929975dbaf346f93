use super::MotifFormat;
use crate::cluster::ClusterAssignment;
use crate::error::{MotifError, Result};
use crate::linkage::Linkage;
use crate::matrix::DistanceMatrix;
use crate::motif::{Motif, NUCLEOTIDES};
use ndarray::Axis;
use polars::prelude::*;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;

const MEME_HEADER: &str = "MEME version 4\n\nALPHABET= ACGT\n\nstrands: + -\n\n\
Background letter frequencies\nA 0.25 C 0.25 G 0.25 T 0.25\n";

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.4}", value)
    }
}

fn to_pfm(motif: &Motif) -> String {
    let mut out = format!(">{}\n", motif.id());
    for row in motif.frequencies().axis_iter(Axis(0)) {
        let values: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
        let _ = writeln!(out, "{}", values.join("\t"));
    }
    out
}

fn to_meme(motif: &Motif) -> String {
    let mut out = format!(
        "MOTIF {}\nletter-probability matrix: alength= 4 w= {} nsites= {} E= 0\n",
        motif.id(),
        motif.len(),
        format_value(motif.total_count())
    );
    for row in motif.frequencies().axis_iter(Axis(0)) {
        let values: Vec<String> = row.iter().map(|v| format!("{:.6}", v)).collect();
        let _ = writeln!(out, " {}", values.join("  "));
    }
    out
}

fn to_jaspar(motif: &Motif) -> String {
    let mut out = format!(">{}\n", motif.id());
    for (index, symbol) in NUCLEOTIDES.iter().enumerate() {
        let values: Vec<String> = motif
            .matrix()
            .column(index)
            .iter()
            .map(|&v| format_value(v))
            .collect();
        let _ = writeln!(out, "{} [ {} ]", symbol, values.join(" "));
    }
    out
}

fn to_transfac(motif: &Motif) -> String {
    let mut out = format!("ID {}\nBF {}\nP0\tA\tC\tG\tT\n", motif.id(), motif.id());
    let consensus: Vec<char> = motif.consensus().chars().collect();
    for (pos, row) in motif.matrix().axis_iter(Axis(0)).enumerate() {
        let values: Vec<String> = row.iter().map(|&v| format_value(v)).collect();
        let _ = writeln!(
            out,
            "{:02}\t{}\t{}",
            pos + 1,
            values.join("\t"),
            consensus.get(pos).copied().unwrap_or('N')
        );
    }
    out.push_str("XX\n//\n");
    out
}

/// Renders one motif in the given format
pub fn format_motif(motif: &Motif, format: MotifFormat) -> String {
    match format {
        MotifFormat::Pfm => to_pfm(motif),
        MotifFormat::Meme => to_meme(motif),
        MotifFormat::Jaspar => to_jaspar(motif),
        MotifFormat::Transfac => to_transfac(motif),
    }
}

/// Writes motifs to one file, separated by blank lines
///
/// MEME output starts with a minimal MEME header so the file can be read back.
pub fn write_motifs(motifs: &[Motif], format: MotifFormat, filename: &str) -> Result<()> {
    let mut file = File::create(filename).map_err(MotifError::Io)?;
    if format == MotifFormat::Meme {
        writeln!(file, "{}", MEME_HEADER).map_err(MotifError::Io)?;
    }
    for motif in motifs {
        writeln!(file, "{}", format_motif(motif, format)).map_err(MotifError::Io)?;
    }
    Ok(())
}

fn write_tsv(df: &mut DataFrame, filename: &str) -> Result<()> {
    let mut file = File::create(filename).map_err(MotifError::Io)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b'\t')
        .finish(df)?;
    Ok(())
}

/// Writes the distance matrix as a tab-separated table with a "Motif" label column
pub fn write_distance_matrix(matrix: &DistanceMatrix, filename: &str) -> Result<()> {
    let mut df = matrix.to_dataframe()?;
    write_tsv(&mut df, filename)
}

/// Writes a motif statistics table as produced by [`crate::stats::motif_stats`]
pub fn write_motif_stats(stats: &mut DataFrame, filename: &str) -> Result<()> {
    write_tsv(stats, filename)
}

/// Writes the merge tree with one `left, right, distance, size` row per merge
pub fn write_linkage(linkage: &Linkage, filename: &str) -> Result<()> {
    let merges = linkage.merges();
    let mut df = DataFrame::new(vec![
        Column::new(
            "left".into(),
            merges.iter().map(|m| m.left as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            "right".into(),
            merges.iter().map(|m| m.right as u64).collect::<Vec<u64>>(),
        ),
        Column::new(
            "distance".into(),
            merges.iter().map(|m| m.distance).collect::<Vec<f64>>(),
        ),
        Column::new(
            "size".into(),
            merges.iter().map(|m| m.size as u64).collect::<Vec<u64>>(),
        ),
    ])?;
    write_tsv(&mut df, filename)
}

/// Writes clusters as a YAML mapping of cluster name to motif labels
pub fn write_clusters(clusters: &ClusterAssignment, filename: &str) -> Result<()> {
    let file = File::create(filename).map_err(MotifError::Io)?;
    serde_yaml::to_writer(file, clusters)?;
    Ok(())
}
