use crate::error::{MotifError, Result};
use crate::matrix::round_to;
use crate::motif::Motif;
use polars::prelude::*;
use std::collections::HashMap;

/// Calculates GC content and length for each motif.
///
/// # Arguments
/// * `motifs` - Motifs to describe, in output order
///
/// # Returns
/// * `Result<DataFrame>` - A DataFrame with:
///   - "Motif": The motif label (tabs replaced by spaces)
///   - "GC content": Mean C + G frequency per position, rounded to 4 decimals
///   - "Motif length": Number of positions
///
/// # Errors
/// * Returns `MotifError::DataError` if DataFrame creation fails
pub fn motif_stats<'a, I>(motifs: I) -> Result<DataFrame>
where
    I: IntoIterator<Item = &'a Motif>,
{
    let mut labels = Vec::new();
    let mut gc_content = Vec::new();
    let mut lengths = Vec::new();
    for motif in motifs {
        labels.push(motif.label());
        gc_content.push(round_to(motif.gc_content(), 4));
        lengths.push(motif.len() as u32);
    }

    let df = DataFrame::new(vec![
        Column::new("Motif".into(), labels),
        Column::new("GC content".into(), gc_content),
        Column::new("Motif length".into(), lengths),
    ])?;
    Ok(df)
}

/// Same table as [`motif_stats`], restricted to `labels` and in their order
///
/// # Errors
/// * Returns `MotifError::InvalidInput` if a label matches no motif
pub fn motif_stats_for(motifs: &[Motif], labels: &[String]) -> Result<DataFrame> {
    let by_label: HashMap<String, &Motif> = motifs.iter().map(|m| (m.label(), m)).collect();
    let selected = labels
        .iter()
        .map(|label| {
            by_label
                .get(label)
                .copied()
                .ok_or_else(|| MotifError::InvalidInput(format!("unknown motif {}", label)))
        })
        .collect::<Result<Vec<&Motif>>>()?;
    motif_stats(selected)
}
