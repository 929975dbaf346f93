//! Reading and writing motifs and clustering reports

mod reader;
mod writer;

pub use reader::{parse_motifs, read_motifs};
pub use writer::{
    format_motif, write_clusters, write_distance_matrix, write_linkage, write_motif_stats,
    write_motifs,
};

use crate::error::{MotifError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported motif file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotifFormat {
    /// `>id` header followed by one `A C G T` row per position
    Pfm,
    /// Minimal MEME
    Meme,
    /// `>id` header followed by one bracketed row per nucleotide
    Jaspar,
    Transfac,
}

impl MotifFormat {
    /// Guesses the format from the first non-empty lines of a file
    ///
    /// # Errors
    /// * `MotifError::InvalidFileFormat` if no known format matches
    pub fn detect(content: &str) -> Result<Self> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        match lines.next() {
            Some(l) if l.starts_with("MEME version") || l.starts_with("MOTIF") => {
                Ok(MotifFormat::Meme)
            }
            Some(l) if l.starts_with('>') => match lines.next() {
                Some(next) if next.starts_with(['A', 'C', 'G', 'T']) => Ok(MotifFormat::Jaspar),
                _ => Ok(MotifFormat::Pfm),
            },
            Some(l)
                if ["AC", "ID", "VV", "DE", "NA", "P0", "PO"]
                    .iter()
                    .any(|tag| l.starts_with(tag)) =>
            {
                Ok(MotifFormat::Transfac)
            }
            _ => Err(MotifError::InvalidFileFormat(
                "could not determine motif format".into(),
            )),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MotifFormat::Pfm => "pfm",
            MotifFormat::Meme => "meme",
            MotifFormat::Jaspar => "jaspar",
            MotifFormat::Transfac => "transfac",
        }
    }
}

impl FromStr for MotifFormat {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pfm" | "pwm" => Ok(MotifFormat::Pfm),
            "meme" => Ok(MotifFormat::Meme),
            "jaspar" => Ok(MotifFormat::Jaspar),
            "transfac" => Ok(MotifFormat::Transfac),
            _ => Err(MotifError::invalid_parameter(
                "motif format",
                s,
                "expected one of pfm, meme, jaspar, transfac",
            )),
        }
    }
}

impl fmt::Display for MotifFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
