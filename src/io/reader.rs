use super::MotifFormat;
use crate::error::{MotifError, Result};
use crate::motif::{Motif, NUCLEOTIDE_INDEX};
use std::fs;
use std::iter::Peekable;
use std::str::Lines;

/// Advances the iterator until a line satisfying `stop` is next
fn skip_until<F>(lines: &mut Peekable<Lines<'_>>, stop: F)
where
    F: Fn(&str) -> bool,
{
    while let Some(line) = lines.peek() {
        if stop(line) {
            break;
        }
        lines.next();
    }
}

/// Sites assumed for a MEME motif whose `letter-probability` line has no `nsites=`
const DEFAULT_MEME_SITES: f64 = 20.0;

/// Parses the leading numbers of a line
///
/// Returns `None` when the line is blank or does not start with a number, so the
/// caller can stop reading rows. Trailing non-numeric tokens, such as the
/// consensus letter of a TRANSFAC row, end the row.
fn numeric_values(line: &str, skip: usize) -> Option<Vec<f64>> {
    let values: Vec<f64> = line
        .split_whitespace()
        .skip(skip)
        .map_while(|s| s.parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Collects consecutive numeric lines, whatever their width
fn take_values(lines: &mut Peekable<Lines<'_>>, skip: usize) -> Vec<Vec<f64>> {
    let mut rows = Vec::new();
    while let Some(values) = lines.peek().and_then(|line| numeric_values(line, skip)) {
        rows.push(values);
        lines.next();
    }
    rows
}

fn position_row(values: &[f64]) -> Result<[f64; 4]> {
    <[f64; 4]>::try_from(values).map_err(|_| {
        MotifError::InvalidFileFormat(format!(
            "Expected 4 values per row, found {}",
            values.len()
        ))
    })
}

/// Collects consecutive rows of exactly four numbers
fn take_rows(lines: &mut Peekable<Lines<'_>>, skip: usize) -> Result<Vec<[f64; 4]>> {
    take_values(lines, skip)
        .iter()
        .map(|values| position_row(values))
        .collect()
}

/// Rows of a PFM block, either one row per position or one row per nucleotide
///
/// A block of four equally long rows that are not four values wide is the
/// horizontal JASPAR layout and is transposed.
fn pfm_rows(id: &str, values: &[Vec<f64>]) -> Result<Vec<[f64; 4]>> {
    if values.iter().all(|row| row.len() == 4) {
        return values.iter().map(|row| position_row(row)).collect();
    }

    let width = values[0].len();
    if values.len() == 4 && values.iter().all(|row| row.len() == width) {
        return Ok((0..width)
            .map(|pos| [values[0][pos], values[1][pos], values[2][pos], values[3][pos]])
            .collect());
    }

    Err(MotifError::InvalidFileFormat(format!(
        "Motif {} needs 4 values per row or 4 rows of equal length",
        id
    )))
}

/// Value of `nsites=` on a MEME `letter-probability` line
fn meme_sites(line: &str) -> Option<f64> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if let Some(value) = token.strip_prefix("nsites=") {
            let value = if value.is_empty() { tokens.next()? } else { value };
            return value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() && *n > 0.0);
        }
    }
    None
}

fn parse_meme(content: &str) -> Result<Vec<Motif>> {
    let mut lines = content.lines().peekable();
    let mut motifs = Vec::new();

    skip_until(&mut lines, |l| l.starts_with("MOTIF"));
    while let Some(motif_line) = lines.next() {
        // the full name, alternate name included, identifies the motif
        let id = motif_line.trim_start_matches("MOTIF").trim();
        if id.is_empty() {
            return Err(MotifError::InvalidFileFormat("Missing motif ID".into()));
        }

        skip_until(&mut lines, |l| {
            l.trim_start().starts_with("letter-probability") || l.starts_with("MOTIF")
        });
        let mut sites = DEFAULT_MEME_SITES;
        if let Some(&line) = lines.peek() {
            if line.trim_start().starts_with("letter-probability") {
                sites = meme_sites(line).unwrap_or(DEFAULT_MEME_SITES);
                lines.next();
            }
        }

        let rows = take_rows(&mut lines, 0)?;
        if rows.is_empty() {
            return Err(MotifError::InvalidFileFormat(format!(
                "Empty matrix for motif {}",
                id
            )));
        }
        // probabilities become counts so merges weigh MEME motifs by their sites
        motifs.push(Motif::from_rows(id, &rows)?.scaled_to(sites));

        skip_until(&mut lines, |l| l.starts_with("MOTIF"));
    }
    Ok(motifs)
}

fn parse_pfm(content: &str) -> Result<Vec<Motif>> {
    let mut lines = content.lines().peekable();
    let mut motifs = Vec::new();

    skip_until(&mut lines, |l| l.starts_with('>'));
    while let Some(header) = lines.next() {
        let id = header[1..].trim();
        let values = take_values(&mut lines, 0);
        if values.is_empty() {
            return Err(MotifError::InvalidFileFormat(format!(
                "Empty matrix for motif {}",
                id
            )));
        }
        let rows = pfm_rows(id, &values)?;
        motifs.push(Motif::from_rows(id, &rows)?);
        skip_until(&mut lines, |l| l.starts_with('>'));
    }
    Ok(motifs)
}

fn parse_jaspar(content: &str) -> Result<Vec<Motif>> {
    let mut lines = content.lines().peekable();
    let mut motifs = Vec::new();

    skip_until(&mut lines, |l| l.starts_with('>'));
    while let Some(header) = lines.next() {
        let id = header[1..].trim();
        let mut columns: [Vec<f64>; 4] = Default::default();

        while let Some(line) = lines.peek() {
            let line = line.trim();
            let Some(symbol) = line.chars().next() else {
                break;
            };
            let Some(&index) = NUCLEOTIDE_INDEX.get(&symbol.to_ascii_uppercase()) else {
                break;
            };
            columns[index] = line[1..]
                .replace(['[', ']'], " ")
                .split_whitespace()
                .map(|s| s.parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    MotifError::InvalidFileFormat(format!("Invalid matrix value in {}: {}", id, e))
                })?;
            lines.next();
        }

        let length = columns[0].len();
        if length == 0 || columns.iter().any(|c| c.len() != length) {
            return Err(MotifError::InvalidFileFormat(format!(
                "Rows of motif {} are empty or differ in length",
                id
            )));
        }
        let rows: Vec<[f64; 4]> = (0..length)
            .map(|pos| [columns[0][pos], columns[1][pos], columns[2][pos], columns[3][pos]])
            .collect();
        motifs.push(Motif::from_rows(id, &rows)?);

        skip_until(&mut lines, |l| l.starts_with('>'));
    }
    Ok(motifs)
}

fn parse_transfac(content: &str) -> Result<Vec<Motif>> {
    let mut motifs = Vec::new();

    for record in content.split("//").filter(|r| !r.trim().is_empty()) {
        let mut lines = record.lines().peekable();
        let mut id: Option<String> = None;

        while let Some(line) = lines.next() {
            let tag = line.get(..2).unwrap_or("");
            match tag {
                "ID" | "NA" | "DE" if id.is_none() => {
                    id = Some(line[2..].trim().to_string());
                }
                "P0" | "PO" => {
                    let rows = take_rows(&mut lines, 1)?;
                    let name = id.take().ok_or_else(|| {
                        MotifError::InvalidFileFormat("Missing motif ID".into())
                    })?;
                    if rows.is_empty() {
                        return Err(MotifError::InvalidFileFormat(format!(
                            "Empty matrix for motif {}",
                            name
                        )));
                    }
                    motifs.push(Motif::from_rows(name, &rows)?);
                    break;
                }
                _ => {}
            }
        }
    }
    Ok(motifs)
}

/// Parses motifs from a string in the given format
///
/// # Errors
/// * `MotifError::InvalidFileFormat` if the content is malformed or holds no motifs
/// * `MotifError::InvalidMatrix` if a parsed matrix is not a valid motif
pub fn parse_motifs(content: &str, format: MotifFormat) -> Result<Vec<Motif>> {
    let motifs = match format {
        MotifFormat::Meme => parse_meme(content)?,
        MotifFormat::Pfm => parse_pfm(content)?,
        MotifFormat::Jaspar => parse_jaspar(content)?,
        MotifFormat::Transfac => parse_transfac(content)?,
    };
    if motifs.is_empty() {
        return Err(MotifError::InvalidFileFormat("No motifs found".into()));
    }
    Ok(motifs)
}

/// Reads all motifs of a file, detecting its format
///
/// # Arguments
/// * `filename` - Path to a MEME, JASPAR, PFM or TRANSFAC file
///
/// # Returns
/// * `Result<(Vec<Motif>, MotifFormat)>` - The motifs in file order and the detected format
///
/// # Errors
/// * `MotifError::Io` - If the file cannot be opened or read
/// * `MotifError::InvalidFileFormat` - If the format is unknown or the file holds no motifs
pub fn read_motifs(filename: &str) -> Result<(Vec<Motif>, MotifFormat)> {
    let content = fs::read_to_string(filename)?;
    let format = MotifFormat::detect(&content)?;
    let motifs = parse_motifs(&content, format)?;
    Ok((motifs, format))
}
