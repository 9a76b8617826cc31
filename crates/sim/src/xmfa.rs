//! Reader for XMFA alignment files.
//!
//! An XMFA file is a series of FASTA blocks, each closed by a line starting
//! with `=`. Every block holds the aligned sequences of one gene:
//! ```text
//! >1:1-8 + gene0
//! ACGTACGT
//! >2:1-8 + gene0
//! ACGTTCGT
//! =
//! >1:9-16 + gene1
//! ...
//! ```
//! Lines starting with `#` are comments.

use crate::errors::SimError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Aligned sequences of one gene across individuals.
pub type GeneGroup = Vec<Vec<u8>>;

/// Read every gene group of an XMFA stream.
///
/// All sequences of a group must have the same length.
pub fn read_xmfa<R: BufRead>(reader: R) -> Result<Vec<GeneGroup>, SimError> {
    let mut groups = Vec::new();
    let mut group: GeneGroup = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('=') {
            if let Some(seq) = current.take() {
                group.push(seq);
            }
            if !group.is_empty() {
                groups.push(close_group(std::mem::take(&mut group), groups.len())?);
            }
        } else if line.starts_with('>') {
            if let Some(seq) = current.take() {
                group.push(seq);
            }
            current = Some(Vec::new());
        } else {
            match current.as_mut() {
                Some(seq) => seq.extend_from_slice(line.as_bytes()),
                None => {
                    return Err(SimError::Alignment(format!(
                        "sequence data before any header on line {}",
                        line_no + 1
                    )));
                }
            }
        }
    }

    // A final block without a closing '=' still counts.
    if let Some(seq) = current.take() {
        group.push(seq);
    }
    if !group.is_empty() {
        groups.push(close_group(group, groups.len())?);
    }

    Ok(groups)
}

/// Read every gene group of an XMFA file.
pub fn read_xmfa_path(path: impl AsRef<Path>) -> Result<Vec<GeneGroup>, SimError> {
    let file = File::open(path)?;
    read_xmfa(BufReader::new(file))
}

fn close_group(group: GeneGroup, index: usize) -> Result<GeneGroup, SimError> {
    let len = group[0].len();
    if let Some(bad) = group.iter().find(|seq| seq.len() != len) {
        return Err(SimError::Alignment(format!(
            "gene group {index} is not aligned: lengths {len} and {}",
            bad.len()
        )));
    }
    Ok(group)
}
