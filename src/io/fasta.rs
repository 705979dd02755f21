//! Contig length lookup backed by a FASTA reader.
//!
//! Leverages the `needletail` crate for efficient parsing of FASTA
//! records, handling compressed files automatically. Only lengths are
//! retained; sequences are never materialized.

use anyhow::{Context, Result};
use log::info;
use needletail::parse_fastx_file;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Reads sequence lengths for a set of wanted ids from a FASTA file.
///
/// Record ids are truncated at the first whitespace, matching how the
/// upstream tools key their tables. Ids absent from the file are simply
/// not present in the returned map.
///
/// # Arguments
///
/// * `path` - FASTA file (plain or gzip-compressed).
/// * `wanted` - The sequence ids to keep.
///
/// # Returns
///
/// * `Result<HashMap<String, u64>>` - id -> length for every wanted id
///   found in the file.
pub fn sequence_lengths(path: &Path, wanted: &HashSet<String>) -> Result<HashMap<String, u64>> {
    let mut reader = parse_fastx_file(path)
        .with_context(|| format!("failed to open FASTA file {:?}", path))?;

    let mut lengths = HashMap::with_capacity(wanted.len());
    while let Some(record) = reader.next() {
        let record =
            record.with_context(|| format!("failed to parse record in {:?}", path))?;
        let id_bytes = record.id();
        let id = std::str::from_utf8(id_bytes)
            .with_context(|| format!("non-UTF-8 record id in {:?}", path))?
            .split_whitespace()
            .next()
            .unwrap_or("");
        if wanted.contains(id) {
            lengths.insert(id.to_string(), record.num_bases() as u64);
        }
    }

    info!(
        "collected lengths for {} of {} wanted sequences from {:?}",
        lengths.len(),
        wanted.len(),
        path
    );
    Ok(lengths)
}
