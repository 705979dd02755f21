//! End-to-end orchestration for the two independent branches:
//! cluster summarisation (consensus lineage + length statistics) and
//! abundance normalization (count matrix -> FPKM/TPM).
//!
//! Every cluster and every sample column is an independent unit of work;
//! the only ordering that matters is the classifier priority within one
//! cluster's merge.

use crate::abundance;
use crate::cluster::{length_stats, ClusterRecord};
use crate::count_table::CountTable;
use crate::errors::ProfilerError;
use crate::io::{fasta, tables, write_abundance_table, write_cluster_records};
use crate::taxonomy::{merge_lineages, Lineage, SOURCES};
use anyhow::{bail, Result};
use itertools::Itertools;
use log::{info, warn};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Input tables for the cluster summarisation branch.
#[derive(Debug, Clone)]
pub struct SummariseInputs {
    /// Cluster membership table (`representative<TAB>members`).
    pub clusters: PathBuf,
    /// CAT `contig2classification.with_names` table.
    pub cat: PathBuf,
    /// vContact3 `final_assignments` table.
    pub vcontact3: PathBuf,
    /// GeNomad taxonomy table.
    pub genomad: PathBuf,
    /// Quality-filtered contig FASTA.
    pub contigs: PathBuf,
}

/// Outcome counts for the abundance branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbundanceSummary {
    /// Samples that made it into the FPKM/TPM tables.
    pub succeeded: usize,
    /// Samples skipped for a missing table or a zero denominator.
    pub failed: usize,
}

/// Runs the summarisation branch: consensus lineage plus length statistics
/// for every cluster, written as one record per OVU.
///
/// Clusters are processed in parallel; the output is sorted by cluster
/// size, largest first, so repeated runs on identical inputs are
/// byte-identical.
///
/// # Arguments
///
/// * `inputs` - The collaborator tables.
/// * `output` - Path of the per-cluster CSV to write.
///
/// # Returns
///
/// * `Result<Vec<ClusterRecord>>` - The written records, in output order.
pub fn summarise_clusters(inputs: &SummariseInputs, output: &Path) -> Result<Vec<ClusterRecord>> {
    for (unit, path) in [
        ("cluster table", &inputs.clusters),
        ("CAT annotations", &inputs.cat),
        ("vContact3 assignments", &inputs.vcontact3),
        ("GeNomad annotations", &inputs.genomad),
        ("contig FASTA", &inputs.contigs),
    ] {
        if !path.exists() {
            return Err(ProfilerError::MissingInput {
                unit: unit.to_string(),
                path: path.clone(),
            }
            .into());
        }
    }

    let clusters = tables::read_clusters(&inputs.clusters)?;
    info!("read {} clusters from {:?}", clusters.len(), inputs.clusters);

    let cat = tables::read_cat_annotations(&inputs.cat)?;
    let vcontact3 = tables::read_vcontact3_assignments(&inputs.vcontact3)?;
    let genomad = tables::read_genomad_annotations(&inputs.genomad)?;

    let member_ids: HashSet<String> = clusters
        .iter()
        .flat_map(|cluster| cluster.members.iter().cloned())
        .collect();
    let lengths = fasta::sequence_lengths(&inputs.contigs, &member_ids)?;

    let records: Vec<ClusterRecord> = clusters
        .par_iter()
        .map(|cluster| {
            let representative = cluster.representative.as_str();
            let raw_lineages = [
                cat.get(representative),
                vcontact3.get(representative),
                genomad.get(representative),
            ];
            let candidates: Vec<Lineage> = SOURCES
                .iter()
                .zip(raw_lineages)
                .map(|(source, raw)| source.normalize(raw.map(String::as_str).unwrap_or("")))
                .collect();
            let consensus = merge_lineages(&cluster.ovu_id, &candidates);
            let stats = length_stats(cluster, &lengths);

            ClusterRecord {
                ovu_id: cluster.ovu_id.clone(),
                representative: cluster.representative.clone(),
                cluster_size: cluster.size(),
                cluster_length: stats.total,
                cluster_median_length: stats.median,
                cluster_mean_length: stats.mean,
                lineage: consensus.to_string(),
                members: cluster.members.clone(),
            }
        })
        .collect();

    let records: Vec<ClusterRecord> = records
        .into_iter()
        .sorted_by_key(|record| Reverse(record.cluster_size))
        .collect();

    write_cluster_records(&records, output)?;
    info!("wrote {} cluster records to {:?}", records.len(), output);
    Ok(records)
}

/// Path of one sample's featureCounts table under the counts directory.
fn sample_count_path(counts_dir: &Path, sample: &str) -> PathBuf {
    counts_dir.join(sample).join(format!("{}_count.tsv", sample))
}

/// Runs the abundance branch: assembles the raw count matrix from the
/// per-sample tables named in the manifest, then writes `all_count`,
/// `all_FPKM`, and `all_TPM` tables.
///
/// A sample whose count table is missing is skipped and counted, not
/// fatal; a batch where every sample failed is.
///
/// # Arguments
///
/// * `manifest` - Mapping manifest listing the sample names.
/// * `counts_dir` - Directory holding `<sample>/<sample>_count.tsv`.
/// * `out_dir` - Directory receiving the three output tables.
///
/// # Returns
///
/// * `Result<AbundanceSummary>` - Failed vs. succeeded sample counts.
pub fn run_abundance(
    manifest: &Path,
    counts_dir: &Path,
    out_dir: &Path,
) -> Result<AbundanceSummary> {
    if !manifest.exists() {
        return Err(ProfilerError::MissingInput {
            unit: "mapping manifest".to_string(),
            path: manifest.to_path_buf(),
        }
        .into());
    }

    let samples = tables::read_manifest(manifest)?;
    info!("manifest lists {} samples", samples.len());

    let mut assembled: Vec<(String, Vec<_>)> = Vec::with_capacity(samples.len());
    let mut missing = 0usize;
    for sample in &samples {
        let path = sample_count_path(counts_dir, sample);
        if !path.exists() {
            warn!(
                "{}",
                ProfilerError::MissingInput {
                    unit: format!("count table for sample '{}'", sample),
                    path,
                }
            );
            missing += 1;
            continue;
        }
        let rows = tables::read_feature_counts(&path)?;
        assembled.push((sample.clone(), rows));
    }

    if assembled.is_empty() {
        bail!(
            "no count tables could be assembled: {} of {} samples missing",
            missing,
            samples.len()
        );
    }

    let table = CountTable::assemble(assembled)?;
    let (n_features, n_samples) = table.dimensions();
    info!(
        "assembled count matrix of {} features x {} samples",
        n_features, n_samples
    );

    std::fs::create_dir_all(out_dir)?;
    write_abundance_table(
        table.features(),
        table.sample_names(),
        table.counts_matrix(),
        &out_dir.join("all_count.csv"),
    )?;

    let normalized = abundance::normalize(&table);
    if normalized.samples.is_empty() {
        bail!(
            "normalization failed for every sample: {} zero denominators, {} missing tables",
            normalized.failures.len(),
            missing
        );
    }

    write_abundance_table(
        table.features(),
        &normalized.samples,
        &normalized.fpkm,
        &out_dir.join("all_FPKM.csv"),
    )?;
    write_abundance_table(
        table.features(),
        &normalized.samples,
        &normalized.tpm,
        &out_dir.join("all_TPM.csv"),
    )?;

    let summary = AbundanceSummary {
        succeeded: normalized.samples.len(),
        failed: missing + normalized.failures.len(),
    };
    info!(
        "abundance finished: {} samples normalized, {} skipped",
        summary.succeeded, summary.failed
    );
    Ok(summary)
}
