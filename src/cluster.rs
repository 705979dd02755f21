//! OVU cluster records and per-cluster length statistics.
//!
//! Clusters arrive from the upstream clusterer as a representative contig
//! plus a member list; this module enriches them with the statistics the
//! final per-cluster record carries.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};
use std::collections::HashMap;

/// One operational viral unit: a representative contig and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Assigned identifier, `OVU_{n}` in cluster-table row order.
    pub ovu_id: String,
    /// The contig chosen by the clusterer to represent the cluster.
    pub representative: String,
    /// Member contig ids in the order the clusterer listed them.
    pub members: Vec<String>,
}

impl Cluster {
    /// Number of contigs the clusterer placed in this cluster.
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Length statistics for one cluster, sourced from the quality-filtered
/// contig collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    /// Sum of the member lengths found in the lookup.
    pub total: u64,
    /// Median of the member lengths found; NaN when none were found.
    pub median: f64,
    /// `total / cluster_size`, dividing by the declared membership count.
    pub mean: f64,
}

/// Computes length statistics for a cluster from a contig-length lookup.
///
/// Members absent from the lookup contribute nothing to the sum or the
/// median, while the mean still divides by the declared cluster size; an
/// incomplete lookup therefore yields a mean below the mean of the found
/// members, and that divergence is preserved rather than corrected.
pub fn length_stats(cluster: &Cluster, lengths: &HashMap<String, u64>) -> LengthStats {
    let found: Vec<u64> = cluster
        .members
        .iter()
        .filter_map(|member| lengths.get(member).copied())
        .collect();

    let total: u64 = found.iter().sum();
    let median = if found.is_empty() {
        f64::NAN
    } else {
        let as_floats: Vec<f64> = found.iter().map(|&len| len as f64).collect();
        Data::new(as_floats).median()
    };
    let mean = total as f64 / cluster.size() as f64;

    LengthStats {
        total,
        median,
        mean,
    }
}

/// Final per-cluster record: identity, size, length statistics, consensus
/// lineage, and membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub ovu_id: String,
    pub representative: String,
    pub cluster_size: usize,
    pub cluster_length: u64,
    pub cluster_median_length: f64,
    pub cluster_mean_length: f64,
    /// Consensus lineage, six `;`-joined rank values.
    pub lineage: String,
    /// Member contig ids, comma-joined on output.
    pub members: Vec<String>,
}
