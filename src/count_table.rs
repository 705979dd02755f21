//! Defines structures and functions for handling count data.
//!
//! Rows are features keyed by the featureCounts column composite, columns
//! are samples. Counts stay `f64` so the same matrix shape serves the raw
//! and normalized tables.

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use log::warn;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Row key for the count matrix: the six featureCounts columns that
/// identify a feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureKey {
    pub contig: String,
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub strand: String,
    pub length: u64,
}

/// A fragment-count matrix (features x samples).
#[derive(Debug, Clone)]
pub struct CountTable {
    /// The core count data matrix (features x samples).
    counts: Array2<f64>,
    /// Row keys in first-seen order.
    features: Vec<FeatureKey>,
    /// Key -> row index, insertion-ordered for deterministic output.
    feature_map: IndexMap<FeatureKey, usize>,
    /// Column names in assembly order.
    sample_names: Vec<String>,
}

impl CountTable {
    /// Assembles a count table from per-sample rows.
    ///
    /// The first sample defines the row set and its order; every later
    /// sample is left-joined onto it: keys the later sample lacks are
    /// filled with zero and logged, keys it adds beyond the base row set
    /// are dropped.
    ///
    /// # Arguments
    ///
    /// * `samples` - `(sample name, rows)` pairs in column order.
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The assembled table, or an error on duplicate
    ///   sample names or duplicate keys within the base sample.
    pub fn assemble(samples: Vec<(String, Vec<(FeatureKey, f64)>)>) -> Result<Self> {
        let mut feature_map: IndexMap<FeatureKey, usize> = IndexMap::new();
        let mut sample_names: Vec<String> = Vec::with_capacity(samples.len());
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(samples.len());

        for (sample, rows) in samples {
            if sample_names.contains(&sample) {
                return Err(anyhow!("duplicate sample name '{}'", sample));
            }

            if sample_names.is_empty() {
                // Base sample: defines the feature rows.
                let mut column = Vec::with_capacity(rows.len());
                for (key, count) in rows {
                    let next_index = feature_map.len();
                    if feature_map.insert(key.clone(), next_index).is_some() {
                        return Err(anyhow!(
                            "duplicate feature key '{}' in base sample '{}'",
                            key.contig,
                            sample
                        ));
                    }
                    column.push(count);
                }
                columns.push(column);
            } else {
                let mut column = vec![0.0; feature_map.len()];
                let mut filled = vec![false; feature_map.len()];
                for (key, count) in rows {
                    if let Some(&row) = feature_map.get(&key) {
                        column[row] = count;
                        filled[row] = true;
                    }
                }
                let missing = filled.iter().filter(|&&was_set| !was_set).count();
                if missing > 0 {
                    warn!(
                        "sample '{}' lacks counts for {} of {} features; filled with 0",
                        sample,
                        missing,
                        feature_map.len()
                    );
                }
                columns.push(column);
            }
            sample_names.push(sample);
        }

        let n_features = feature_map.len();
        let n_samples = sample_names.len();
        let counts = Array2::from_shape_fn((n_features, n_samples), |(r, c)| columns[c][r]);
        let features: Vec<FeatureKey> = feature_map.keys().cloned().collect();

        Ok(CountTable {
            counts,
            features,
            feature_map,
            sample_names,
        })
    }

    /// Returns the dimensions of the count table (features, samples).
    pub fn dimensions(&self) -> (usize, usize) {
        self.counts.dim()
    }

    /// Returns a reference to the underlying count matrix.
    pub fn counts_matrix(&self) -> &Array2<f64> {
        &self.counts
    }

    /// Returns the row keys in matrix order.
    pub fn features(&self) -> &[FeatureKey] {
        &self.features
    }

    /// Returns the list of sample names.
    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// Retrieves the counts for a specific sample column.
    pub fn get_sample_counts(&self, sample_name: &str) -> Option<ArrayView1<f64>> {
        self.sample_names
            .iter()
            .position(|name| name == sample_name)
            .map(|idx| self.counts.column(idx))
    }

    /// Retrieves the counts for a specific feature row.
    pub fn get_feature_counts(&self, key: &FeatureKey) -> Option<ArrayView1<f64>> {
        self.feature_map.get(key).map(|&idx| self.counts.row(idx))
    }

    /// Feature lengths in matrix row order.
    pub fn feature_lengths(&self) -> Vec<f64> {
        self.features.iter().map(|key| key.length as f64).collect()
    }
}
