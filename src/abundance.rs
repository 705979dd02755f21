//! Provides functions for normalizing count data.
//!
//! Converts the raw fragment-count matrix into length-normalized (RPK) and
//! library-size-normalized (FPKM, TPM) abundance measures. Every
//! normalization is per-sample: each column is scaled by its own
//! denominator, with no cross-sample adjustment.

use crate::count_table::CountTable;
use crate::errors::ProfilerError;
use log::warn;
use ndarray::{Array1, Array2, Axis};

/// Outcome of the per-sample library normalizations.
///
/// Samples whose normalization denominator summed to zero are listed in
/// `failures` and excluded from the FPKM/TPM columns; one bad sample does
/// not invalidate the others.
#[derive(Debug)]
pub struct NormalizedAbundance {
    /// Samples that normalized, in original column order.
    pub samples: Vec<String>,
    /// Reads per kilobase for every input sample column.
    pub rpk: Array2<f64>,
    /// FPKM for the `samples` columns.
    pub fpkm: Array2<f64>,
    /// TPM for the `samples` columns.
    pub tpm: Array2<f64>,
    /// Per-sample zero-denominator failures.
    pub failures: Vec<ProfilerError>,
}

/// Computes the reads-per-kilobase matrix: `count / length * 1e3` per cell.
///
/// Lengths come from the feature key composite, so RPK needs no per-sample
/// denominator and is defined for every column.
pub fn rpk(table: &CountTable) -> Array2<f64> {
    let lengths = Array1::from(table.feature_lengths());
    let mut rpk = table.counts_matrix().clone();
    for mut column in rpk.axis_iter_mut(Axis(1)) {
        column.zip_mut_with(&lengths, |value, &length| {
            *value = *value / length * 1e3;
        });
    }
    rpk
}

/// Derives FPKM and TPM from the raw counts and their RPK matrix.
///
/// `FPKM[f, s] = RPK[f, s] / sum_f(count[f, s]) * 1e6` — the library-size
/// denominator is the raw count column sum, not the RPK column sum.
/// `TPM[f, s] = RPK[f, s] / sum_f(RPK[f, s]) * 1e6`.
///
/// A zero denominator is recorded as a typed failure for that sample and
/// its column is dropped from both outputs; it is never coerced to NaN.
pub fn normalize(table: &CountTable) -> NormalizedAbundance {
    let rpk = rpk(table);
    let counts = table.counts_matrix();
    let (n_features, _) = table.dimensions();

    let mut samples = Vec::new();
    let mut failures = Vec::new();
    let mut fpkm_columns: Vec<Array1<f64>> = Vec::new();
    let mut tpm_columns: Vec<Array1<f64>> = Vec::new();

    for (idx, sample) in table.sample_names().iter().enumerate() {
        let library_size = counts.column(idx).sum();
        let rpk_column = rpk.column(idx);
        let rpk_sum = rpk_column.sum();

        if library_size <= 0.0 {
            warn!("sample '{}' has a zero raw count sum; skipping", sample);
            failures.push(ProfilerError::ZeroDenominator {
                sample: sample.clone(),
                denominator: "raw count".to_string(),
            });
            continue;
        }
        if rpk_sum <= 0.0 {
            warn!("sample '{}' has a zero RPK sum; skipping", sample);
            failures.push(ProfilerError::ZeroDenominator {
                sample: sample.clone(),
                denominator: "RPK".to_string(),
            });
            continue;
        }

        fpkm_columns.push(rpk_column.mapv(|value| value / library_size * 1e6));
        tpm_columns.push(rpk_column.mapv(|value| value / rpk_sum * 1e6));
        samples.push(sample.clone());
    }

    let fpkm = stack_columns(n_features, &fpkm_columns);
    let tpm = stack_columns(n_features, &tpm_columns);

    NormalizedAbundance {
        samples,
        rpk,
        fpkm,
        tpm,
        failures,
    }
}

/// Stacks per-sample columns back into a (features x samples) matrix.
fn stack_columns(n_features: usize, columns: &[Array1<f64>]) -> Array2<f64> {
    if columns.is_empty() {
        return Array2::zeros((n_features, 0));
    }
    let views: Vec<_> = columns.iter().map(|column| column.view()).collect();
    ndarray::stack(Axis(1), &views).expect("columns share the feature row count")
}
