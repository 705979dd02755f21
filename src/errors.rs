//! Typed error kinds shared by the table readers and the normalization
//! engines.
//!
//! Keeping the kinds in one enum makes the failure policy auditable:
//! missing per-sample inputs are recoverable, schema drift is fatal,
//! and zero normalization denominators are surfaced per sample.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    /// A required collaborator file is absent for one unit of work.
    #[error("missing input for {unit}: {path}")]
    MissingInput { unit: String, path: PathBuf },

    /// A table is present but does not carry the expected columns.
    #[error("schema error in {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    /// A per-sample normalization denominator summed to zero.
    #[error("zero {denominator} sum for sample '{sample}'")]
    ZeroDenominator { sample: String, denominator: String },
}

impl ProfilerError {
    /// Convenience constructor for schema failures.
    pub fn schema(path: &std::path::Path, reason: impl Into<String>) -> Self {
        ProfilerError::Schema {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
