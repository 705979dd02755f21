//! Command-line interface definition and dispatch.

use crate::pipeline::{self, SummariseInputs};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

/// Define command-line arguments using clap.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of threads to use.
    #[arg(short = 't', long, default_value_t = 1)]
    pub threads: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarise clusters: consensus lineage and length statistics per OVU.
    Summarise {
        /// Cluster membership table (representative<TAB>comma-joined members).
        #[arg(long)]
        clusters: PathBuf,

        /// CAT contig2classification.with_names table.
        #[arg(long)]
        cat: PathBuf,

        /// vContact3 final_assignments table.
        #[arg(long)]
        vcontact3: PathBuf,

        /// GeNomad taxonomy table.
        #[arg(long)]
        genomad: PathBuf,

        /// Quality-filtered contig FASTA (plain or gzipped).
        #[arg(long)]
        contigs: PathBuf,

        /// Output path for the per-cluster CSV.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Assemble the raw count matrix and derive FPKM/TPM tables.
    Abundance {
        /// Mapping manifest (fileHeader, fq1, fq2; tab-separated).
        #[arg(long)]
        manifest: PathBuf,

        /// Directory holding <sample>/<sample>_count.tsv tables.
        #[arg(long)]
        counts_dir: PathBuf,

        /// Directory receiving the all_count/all_FPKM/all_TPM tables.
        #[arg(short, long)]
        out_dir: PathBuf,
    },
}

/// Main entry point for CLI dispatch.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Summarise {
            clusters,
            cat,
            vcontact3,
            genomad,
            contigs,
            output,
        } => {
            let inputs = SummariseInputs {
                clusters,
                cat,
                vcontact3,
                genomad,
                contigs,
            };
            let records = pipeline::summarise_clusters(&inputs, &output)?;
            info!("summarised {} clusters into {:?}", records.len(), output);
            Ok(())
        }
        Commands::Abundance {
            manifest,
            counts_dir,
            out_dir,
        } => {
            let summary = pipeline::run_abundance(&manifest, &counts_dir, &out_dir)?;
            info!(
                "abundance tables written: {} samples normalized, {} skipped",
                summary.succeeded, summary.failed
            );
            Ok(())
        }
    }
}
