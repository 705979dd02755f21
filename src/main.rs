//! Main entry point for the virome_profiler application.
//!
//! The application enriches viral sequence clusters (OVUs) produced by an
//! upstream pipeline:
//! 1. Normalizing the lineage strings of three independent classifiers
//!    (CAT, vContact3, GeNomad) into a shared rank schema.
//! 2. Merging them into one consensus lineage per cluster.
//! 3. Aggregating per-cluster contig length statistics.
//! 4. Converting raw fragment counts into RPK/FPKM/TPM abundance tables.

// Modules defined within the project
mod abundance;
mod cli;
mod cluster;
mod count_table;
mod errors;
mod io;
mod pipeline;
mod taxonomy;

// External Crate Imports
use anyhow::Result;
use clap::Parser;
use log::info;

use cli::{run_cli, Cli};

/// Main function: parses arguments and dispatches the requested branch.
fn main() -> Result<()> {
    // Initialize logging (e.g., using env_logger)
    env_logger::init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Configure Rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()?;
    info!("Using {} threads.", cli.threads);

    run_cli(cli)?;

    Ok(())
}
