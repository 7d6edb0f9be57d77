//! CLI argument parsing for the matrix summation run.
use clap::Parser;
use std::path::PathBuf;

/// Directory created next to the executable when no studies dir is given.
pub const DEFAULT_STUDIES_DIR: &str = "hic_studies";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "hicsum",
    version,
    about = "Organize hicexplorer trio outputs and sum Hi-C matrices",
    after_help = "Examples:\n  hicsum /data/hic_studies\n  hicsum /data/hic_studies --data-dir /data/runs --dry-run\n  hicsum --sum-command 'conda run -n hic hicSumMatrices' --report run.json"
)]
pub struct RootArgs {
    /// Studies directory receiving metadata.tsv, per-individual dirs and summed matrices
    #[arg(value_name = "STUDIES_DIR")]
    pub studies_dir: Option<PathBuf>,

    /// Directory holding trio.* dirs and per-individual results (defaults to STUDIES_DIR)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to STUDIES_DIR/hicsum.json when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Summation command, split with shell quoting rules
    #[arg(long, value_name = "CMD")]
    pub sum_command: Option<String>,

    /// Print the summation commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Write a machine-readable run report
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}
