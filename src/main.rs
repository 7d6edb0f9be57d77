use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod cli;
mod config;
mod matrices;
mod metadata;
mod paths;
mod report;
mod subdirs;
mod trio;
mod util;
mod workflow;

const LOG_ENV: &str = "HICSUM_LOG";

fn main() -> Result<()> {
    let args = cli::RootArgs::parse();
    init_tracing(args.verbose);
    workflow::run(&args)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
