//! End-to-end run: discover, write metadata, create dirs, collect, sum.
//!
//! Each stage takes its roots explicitly; the metadata file written early
//! is re-read before collection.
use crate::aggregate::{plan_sums, run_sums, SumStatus};
use crate::cli::RootArgs;
use crate::config::{resolve_config, resolve_sum_command};
use crate::matrices::collect_matrices;
use crate::metadata::{group_individuals, read_metadata, write_metadata};
use crate::paths::{default_studies_dir, ensure_studies_root, StudyPaths};
use crate::report::{write_json, RunReport};
use crate::subdirs::make_individual_dirs;
use crate::trio::discover_trios;
use crate::util::display_path;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Run the whole pipeline for the parsed CLI arguments.
pub fn run_pipeline(args: &RootArgs) -> Result<RunReport> {
    let studies_dir = match &args.studies_dir {
        Some(path) => path.clone(),
        None => default_studies_dir()?,
    };
    ensure_studies_root(&studies_dir)?;
    let studies_dir = studies_dir
        .canonicalize()
        .with_context(|| format!("resolve studies directory {}", studies_dir.display()))?;
    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &studies_dir)?;

    let default_config_path = studies_dir.join(crate::paths::CONFIG_FILE);
    let config = resolve_config(args.config.as_deref(), &default_config_path)?;
    let paths = StudyPaths::new(studies_dir, data_dir, config.matrix_subdir.as_str());
    let sum_command = resolve_sum_command(args.sum_command.as_deref(), &config);
    tracing::debug!(
        studies_dir = %paths.studies_dir().display(),
        data_dir = %paths.data_dir().display(),
        sum_command = %sum_command,
        "resolved study layout"
    );

    let trios = discover_trios(paths.data_dir(), &config.trio_prefix)?;
    let metadata_path = paths.metadata_path();
    write_metadata(&metadata_path, &group_individuals(&trios))?;

    let individuals = read_metadata(&metadata_path)?;
    let individual_dirs = make_individual_dirs(&paths, &individuals)?;

    let index = collect_matrices(&paths, &individuals, &config.resolutions)?;
    let jobs = plan_sums(&index, &paths);
    let sums = run_sums(&jobs, &sum_command, args.dry_run)?;
    for outcome in sums.iter().filter(|outcome| outcome.status == SumStatus::Ok) {
        println!(
            "wrote {}",
            display_path(&outcome.job.out_file, Some(paths.studies_dir()))
        );
    }

    Ok(RunReport {
        studies_dir: paths.studies_dir().to_path_buf(),
        data_dir: paths.data_dir().to_path_buf(),
        metadata_path,
        dry_run: args.dry_run,
        individuals,
        individual_dirs,
        matrices_collected: index.matrix_count(),
        sums,
    })
}

/// Run the pipeline, write the optional report, and fail if any sum failed.
pub fn run(args: &RootArgs) -> Result<()> {
    let report = run_pipeline(args)?;
    if let Some(path) = &args.report {
        write_json(path, &report)?;
        println!("Wrote run report to {}", path.display());
    }
    let failed = report.failed_sums();
    if failed > 0 {
        return Err(anyhow!(
            "{failed} of {} matrix sums failed",
            report.sums.len()
        ));
    }
    Ok(())
}

fn resolve_data_dir(explicit: Option<&Path>, studies_dir: &Path) -> Result<PathBuf> {
    match explicit {
        Some(path) => path
            .canonicalize()
            .with_context(|| format!("resolve data directory {}", path.display())),
        None => Ok(studies_dir.to_path_buf()),
    }
}
